//! SeaORM entity for the `item_images` table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::domain;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "item_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub item_id: Uuid,
    pub url: String,
    pub is_cover: bool,
    pub position: i16,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for domain::ItemImage {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            item_id: m.item_id,
            url: m.url,
            is_cover: m.is_cover,
            position: m.position,
        }
    }
}
