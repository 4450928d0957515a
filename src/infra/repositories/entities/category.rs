//! SeaORM entity for the `categories` table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::domain;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub parent_id: Option<i32>,
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for domain::Category {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
            parent_id: m.parent_id,
            icon: m.icon,
            created_at: m.created_at,
        }
    }
}
