//! SeaORM entity for the `reviews` table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::domain;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub booking_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewed_user_id: Uuid,
    pub direction: String,
    pub rating: i16,
    #[sea_orm(column_type = "Text")]
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for domain::Review {
    type Error = AppError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            booking_id: m.booking_id,
            reviewer_id: m.reviewer_id,
            reviewed_user_id: m.reviewed_user_id,
            direction: m.direction.parse()?,
            rating: m.rating,
            comment: m.comment,
            created_at: m.created_at,
        })
    }
}
