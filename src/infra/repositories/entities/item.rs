//! SeaORM entity for the `items` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use crate::domain;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category_id: Option<i32>,
    pub condition: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price_per_day: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub deposit_amount: Decimal,
    pub location: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for domain::Item {
    type Error = AppError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            owner_id: m.owner_id,
            title: m.title,
            description: m.description,
            category_id: m.category_id,
            condition: m.condition.parse()?,
            price_per_day: m.price_per_day,
            deposit_amount: m.deposit_amount,
            location: m.location,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}
