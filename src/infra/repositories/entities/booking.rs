//! SeaORM entity for the `bookings` table.
//!
//! The table carries the overlap exclusion constraint
//! (`xcl_booking_no_overlap`); inserts that would produce two active
//! bookings with intersecting date ranges for one item are rejected
//! by PostgreSQL itself.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use crate::domain;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub item_id: Uuid,
    pub renter_id: Uuid,
    pub owner_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub total_days: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub base_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((4, 2)))")]
    pub discount_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub discount_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub final_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub deposit: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for domain::Booking {
    type Error = AppError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            item_id: m.item_id,
            renter_id: m.renter_id,
            owner_id: m.owner_id,
            start_date: m.start_date,
            end_date: m.end_date,
            status: m.status.parse()?,
            total_days: m.total_days,
            base_total: m.base_total,
            discount_rate: m.discount_rate,
            discount_amount: m.discount_amount,
            final_total: m.final_total,
            deposit: m.deposit,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}
