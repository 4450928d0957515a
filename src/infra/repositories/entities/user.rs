//! SeaORM entity for the `users` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use crate::domain;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    #[sea_orm(column_type = "Text")]
    pub bio: String,
    pub location: String,
    pub avatar_url: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((3, 2)))", nullable)]
    pub rating_avg: Option<Decimal>,
    pub review_count: i32,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for domain::User {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            password_hash: m.password_hash,
            first_name: m.first_name,
            last_name: m.last_name,
            phone: m.phone,
            bio: m.bio,
            location: m.location,
            avatar_url: m.avatar_url,
            rating_avg: m.rating_avg,
            review_count: m.review_count,
            is_verified: m.is_verified,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
