//! SeaORM entity for the `conversations` table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::domain;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "conversations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub participant_1_id: Uuid,
    pub participant_2_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for domain::Conversation {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            participant_1_id: m.participant_1_id,
            participant_2_id: m.participant_2_id,
            booking_id: m.booking_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
