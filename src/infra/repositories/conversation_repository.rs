//! Conversation and message persistence.
//!
//! The store enforces one conversation per (participant pair, booking)
//! — with booking-less pairs as their own equivalence class via a
//! partial unique index. A lost insert race is benign: the caller
//! re-reads and returns the winner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use super::entities::conversation::{self, Entity as ConversationEntity};
use super::entities::message::{self, Entity as MessageEntity};
use crate::domain::{Conversation, Message};
use crate::errors::{AppError, AppResult};

/// Standalone conversation queries.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// All conversations the user participates in, most recently
    /// active first.
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Conversation>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Conversation>>;

    /// The canonical conversation for a normalized pair and booking
    /// context, if one exists.
    async fn find_pair(
        &self,
        participant_1: Uuid,
        participant_2: Uuid,
        booking_id: Option<Uuid>,
    ) -> AppResult<Option<Conversation>>;

    /// Messages of a conversation, ordered by creation time with the
    /// identifier as tie-breaker.
    async fn messages(&self, conversation_id: Uuid) -> AppResult<Vec<Message>>;
}

/// SeaORM-backed implementation of [`ConversationRepository`].
pub struct ConversationStore {
    db: DatabaseConnection,
}

impl ConversationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ConversationRepository for ConversationStore {
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        let models = ConversationEntity::find()
            .filter(
                Condition::any()
                    .add(conversation::Column::Participant1Id.eq(user_id))
                    .add(conversation::Column::Participant2Id.eq(user_id)),
            )
            .order_by_desc(conversation::Column::UpdatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Conversation::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        let result = ConversationEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Conversation::from))
    }

    async fn find_pair(
        &self,
        participant_1: Uuid,
        participant_2: Uuid,
        booking_id: Option<Uuid>,
    ) -> AppResult<Option<Conversation>> {
        let mut query = ConversationEntity::find()
            .filter(conversation::Column::Participant1Id.eq(participant_1))
            .filter(conversation::Column::Participant2Id.eq(participant_2));

        query = match booking_id {
            Some(id) => query.filter(conversation::Column::BookingId.eq(id)),
            None => query.filter(conversation::Column::BookingId.is_null()),
        };

        let result = query.one(&self.db).await?;
        Ok(result.map(Conversation::from))
    }

    async fn messages(&self, conversation_id: Uuid) -> AppResult<Vec<Message>> {
        let models = MessageEntity::find()
            .filter(message::Column::ConversationId.eq(conversation_id))
            .order_by_asc(message::Column::CreatedAt)
            .order_by_asc(message::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Message::from).collect())
    }
}

/// Transaction-scoped conversation and message writes.
pub struct TxConversations<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxConversations<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        let result = ConversationEntity::find_by_id(id).one(self.txn).await?;
        Ok(result.map(Conversation::from))
    }

    /// Look up the canonical conversation for a normalized pair and
    /// booking context.
    pub async fn find_pair(
        &self,
        participant_1: Uuid,
        participant_2: Uuid,
        booking_id: Option<Uuid>,
    ) -> AppResult<Option<Conversation>> {
        let mut query = ConversationEntity::find()
            .filter(conversation::Column::Participant1Id.eq(participant_1))
            .filter(conversation::Column::Participant2Id.eq(participant_2));

        query = match booking_id {
            Some(id) => query.filter(conversation::Column::BookingId.eq(id)),
            None => query.filter(conversation::Column::BookingId.is_null()),
        };

        let result = query.one(self.txn).await?;
        Ok(result.map(Conversation::from))
    }

    /// Insert a conversation for a normalized pair. A uniqueness
    /// violation surfaces as `Conflict("Conversation")`, aborting the
    /// enclosing transaction; the caller re-reads outside it and
    /// returns the winner (the lost race is benign).
    pub async fn insert(
        &self,
        participant_1: Uuid,
        participant_2: Uuid,
        booking_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> AppResult<Conversation> {
        let active = conversation::ActiveModel {
            id: Set(Uuid::new_v4()),
            participant_1_id: Set(participant_1),
            participant_2_id: Set(participant_2),
            booking_id: Set(booking_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active.insert(self.txn).await.map_err(|e| {
            if super::violates_constraint(&e, "uq_conversation_pair_booking")
                || super::violates_constraint(&e, "uq_conversation_pair_general")
            {
                AppError::conflict("Conversation")
            } else {
                AppError::from(e)
            }
        })?;

        Ok(Conversation::from(model))
    }

    pub async fn insert_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: String,
        now: DateTime<Utc>,
    ) -> AppResult<Message> {
        let active = message::ActiveModel {
            id: Set(Uuid::new_v4()),
            conversation_id: Set(conversation_id),
            sender_id: Set(sender_id),
            content: Set(content),
            is_read: Set(false),
            created_at: Set(now),
        };

        let model = active.insert(self.txn).await?;
        Ok(Message::from(model))
    }

    /// Bump the conversation's activity timestamp (drives inbox
    /// ordering).
    pub async fn touch(&self, conversation_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        ConversationEntity::update_many()
            .col_expr(conversation::Column::UpdatedAt, Expr::value(at))
            .filter(conversation::Column::Id.eq(conversation_id))
            .exec(self.txn)
            .await?;
        Ok(())
    }

    /// Mark every message not sent by the reader as read. Returns the
    /// number of messages updated.
    pub async fn mark_read(&self, conversation_id: Uuid, reader_id: Uuid) -> AppResult<u64> {
        let result = MessageEntity::update_many()
            .col_expr(message::Column::IsRead, Expr::value(true))
            .filter(message::Column::ConversationId.eq(conversation_id))
            .filter(message::Column::IsRead.eq(false))
            .filter(message::Column::SenderId.ne(reader_id))
            .exec(self.txn)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn messages(&self, conversation_id: Uuid) -> AppResult<Vec<Message>> {
        let models = MessageEntity::find()
            .filter(message::Column::ConversationId.eq(conversation_id))
            .order_by_asc(message::Column::CreatedAt)
            .order_by_asc(message::Column::Id)
            .all(self.txn)
            .await?;

        Ok(models.into_iter().map(Message::from).collect())
    }
}
