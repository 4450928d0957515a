//! Messaging service.
//!
//! Conversations are canonical per (participant pair, booking): the
//! pair is stored in a fixed order and the store's unique indexes make
//! duplicates impossible. A creation race is benign — the loser
//! re-reads and returns the winner.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{normalize_pair, Clock, Conversation, Message};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Messaging service trait for dependency injection.
#[async_trait]
pub trait MessagingService: Send + Sync {
    /// Find or create the canonical conversation between the actor and
    /// a counterparty, optionally scoped to a booking the actor is a
    /// party to.
    async fn open_or_create(
        &self,
        actor_id: Uuid,
        counterparty_id: Uuid,
        booking_id: Option<Uuid>,
    ) -> AppResult<Conversation>;

    /// The conversation attached to a booking, created on first
    /// access. Marks the counterpart's messages read for the actor and
    /// returns the ordered transcript.
    async fn open_by_booking(
        &self,
        actor_id: Uuid,
        booking_id: Uuid,
    ) -> AppResult<(Conversation, Vec<Message>)>;

    /// Send a message in the conversation attached to a booking.
    async fn send_by_booking(
        &self,
        actor_id: Uuid,
        booking_id: Uuid,
        content: String,
    ) -> AppResult<Message>;

    /// Append a message to a conversation the actor participates in.
    async fn send_message(
        &self,
        actor_id: Uuid,
        conversation_id: Uuid,
        content: String,
    ) -> AppResult<Message>;

    /// Mark all messages not sent by the actor as read. Returns how
    /// many were updated.
    async fn mark_read(&self, actor_id: Uuid, conversation_id: Uuid) -> AppResult<u64>;

    /// The actor's conversations, most recently active first.
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Conversation>>;
}

/// Concrete implementation of MessagingService using Unit of Work.
pub struct MessagingManager<U: UnitOfWork> {
    uow: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U: UnitOfWork> MessagingManager<U> {
    pub fn new(uow: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { uow, clock }
    }

    /// Load a booking and require the actor to be one of its parties.
    async fn participant_booking(
        &self,
        actor_id: Uuid,
        booking_id: Uuid,
    ) -> AppResult<crate::domain::Booking> {
        let booking = self
            .uow
            .bookings()
            .find_by_id(booking_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !booking.is_participant(actor_id) {
            return Err(AppError::Forbidden);
        }
        Ok(booking)
    }
}

#[async_trait]
impl<U: UnitOfWork> MessagingService for MessagingManager<U> {
    async fn open_or_create(
        &self,
        actor_id: Uuid,
        counterparty_id: Uuid,
        booking_id: Option<Uuid>,
    ) -> AppResult<Conversation> {
        if actor_id == counterparty_id {
            return Err(AppError::validation(
                "Cannot create a conversation with yourself",
            ));
        }

        if let Some(booking_id) = booking_id {
            self.participant_booking(actor_id, booking_id).await?;
        }

        let (p1, p2) = normalize_pair(actor_id, counterparty_id);

        if let Some(existing) = self.uow.conversations().find_pair(p1, p2, booking_id).await? {
            return Ok(existing);
        }

        let clock = self.clock.clone();
        let inserted = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    ctx.conversations()
                        .insert(p1, p2, booking_id, clock.now())
                        .await
                })
            })
            .await;

        match inserted {
            Ok(conversation) => Ok(conversation),
            // Lost the creation race; the constraint aborted our
            // transaction and the winner is already committed.
            Err(AppError::Conflict(_)) => self
                .uow
                .conversations()
                .find_pair(p1, p2, booking_id)
                .await?
                .ok_or_else(|| AppError::internal("conversation vanished after lost race")),
            Err(e) => Err(e),
        }
    }

    async fn open_by_booking(
        &self,
        actor_id: Uuid,
        booking_id: Uuid,
    ) -> AppResult<(Conversation, Vec<Message>)> {
        let booking = self.participant_booking(actor_id, booking_id).await?;

        let conversation = self
            .open_or_create(actor_id, booking.counterparty_of(actor_id), Some(booking_id))
            .await?;

        self.mark_read(actor_id, conversation.id).await?;

        let messages = self.uow.conversations().messages(conversation.id).await?;
        Ok((conversation, messages))
    }

    async fn send_by_booking(
        &self,
        actor_id: Uuid,
        booking_id: Uuid,
        content: String,
    ) -> AppResult<Message> {
        let booking = self.participant_booking(actor_id, booking_id).await?;

        let conversation = self
            .open_or_create(actor_id, booking.counterparty_of(actor_id), Some(booking_id))
            .await?;

        self.send_message(actor_id, conversation.id, content).await
    }

    async fn send_message(
        &self,
        actor_id: Uuid,
        conversation_id: Uuid,
        content: String,
    ) -> AppResult<Message> {
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(AppError::validation("Message content cannot be empty"));
        }

        let clock = self.clock.clone();
        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let conversation = ctx
                        .conversations()
                        .find_by_id(conversation_id)
                        .await?
                        .ok_or(AppError::NotFound)?;

                    if !conversation.has_participant(actor_id) {
                        return Err(AppError::Forbidden);
                    }

                    let now = clock.now();
                    let message = ctx
                        .conversations()
                        .insert_message(conversation_id, actor_id, content, now)
                        .await?;

                    // Keep inbox ordering in step with activity
                    ctx.conversations().touch(conversation_id, now).await?;

                    Ok(message)
                })
            })
            .await
    }

    async fn mark_read(&self, actor_id: Uuid, conversation_id: Uuid) -> AppResult<u64> {
        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let conversation = ctx
                        .conversations()
                        .find_by_id(conversation_id)
                        .await?
                        .ok_or(AppError::NotFound)?;

                    if !conversation.has_participant(actor_id) {
                        return Err(AppError::Forbidden);
                    }

                    ctx.conversations()
                        .mark_read(conversation_id, actor_id)
                        .await
                })
            })
            .await
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        self.uow.conversations().list_for_user(user_id).await
    }
}
