//! Conversation and message handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Conversation, Message};
use crate::errors::AppResult;
use crate::types::Created;

/// Open a direct (non-booking) conversation with another user.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OpenConversationRequest {
    pub counterparty_id: Uuid,
    /// Optional booking context; the caller must be a party to it
    pub booking_id: Option<Uuid>,
}

/// Message creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, message = "Message content cannot be empty"))]
    pub content: String,
}

/// Conversation plus its ordered transcript.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationWithMessages {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

/// Count of messages marked read.
#[derive(Debug, Serialize, ToSchema)]
pub struct MarkReadResponse {
    pub marked_read: u64,
}

/// Authenticated conversation routes
pub fn conversation_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_conversations).post(open_conversation))
        .route("/by-booking/:booking_id", get(conversation_by_booking))
        .route(
            "/by-booking/:booking_id/messages",
            post(send_message_by_booking),
        )
        .route("/:id/read", post(mark_read))
}

/// The caller's conversations, most recently active first
#[utoipa::path(
    get,
    path = "/conversations",
    tag = "Messaging",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Conversations", body = [Conversation]))
)]
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Conversation>>> {
    let conversations = state.messaging_service.list_for_user(current.id).await?;
    Ok(Json(conversations))
}

/// Find or create a conversation with another user
#[utoipa::path(
    post,
    path = "/conversations",
    tag = "Messaging",
    security(("bearer_auth" = [])),
    request_body = OpenConversationRequest,
    responses(
        (status = 200, description = "Canonical conversation", body = Conversation),
        (status = 403, description = "Not a participant of the booking"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn open_conversation(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<OpenConversationRequest>,
) -> AppResult<Json<Conversation>> {
    let conversation = state
        .messaging_service
        .open_or_create(current.id, payload.counterparty_id, payload.booking_id)
        .await?;
    Ok(Json(conversation))
}

/// The conversation attached to a booking, created on first access.
/// Marks the counterpart's messages as read.
#[utoipa::path(
    get,
    path = "/conversations/by-booking/{booking_id}",
    tag = "Messaging",
    security(("bearer_auth" = [])),
    params(("booking_id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Conversation and transcript", body = ConversationWithMessages),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn conversation_by_booking(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<ConversationWithMessages>> {
    let (conversation, messages) = state
        .messaging_service
        .open_by_booking(current.id, booking_id)
        .await?;

    Ok(Json(ConversationWithMessages {
        conversation,
        messages,
    }))
}

/// Send a message in a booking's conversation
#[utoipa::path(
    post,
    path = "/conversations/by-booking/{booking_id}/messages",
    tag = "Messaging",
    security(("bearer_auth" = [])),
    params(("booking_id" = Uuid, Path, description = "Booking id")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn send_message_by_booking(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(booking_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SendMessageRequest>,
) -> AppResult<Created<Message>> {
    let message = state
        .messaging_service
        .send_by_booking(current.id, booking_id, payload.content)
        .await?;

    Ok(Created(message))
}

/// Mark messages from the other participant as read
#[utoipa::path(
    post,
    path = "/conversations/{id}/read",
    tag = "Messaging",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Messages marked read", body = MarkReadResponse),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Not found")
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MarkReadResponse>> {
    let marked_read = state.messaging_service.mark_read(current.id, id).await?;
    Ok(Json(MarkReadResponse { marked_read }))
}
