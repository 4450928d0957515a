//! Booking handlers: creation, lifecycle actions, listings.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, patch, post},
    Extension, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Booking, BookingRoleFilter, BookingStatus};
use crate::errors::AppResult;
use crate::types::Created;

/// Booking creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    pub item_id: Uuid,
    /// First rental day (inclusive), ISO-8601
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    /// Last rental day (inclusive), ISO-8601
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
}

/// Role filter for "my bookings"
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct MyBookingsQuery {
    #[serde(default)]
    #[param(inline)]
    pub role: BookingRoleFilter,
}

/// Authenticated booking routes
pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking))
        .route("/my", get(my_bookings))
        .route("/:id", get(get_booking))
        .route("/:id/approve", patch(approve))
        .route("/:id/reject", patch(reject))
        .route("/:id/cancel", patch(cancel))
        .route("/:id/payment-pending", patch(payment_pending))
        .route("/:id/complete", patch(complete))
}

/// Request a rental
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created as pending", body = Booking),
        (status = 400, description = "Invalid date range"),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Dates overlap an existing booking"),
        (status = 422, description = "Self-booking or inactive item")
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateBookingRequest>,
) -> AppResult<Created<Booking>> {
    let booking = state
        .booking_service
        .create(
            current.id,
            payload.item_id,
            payload.start_date,
            payload.end_date,
        )
        .await?;

    Ok(Created(booking))
}

/// The caller's bookings, filtered by role
#[utoipa::path(
    get,
    path = "/bookings/my",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(MyBookingsQuery),
    responses((status = 200, description = "Bookings, newest first", body = [Booking]))
)]
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<MyBookingsQuery>,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = state
        .booking_service
        .list_my(current.id, query.role)
        .await?;
    Ok(Json(bookings))
}

/// Booking detail (participants only)
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking", body = Booking),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    let booking = state.booking_service.get(current.id, id).await?;
    Ok(Json(booking))
}

async fn transition(
    state: AppState,
    current: CurrentUser,
    id: Uuid,
    target: BookingStatus,
) -> AppResult<Json<Booking>> {
    let booking = state
        .booking_service
        .transition(current.id, id, target)
        .await?;
    Ok(Json(booking))
}

/// Approve a pending booking (owner, within the 48h window)
#[utoipa::path(
    patch,
    path = "/bookings/{id}/approve",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Approved", body = Booking),
        (status = 403, description = "Not authorized"),
        (status = 422, description = "Illegal transition or expired")
    )
)]
pub async fn approve(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    transition(state, current, id, BookingStatus::Approved).await
}

/// Reject a pending booking (owner)
#[utoipa::path(
    patch,
    path = "/bookings/{id}/reject",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Rejected", body = Booking),
        (status = 403, description = "Not authorized"),
        (status = 422, description = "Illegal transition")
    )
)]
pub async fn reject(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    transition(state, current, id, BookingStatus::Rejected).await
}

/// Cancel an active booking (either participant)
#[utoipa::path(
    patch,
    path = "/bookings/{id}/cancel",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Cancelled", body = Booking),
        (status = 403, description = "Not authorized"),
        (status = 422, description = "Illegal transition")
    )
)]
pub async fn cancel(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    transition(state, current, id, BookingStatus::Cancelled).await
}

/// Move an approved booking to payment (owner)
#[utoipa::path(
    patch,
    path = "/bookings/{id}/payment-pending",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Awaiting payment", body = Booking),
        (status = 403, description = "Not authorized"),
        (status = 422, description = "Illegal transition")
    )
)]
pub async fn payment_pending(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    transition(state, current, id, BookingStatus::PaymentPending).await
}

/// Complete a paid booking (owner)
#[utoipa::path(
    patch,
    path = "/bookings/{id}/complete",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Completed", body = Booking),
        (status = 403, description = "Not authorized"),
        (status = 422, description = "Illegal transition")
    )
)]
pub async fn complete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    transition(state, current, id, BookingStatus::Completed).await
}
