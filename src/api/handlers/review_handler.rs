//! Review handlers.

use axum::{extract::State, routing::post, Extension, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::Review;
use crate::errors::AppResult;
use crate::types::Created;

/// Review creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReviewRequest {
    pub booking_id: Uuid,
    /// 1 (poor) to 5 (excellent)
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
    #[validate(length(min = 10, message = "Review comment must be at least 10 characters"))]
    pub comment: String,
}

/// Authenticated review routes
pub fn review_routes() -> Router<AppState> {
    Router::new().route("/", post(create_review))
}

/// Review the other party of a completed booking
#[utoipa::path(
    post,
    path = "/reviews",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 403, description = "Not a booking participant"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Already reviewed in this direction"),
        (status = 422, description = "Booking not completed")
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateReviewRequest>,
) -> AppResult<Created<Review>> {
    let review = state
        .review_service
        .create(
            current.id,
            payload.booking_id,
            payload.rating,
            payload.comment,
        )
        .await?;

    Ok(Created(review))
}
