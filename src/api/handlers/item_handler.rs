//! Item handlers: public search/detail/availability/price preview and
//! owner-gated writes.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, put},
    Extension, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{AvailabilityRange, ItemFilters, NewItem, UpdateItem};
use crate::errors::AppResult;
use crate::services::{ItemWithImages, PricePreview};
use crate::types::{Created, NoContent, Paginated, PaginationParams};

/// Query parameters for the item listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ItemListQuery {
    pub category: Option<i32>,
    #[param(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    #[param(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    pub location: Option<String>,
    pub search: Option<String>,
    /// `price_per_day` or `created_at`; prefix `-` for descending
    pub ordering: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Availability window query.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    #[param(value_type = Option<String>)]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>)]
    pub to: Option<NaiveDate>,
}

/// Price preview query.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PricePreviewQuery {
    #[param(value_type = String)]
    pub start_date: NaiveDate,
    #[param(value_type = String)]
    pub end_date: NaiveDate,
}

/// Public item routes
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items))
        .route("/:id", get(get_item))
        .route("/:id/availability", get(availability))
        .route("/:id/price-preview", get(price_preview))
        .route("/:id/reviews", get(item_reviews))
}

/// Owner-gated item routes (mounted behind the auth middleware)
pub fn item_write_routes() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_item))
        .route("/:id", put(update_item).delete(delete_item))
}

/// Search items
#[utoipa::path(
    get,
    path = "/items",
    tag = "Items",
    params(ItemListQuery),
    responses((status = 200, description = "Page of items"))
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ItemListQuery>,
) -> AppResult<Json<Paginated<ItemWithImages>>> {
    let mut pagination = PaginationParams::default();
    if let Some(page) = query.page {
        pagination.page = page.max(1);
    }
    if let Some(per_page) = query.per_page {
        pagination.per_page = per_page;
    }

    let filters = ItemFilters {
        category: query.category,
        min_price: query.min_price,
        max_price: query.max_price,
        location: query.location,
        search: query.search,
        ordering: query.ordering,
    };

    let page = state.item_service.search(filters, pagination).await?;
    Ok(Json(page))
}

/// Item detail with images
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "Items",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item", body = ItemWithImages),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ItemWithImages>> {
    let item = state.item_service.get(id).await?;
    Ok(Json(item))
}

/// Blocked date ranges for the calendar
#[utoipa::path(
    get,
    path = "/items/{id}/availability",
    tag = "Items",
    params(("id" = Uuid, Path, description = "Item id"), AvailabilityQuery),
    responses(
        (status = 200, description = "Blocked ranges", body = [AvailabilityRange]),
        (status = 404, description = "Not found")
    )
)]
pub async fn availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Vec<AvailabilityRange>>> {
    let ranges = state
        .booking_service
        .availability(id, query.from, query.to)
        .await?;
    Ok(Json(ranges))
}

/// Pricing breakdown without creating a booking
#[utoipa::path(
    get,
    path = "/items/{id}/price-preview",
    tag = "Items",
    params(("id" = Uuid, Path, description = "Item id"), PricePreviewQuery),
    responses(
        (status = 200, description = "Pricing snapshot", body = PricePreview),
        (status = 400, description = "Invalid range"),
        (status = 404, description = "Not found")
    )
)]
pub async fn price_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PricePreviewQuery>,
) -> AppResult<Json<PricePreview>> {
    let preview = state
        .booking_service
        .preview_price(id, query.start_date, query.end_date)
        .await?;
    Ok(Json(preview))
}

/// Reviews attached to an item's completed bookings
#[utoipa::path(
    get,
    path = "/items/{id}/reviews",
    tag = "Items",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Reviews, newest first"),
        (status = 404, description = "Not found")
    )
)]
pub async fn item_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<crate::domain::Review>>> {
    let reviews = state.review_service.list_for_item(id).await?;
    Ok(Json(reviews))
}

/// List a new item
#[utoipa::path(
    post,
    path = "/items",
    tag = "Items",
    security(("bearer_auth" = [])),
    request_body = NewItem,
    responses(
        (status = 201, description = "Item created", body = ItemWithImages),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<NewItem>,
) -> AppResult<Created<ItemWithImages>> {
    let item = state.item_service.create(current.id, payload).await?;
    Ok(Created(item))
}

/// Sparse item update (owner only); unknown keys are rejected
#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "Items",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Item id")),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = ItemWithImages),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(update): ValidatedJson<UpdateItem>,
) -> AppResult<Json<ItemWithImages>> {
    let item = state.item_service.update(current.id, id, update).await?;
    Ok(Json(item))
}

/// Deactivate an item (owner only)
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "Items",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 204, description = "Item deactivated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.item_service.delete(current.id, id).await?;
    Ok(NoContent)
}
