//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, booking_handler, category_handler, item_handler, message_handler,
    review_handler,
};
use crate::domain::{
    AvailabilityRange, Booking, BookingStatus, Category, Conversation, Item, ItemCondition,
    ItemImage, Message, NewItem, PriceQuote, Review, ReviewDirection, UpdateItem,
    UpdateUserProfile, UserResponse,
};
use crate::services::{ItemWithImages, PricePreview, TokenPair};

/// OpenAPI documentation for the RentIt API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "RentIt API",
        version = "0.1.0",
        description = "Peer-to-peer rental marketplace backend"
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        auth_handler::refresh,
        auth_handler::me,
        auth_handler::update_me,
        category_handler::list_categories,
        category_handler::get_category,
        item_handler::list_items,
        item_handler::get_item,
        item_handler::availability,
        item_handler::price_preview,
        item_handler::item_reviews,
        item_handler::create_item,
        item_handler::update_item,
        item_handler::delete_item,
        booking_handler::create_booking,
        booking_handler::my_bookings,
        booking_handler::get_booking,
        booking_handler::approve,
        booking_handler::reject,
        booking_handler::cancel,
        booking_handler::payment_pending,
        booking_handler::complete,
        review_handler::create_review,
        message_handler::list_conversations,
        message_handler::open_conversation,
        message_handler::conversation_by_booking,
        message_handler::send_message_by_booking,
        message_handler::mark_read,
    ),
    components(
        schemas(
            UserResponse,
            UpdateUserProfile,
            Category,
            Item,
            ItemImage,
            ItemCondition,
            NewItem,
            UpdateItem,
            ItemWithImages,
            Booking,
            BookingStatus,
            AvailabilityRange,
            PriceQuote,
            PricePreview,
            Review,
            ReviewDirection,
            Conversation,
            Message,
            TokenPair,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::RefreshRequest,
            auth_handler::RegisterResponse,
            booking_handler::CreateBookingRequest,
            review_handler::CreateReviewRequest,
            message_handler::OpenConversationRequest,
            message_handler::SendMessageRequest,
            message_handler::ConversationWithMessages,
            message_handler::MarkReadResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login, profile"),
        (name = "Categories", description = "Category tree"),
        (name = "Items", description = "Listings, search, availability, pricing"),
        (name = "Bookings", description = "Booking lifecycle"),
        (name = "Reviews", description = "Post-rental reviews"),
        (name = "Messaging", description = "Conversations and messages")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT access token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
