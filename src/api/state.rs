//! Application state - dependency injection container for handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{
    AuthService, BookingService, CategoryService, ItemService, MessagingService, ReviewService,
    Services, UserService,
};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub category_service: Arc<dyn CategoryService>,
    pub item_service: Arc<dyn ItemService>,
    pub booking_service: Arc<dyn BookingService>,
    pub review_service: Arc<dyn ReviewService>,
    pub messaging_service: Arc<dyn MessagingService>,
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from a connected database and config.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let services = Services::from_connection(database.get_connection(), config);

        Self {
            auth_service: services.auth(),
            user_service: services.users(),
            category_service: services.categories(),
            item_service: services.items(),
            booking_service: services.bookings(),
            review_service: services.reviews(),
            messaging_service: services.messaging(),
            database,
        }
    }
}
