//! Service container - wires repositories, clock and services.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, BookingManager, BookingService, CategoryManager, CategoryService,
    ItemManager, ItemService, MessagingManager, MessagingService, ReviewManager, ReviewService,
    UserManager, UserService,
};
use crate::config::Config;
use crate::domain::{Clock, SystemClock};
use crate::infra::Persistence;

/// Centralized access to all application services.
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    category_service: Arc<dyn CategoryService>,
    item_service: Arc<dyn ItemService>,
    booking_service: Arc<dyn BookingService>,
    review_service: Arc<dyn ReviewService>,
    messaging_service: Arc<dyn MessagingService>,
}

impl Services {
    /// Build the full service graph over a database connection with
    /// the wall clock.
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        Self::with_clock(db, config, Arc::new(SystemClock))
    }

    /// Same, with an injected clock (deterministic tests).
    pub fn with_clock(
        db: sea_orm::DatabaseConnection,
        config: Config,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            user_service: Arc::new(UserManager::new(uow.clone())),
            category_service: Arc::new(CategoryManager::new(uow.clone(), clock.clone())),
            item_service: Arc::new(ItemManager::new(uow.clone(), clock.clone())),
            booking_service: Arc::new(BookingManager::new(uow.clone(), clock.clone())),
            review_service: Arc::new(ReviewManager::new(uow.clone(), clock.clone())),
            messaging_service: Arc::new(MessagingManager::new(uow, clock)),
        }
    }

    pub fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    pub fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    pub fn categories(&self) -> Arc<dyn CategoryService> {
        self.category_service.clone()
    }

    pub fn items(&self) -> Arc<dyn ItemService> {
        self.item_service.clone()
    }

    pub fn bookings(&self) -> Arc<dyn BookingService> {
        self.booking_service.clone()
    }

    pub fn reviews(&self) -> Arc<dyn ReviewService> {
        self.review_service.clone()
    }

    pub fn messaging(&self) -> Arc<dyn MessagingService> {
        self.messaging_service.clone()
    }
}
