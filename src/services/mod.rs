//! Application services layer - use cases and business logic.
//!
//! Services orchestrate domain logic and the Unit of Work to fulfill
//! application use cases; handlers and CLI commands depend on the
//! traits, not the implementations.

mod auth_service;
mod booking_service;
mod category_service;
pub mod container;
mod expirer;
mod item_service;
mod messaging_service;
mod review_service;
mod user_service;

pub use container::Services;

pub use auth_service::{AuthService, Authenticator, Claims, Registration, TokenPair};
pub use booking_service::{BookingManager, BookingService, PricePreview};
pub use category_service::{CategoryManager, CategoryService, SeedReport, SeedRow};
pub use expirer::{ExpirationReport, ExpiredBooking, Expirer};
pub use item_service::{ItemManager, ItemService, ItemWithImages};
pub use messaging_service::{MessagingManager, MessagingService};
pub use review_service::{ReviewManager, ReviewService};
pub use user_service::{UserManager, UserService};
