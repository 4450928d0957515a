//! HTTP request handlers.

pub mod auth_handler;
pub mod booking_handler;
pub mod category_handler;
pub mod item_handler;
pub mod message_handler;
pub mod review_handler;

pub use auth_handler::{auth_routes, me_routes};
pub use booking_handler::booking_routes;
pub use category_handler::category_routes;
pub use item_handler::{item_routes, item_write_routes};
pub use message_handler::conversation_routes;
pub use review_handler::review_routes;
