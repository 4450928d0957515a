//! Repository layer - data access abstraction.
//!
//! Plain repositories run standalone queries on the shared connection;
//! `Tx*` repositories run inside a Unit of Work transaction and carry
//! the store-enforced invariants (row locks, constraint translation).

pub(crate) mod entities;

mod booking_repository;
mod category_repository;
mod conversation_repository;
mod item_repository;
mod review_repository;
mod user_repository;

pub use booking_repository::{BookingRepository, BookingStore, NewBookingRow, TxBookings};
pub use category_repository::{CategoryRepository, CategoryStore, TxCategories};
pub use conversation_repository::{ConversationRepository, ConversationStore, TxConversations};
pub use item_repository::{ItemRepository, ItemStore, TxItems};
pub use review_repository::{RatingStats, ReviewRepository, ReviewStore, TxReviews};
pub use user_repository::{TxUsers, UserRepository, UserStore};

#[cfg(test)]
pub use booking_repository::MockBookingRepository;
#[cfg(test)]
pub use category_repository::MockCategoryRepository;
#[cfg(test)]
pub use conversation_repository::MockConversationRepository;
#[cfg(test)]
pub use item_repository::MockItemRepository;
#[cfg(test)]
pub use review_repository::MockReviewRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;

/// Whether a database error reports a violation of the named
/// constraint. Postgres embeds the constraint name in the error
/// message, which is the one stable handle we have across drivers.
pub(crate) fn violates_constraint(err: &sea_orm::DbErr, constraint: &str) -> bool {
    err.to_string().contains(constraint)
}

/// Escape LIKE/ILIKE metacharacters in user-supplied search text.
pub(crate) fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
