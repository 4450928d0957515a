//! Infrastructure layer - database access and transaction management.

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{
    BookingRepository, BookingStore, CategoryRepository, CategoryStore, ConversationRepository,
    ConversationStore, ItemRepository, ItemStore, NewBookingRow, RatingStats, ReviewRepository,
    ReviewStore, UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, TransactionContext, UnitOfWork};
