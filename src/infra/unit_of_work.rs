//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and transaction lifecycle: a closure
//! runs against a [`TransactionContext`], and the transaction commits
//! on `Ok` or rolls back on `Err`. Rollback releases every row lock
//! taken inside, including the per-item lock that serializes booking
//! admission.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::sync::Arc;

use super::repositories::{
    BookingRepository, BookingStore, CategoryRepository, CategoryStore, ConversationRepository,
    ConversationStore, ItemRepository, ItemStore, ReviewRepository, ReviewStore, TxBookings,
    TxCategories, TxConversations, TxItems, TxReviews, TxUsers, UserRepository, UserStore,
};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Plain repository accessors serve standalone reads; `transaction`
/// scopes multi-step writes.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn categories(&self) -> Arc<dyn CategoryRepository>;

    fn items(&self) -> Arc<dyn ItemRepository>;

    fn bookings(&self) -> Arc<dyn BookingRepository>;

    fn reviews(&self) -> Arc<dyn ReviewRepository>;

    fn conversations(&self) -> Arc<dyn ConversationRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is automatically committed on success or rolled
    /// back on error. Uses ReadCommitted isolation; correctness of the
    /// booking kernel rests on row locks plus the store's constraints,
    /// not on a stronger isolation level.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Repository access within one database transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn users(&self) -> TxUsers<'_> {
        TxUsers::new(self.txn)
    }

    pub fn categories(&self) -> TxCategories<'_> {
        TxCategories::new(self.txn)
    }

    pub fn items(&self) -> TxItems<'_> {
        TxItems::new(self.txn)
    }

    pub fn bookings(&self) -> TxBookings<'_> {
        TxBookings::new(self.txn)
    }

    pub fn reviews(&self) -> TxReviews<'_> {
        TxReviews::new(self.txn)
    }

    pub fn conversations(&self) -> TxConversations<'_> {
        TxConversations::new(self.txn)
    }
}

/// Concrete Unit of Work over a SeaORM connection pool.
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    category_repo: Arc<CategoryStore>,
    item_repo: Arc<ItemStore>,
    booking_repo: Arc<BookingStore>,
    review_repo: Arc<ReviewStore>,
    conversation_repo: Arc<ConversationStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            category_repo: Arc::new(CategoryStore::new(db.clone())),
            item_repo: Arc::new(ItemStore::new(db.clone())),
            booking_repo: Arc::new(BookingStore::new(db.clone())),
            review_repo: Arc::new(ReviewStore::new(db.clone())),
            conversation_repo: Arc::new(ConversationStore::new(db.clone())),
            db,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn categories(&self) -> Arc<dyn CategoryRepository> {
        self.category_repo.clone()
    }

    fn items(&self) -> Arc<dyn ItemRepository> {
        self.item_repo.clone()
    }

    fn bookings(&self) -> Arc<dyn BookingRepository> {
        self.booking_repo.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewRepository> {
        self.review_repo.clone()
    }

    fn conversations(&self) -> Arc<dyn ConversationRepository> {
        self.conversation_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}
