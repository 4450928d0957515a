//! User service - profiles.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{UpdateUserProfile, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Sparse profile update for the authenticated user.
    async fn update_profile(&self, id: Uuid, update: UpdateUserProfile) -> AppResult<User>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found()
    }

    async fn update_profile(&self, id: Uuid, update: UpdateUserProfile) -> AppResult<User> {
        if update.is_empty() {
            return Err(AppError::validation("No recognized fields to update"));
        }

        self.uow.users().update_profile(id, update, Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::repositories::MockUserRepository;
    use crate::infra::{
        BookingRepository, CategoryRepository, ConversationRepository, ItemRepository,
        ReviewRepository, TransactionContext, UserRepository,
    };
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;

    /// Unit-of-work stub exposing only the mocked user repository.
    struct TestUow {
        users: Arc<MockUserRepository>,
    }

    #[async_trait]
    impl UnitOfWork for TestUow {
        fn users(&self) -> Arc<dyn UserRepository> {
            self.users.clone()
        }

        fn categories(&self) -> Arc<dyn CategoryRepository> {
            unimplemented!("not used in these tests")
        }

        fn items(&self) -> Arc<dyn ItemRepository> {
            unimplemented!("not used in these tests")
        }

        fn bookings(&self) -> Arc<dyn BookingRepository> {
            unimplemented!("not used in these tests")
        }

        fn reviews(&self) -> Arc<dyn ReviewRepository> {
            unimplemented!("not used in these tests")
        }

        fn conversations(&self) -> Arc<dyn ConversationRepository> {
            unimplemented!("not used in these tests")
        }

        async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
        where
            F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                    Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
                > + Send,
            T: Send,
        {
            Err(AppError::internal("transactions not supported in test stub"))
        }
    }

    fn test_user(id: Uuid) -> User {
        User {
            id,
            email: "rachid@example.com".to_string(),
            password_hash: "hashed".to_string(),
            first_name: "Rachid".to_string(),
            last_name: "B".to_string(),
            phone: String::new(),
            bio: String::new(),
            location: "Algiers".to_string(),
            avatar_url: None,
            rating_avg: Some(dec!(4.50)),
            review_count: 2,
            is_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn get_user_found() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .with(eq(id))
            .returning(|id| Ok(Some(test_user(id))));

        let service = UserManager::new(Arc::new(TestUow {
            users: Arc::new(repo),
        }));
        let user = service.get_user(id).await.unwrap();
        assert_eq!(user.id, id);
    }

    #[tokio::test]
    async fn get_user_missing_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let service = UserManager::new(Arc::new(TestUow {
            users: Arc::new(repo),
        }));
        let err = service.get_user(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn empty_update_is_rejected_without_hitting_storage() {
        let repo = MockUserRepository::new();
        let service = UserManager::new(Arc::new(TestUow {
            users: Arc::new(repo),
        }));

        let err = service
            .update_profile(Uuid::new_v4(), UpdateUserProfile::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
