//! User persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use super::entities::user::{self, Entity as UserEntity};
use super::violates_constraint;
use crate::domain::{NewUser, UpdateUserProfile, User};
use crate::errors::{AppError, AppResult};

/// Standalone user queries and writes.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn create(&self, data: NewUser, now: DateTime<Utc>) -> AppResult<User>;

    async fn update_profile(
        &self,
        id: Uuid,
        update: UpdateUserProfile,
        now: DateTime<Utc>,
    ) -> AppResult<User>;
}

/// SeaORM-backed implementation of [`UserRepository`].
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(result.map(User::from))
    }

    async fn create(&self, data: NewUser, now: DateTime<Utc>) -> AppResult<User> {
        let active = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(data.email),
            password_hash: Set(data.password_hash),
            first_name: Set(data.first_name),
            last_name: Set(data.last_name),
            phone: Set(String::new()),
            bio: Set(String::new()),
            location: Set(String::new()),
            avatar_url: Set(None),
            rating_avg: Set(None),
            review_count: Set(0),
            is_verified: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active.insert(&self.db).await.map_err(|e| {
            if violates_constraint(&e, "uq_user_email") {
                AppError::conflict("User")
            } else {
                AppError::from(e)
            }
        })?;

        Ok(User::from(model))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: UpdateUserProfile,
        now: DateTime<Utc>,
    ) -> AppResult<User> {
        let model = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: user::ActiveModel = model.into();
        if let Some(first_name) = update.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = update.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(phone) = update.phone {
            active.phone = Set(phone);
        }
        if let Some(bio) = update.bio {
            active.bio = Set(bio);
        }
        if let Some(location) = update.location {
            active.location = Set(location);
        }
        if let Some(avatar_url) = update.avatar_url {
            active.avatar_url = Set(Some(avatar_url));
        }
        active.updated_at = Set(now);

        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }
}

/// Transaction-scoped user writes.
pub struct TxUsers<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUsers<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(self.txn).await?;
        Ok(result.map(User::from))
    }

    /// Write the denormalized rating fields. The review service is the
    /// single caller, always in the same transaction as the review
    /// insert that changed them.
    pub async fn update_rating(
        &self,
        user_id: Uuid,
        rating_avg: Option<Decimal>,
        review_count: i32,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let model = UserEntity::find_by_id(user_id)
            .one(self.txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: user::ActiveModel = model.into();
        active.rating_avg = Set(rating_avg);
        active.review_count = Set(review_count);
        active.updated_at = Set(now);
        active.update(self.txn).await?;

        Ok(())
    }
}
