//! Category persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

#[cfg(test)]
use mockall::automock;

use super::entities::category::{self, Entity as CategoryEntity};
use super::violates_constraint;
use crate::domain::{Category, CategorySpec};
use crate::errors::{AppError, AppResult};

/// Standalone category queries.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Category>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Category>>;

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Category>>;
}

/// SeaORM-backed implementation of [`CategoryRepository`].
pub struct CategoryStore {
    db: DatabaseConnection,
}

impl CategoryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for CategoryStore {
    async fn list(&self) -> AppResult<Vec<Category>> {
        let models = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Category::from))
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await?;
        Ok(result.map(Category::from))
    }
}

/// Transaction-scoped category writes, used by the seeding import so
/// an invocation is all-or-nothing.
pub struct TxCategories<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxCategories<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn list(&self) -> AppResult<Vec<Category>> {
        let models = CategoryEntity::find().all(self.txn).await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(self.txn)
            .await?;
        Ok(result.map(Category::from))
    }

    pub async fn insert(&self, spec: CategorySpec, now: DateTime<Utc>) -> AppResult<Category> {
        let active = category::ActiveModel {
            name: Set(spec.name),
            slug: Set(spec.slug),
            parent_id: Set(spec.parent_id),
            icon: Set(spec.icon),
            created_at: Set(now),
            ..Default::default()
        };

        let model = active.insert(self.txn).await.map_err(|e| {
            if violates_constraint(&e, "uq_category_slug") {
                AppError::conflict("Category")
            } else {
                AppError::from(e)
            }
        })?;

        Ok(Category::from(model))
    }

    pub async fn update(&self, id: i32, spec: CategorySpec) -> AppResult<Category> {
        let model = CategoryEntity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: category::ActiveModel = model.into();
        active.name = Set(spec.name);
        active.icon = Set(spec.icon);
        active.parent_id = Set(spec.parent_id);

        let model = active.update(self.txn).await?;
        Ok(Category::from(model))
    }
}
