//! Item persistence and search.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use super::entities::item::{self, Entity as ItemEntity};
use super::entities::item_image::{self, Entity as ItemImageEntity};
use super::escape_like;
use crate::domain::{Item, ItemFilters, ItemImage, ItemOrdering, NewItem};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

/// Standalone item queries.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Item>>;

    /// Filtered, ordered, paginated search. Returns the page and the
    /// total match count.
    async fn search(
        &self,
        filters: ItemFilters,
        ordering: ItemOrdering,
        pagination: PaginationParams,
    ) -> AppResult<(Vec<Item>, u64)>;

    /// Images for a set of items, ordered by display position.
    async fn images_for(&self, item_ids: Vec<Uuid>) -> AppResult<Vec<ItemImage>>;
}

/// SeaORM-backed implementation of [`ItemRepository`].
pub struct ItemStore {
    db: DatabaseConnection,
}

impl ItemStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemRepository for ItemStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Item>> {
        let result = ItemEntity::find_by_id(id).one(&self.db).await?;
        result.map(Item::try_from).transpose()
    }

    async fn search(
        &self,
        filters: ItemFilters,
        ordering: ItemOrdering,
        pagination: PaginationParams,
    ) -> AppResult<(Vec<Item>, u64)> {
        // Only active listings are searchable
        let mut query = ItemEntity::find().filter(item::Column::IsActive.eq(true));

        if let Some(category) = filters.category {
            query = query.filter(item::Column::CategoryId.eq(category));
        }
        if let Some(min_price) = filters.min_price {
            query = query.filter(item::Column::PricePerDay.gte(min_price));
        }
        if let Some(max_price) = filters.max_price {
            query = query.filter(item::Column::PricePerDay.lte(max_price));
        }
        if let Some(location) = filters.location.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(location));
            query = query.filter(Expr::col(item::Column::Location).ilike(pattern));
        }
        if let Some(term) = filters.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(term));
            query = query.filter(
                Condition::any()
                    .add(Expr::col(item::Column::Title).ilike(pattern.clone()))
                    .add(Expr::col(item::Column::Description).ilike(pattern)),
            );
        }

        query = match ordering {
            ItemOrdering::PriceAsc => query.order_by_asc(item::Column::PricePerDay),
            ItemOrdering::PriceDesc => query.order_by_desc(item::Column::PricePerDay),
            ItemOrdering::CreatedAsc => query.order_by_asc(item::Column::CreatedAt),
            ItemOrdering::CreatedDesc => query.order_by_desc(item::Column::CreatedAt),
        };

        let paginator = query.paginate(&self.db, pagination.limit());
        let total = paginator.num_items().await?;
        let models = paginator
            .fetch_page(pagination.page.saturating_sub(1))
            .await?;

        let items = models
            .into_iter()
            .map(Item::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    async fn images_for(&self, item_ids: Vec<Uuid>) -> AppResult<Vec<ItemImage>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = ItemImageEntity::find()
            .filter(item_image::Column::ItemId.is_in(item_ids))
            .order_by_asc(item_image::Column::ItemId)
            .order_by_asc(item_image::Column::Position)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(ItemImage::from).collect())
    }
}

/// Transaction-scoped item access.
pub struct TxItems<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxItems<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Item>> {
        let result = ItemEntity::find_by_id(id).one(self.txn).await?;
        result.map(Item::try_from).transpose()
    }

    /// Load the item row under an exclusive row lock (`SELECT ... FOR
    /// UPDATE`). This is the per-item serialization primitive: any
    /// concurrent booking creation or transition for the same item
    /// blocks here until this transaction commits or rolls back.
    pub async fn find_for_update(&self, id: Uuid) -> AppResult<Option<Item>> {
        let result = ItemEntity::find_by_id(id)
            .lock_exclusive()
            .one(self.txn)
            .await?;
        result.map(Item::try_from).transpose()
    }

    pub async fn insert(
        &self,
        owner_id: Uuid,
        data: &NewItem,
        now: DateTime<Utc>,
    ) -> AppResult<Item> {
        let active = item::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            title: Set(data.title.clone()),
            description: Set(data.description.clone()),
            category_id: Set(data.category_id),
            condition: Set(data.condition.as_str().to_string()),
            price_per_day: Set(data.price_per_day),
            deposit_amount: Set(data.deposit_amount),
            location: Set(data.location.clone()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active.insert(self.txn).await?;
        Item::try_from(model)
    }

    /// Replace the item's image rows; the first URL becomes the cover.
    pub async fn replace_images(
        &self,
        item_id: Uuid,
        urls: &[String],
        now: DateTime<Utc>,
    ) -> AppResult<Vec<ItemImage>> {
        ItemImageEntity::delete_many()
            .filter(item_image::Column::ItemId.eq(item_id))
            .exec(self.txn)
            .await?;

        let mut images = Vec::with_capacity(urls.len());
        for (position, url) in urls.iter().enumerate() {
            let active = item_image::ActiveModel {
                item_id: Set(item_id),
                url: Set(url.clone()),
                is_cover: Set(position == 0),
                position: Set(position as i16),
                uploaded_at: Set(now),
                ..Default::default()
            };
            images.push(ItemImage::from(active.insert(self.txn).await?));
        }
        Ok(images)
    }

    /// Apply a sparse update to the item row.
    pub async fn update(
        &self,
        id: Uuid,
        update: &crate::domain::UpdateItem,
        now: DateTime<Utc>,
    ) -> AppResult<Item> {
        let model = ItemEntity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: item::ActiveModel = model.into();
        if let Some(title) = &update.title {
            active.title = Set(title.clone());
        }
        if let Some(description) = &update.description {
            active.description = Set(description.clone());
        }
        if let Some(category_id) = update.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(condition) = update.condition {
            active.condition = Set(condition.as_str().to_string());
        }
        if let Some(price_per_day) = update.price_per_day {
            active.price_per_day = Set(price_per_day);
        }
        if let Some(deposit_amount) = update.deposit_amount {
            active.deposit_amount = Set(deposit_amount);
        }
        if let Some(location) = &update.location {
            active.location = Set(location.clone());
        }
        if let Some(is_active) = update.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(now);

        let model = active.update(self.txn).await?;
        Item::try_from(model)
    }

    /// Soft-deactivate: items are never hard-deleted.
    pub async fn deactivate(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        let model = ItemEntity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: item::ActiveModel = model.into();
        active.is_active = Set(false);
        active.updated_at = Set(now);
        active.update(self.txn).await?;
        Ok(())
    }
}
