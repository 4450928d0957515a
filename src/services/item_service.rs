//! Item service - listings, search, owner-gated writes.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Clock, Item, ItemFilters, ItemImage, ItemOrdering, NewItem, UpdateItem};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

/// Item plus its ordered image collection.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemWithImages {
    #[serde(flatten)]
    pub item: Item,
    pub images: Vec<ItemImage>,
}

/// Item service trait for dependency injection.
#[async_trait]
pub trait ItemService: Send + Sync {
    /// Public search over active items.
    async fn search(
        &self,
        filters: ItemFilters,
        pagination: PaginationParams,
    ) -> AppResult<Paginated<ItemWithImages>>;

    async fn get(&self, item_id: Uuid) -> AppResult<ItemWithImages>;

    async fn create(&self, owner_id: Uuid, data: NewItem) -> AppResult<ItemWithImages>;

    /// Sparse update, owner only.
    async fn update(
        &self,
        actor_id: Uuid,
        item_id: Uuid,
        update: UpdateItem,
    ) -> AppResult<ItemWithImages>;

    /// Soft-deactivate, owner only. Items are never hard-deleted.
    async fn delete(&self, actor_id: Uuid, item_id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of ItemService using Unit of Work.
pub struct ItemManager<U: UnitOfWork> {
    uow: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U: UnitOfWork> ItemManager<U> {
    pub fn new(uow: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { uow, clock }
    }

    async fn with_images(&self, item: Item) -> AppResult<ItemWithImages> {
        let images = self.uow.items().images_for(vec![item.id]).await?;
        Ok(ItemWithImages { item, images })
    }

    /// Load an item and require the actor to own it.
    async fn owned_item(&self, actor_id: Uuid, item_id: Uuid) -> AppResult<Item> {
        let item = self
            .uow
            .items()
            .find_by_id(item_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if item.owner_id != actor_id {
            return Err(AppError::Forbidden);
        }
        Ok(item)
    }

    async fn check_category(&self, category_id: Option<i32>) -> AppResult<()> {
        if let Some(id) = category_id {
            self.uow
                .categories()
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::validation(format!("Unknown category: {}", id)))?;
        }
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> ItemService for ItemManager<U> {
    async fn search(
        &self,
        filters: ItemFilters,
        pagination: PaginationParams,
    ) -> AppResult<Paginated<ItemWithImages>> {
        let ordering = ItemOrdering::parse(filters.ordering.as_deref())?;

        let (page, per_page) = (pagination.page, pagination.limit());
        let (items, total) = self.uow.items().search(filters, ordering, pagination).await?;

        let ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
        let mut by_item: HashMap<Uuid, Vec<ItemImage>> = HashMap::new();
        for image in self.uow.items().images_for(ids).await? {
            by_item.entry(image.item_id).or_default().push(image);
        }

        let data = items
            .into_iter()
            .map(|item| {
                let images = by_item.remove(&item.id).unwrap_or_default();
                ItemWithImages { item, images }
            })
            .collect();

        Ok(Paginated::new(data, page, per_page, total))
    }

    async fn get(&self, item_id: Uuid) -> AppResult<ItemWithImages> {
        let item = self.uow.items().find_by_id(item_id).await?.ok_or_not_found()?;
        self.with_images(item).await
    }

    async fn create(&self, owner_id: Uuid, data: NewItem) -> AppResult<ItemWithImages> {
        data.validate_money()?;
        self.check_category(data.category_id).await?;

        let clock = self.clock.clone();
        let (item, images) = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let now = clock.now();
                    let item = ctx.items().insert(owner_id, &data, now).await?;
                    let images = ctx
                        .items()
                        .replace_images(item.id, &data.image_urls, now)
                        .await?;
                    Ok((item, images))
                })
            })
            .await?;

        tracing::info!(item_id = %item.id, owner_id = %owner_id, "Item listed");
        Ok(ItemWithImages { item, images })
    }

    async fn update(
        &self,
        actor_id: Uuid,
        item_id: Uuid,
        update: UpdateItem,
    ) -> AppResult<ItemWithImages> {
        self.owned_item(actor_id, item_id).await?;

        if update.is_empty() {
            return Err(AppError::validation("No recognized fields to update"));
        }
        update.validate_money()?;
        if let Some(category_id) = update.category_id {
            self.check_category(category_id).await?;
        }

        let clock = self.clock.clone();
        let item = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move { ctx.items().update(item_id, &update, clock.now()).await })
            })
            .await?;

        self.with_images(item).await
    }

    async fn delete(&self, actor_id: Uuid, item_id: Uuid) -> AppResult<()> {
        self.owned_item(actor_id, item_id).await?;

        let clock = self.clock.clone();
        self.uow
            .transaction(move |ctx| {
                Box::pin(async move { ctx.items().deactivate(item_id, clock.now()).await })
            })
            .await?;

        tracing::info!(item_id = %item_id, "Item deactivated");
        Ok(())
    }
}
