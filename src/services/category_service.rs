//! Category service - read API plus the bulk seeding import.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::domain::{would_create_cycle, Category, CategorySpec, Clock};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// One parsed row of a category seed file.
#[derive(Debug, Clone)]
pub struct SeedRow {
    pub name: String,
    pub slug: String,
    pub parent_slug: Option<String>,
    pub icon: Option<String>,
    /// 1-based line number in the source file, for error messages
    pub line: usize,
}

/// What happened to each row of a seed import.
#[derive(Debug, Default, Serialize)]
pub struct SeedReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub skipped: Vec<String>,
    pub dry_run: bool,
}

/// Category service trait for dependency injection.
#[async_trait]
pub trait CategoryService: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Category>>;

    async fn get(&self, id: i32) -> AppResult<Category>;

    /// All-or-nothing import of seed rows. Validation failures abort
    /// the whole invocation; `update` refreshes rows matched by slug
    /// instead of skipping them.
    async fn seed(&self, rows: Vec<SeedRow>, dry_run: bool, update: bool)
        -> AppResult<SeedReport>;
}

/// Concrete implementation of CategoryService using Unit of Work.
pub struct CategoryManager<U: UnitOfWork> {
    uow: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U: UnitOfWork> CategoryManager<U> {
    pub fn new(uow: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { uow, clock }
    }

    /// Reject structurally bad rows before touching the database:
    /// missing fields, duplicate slugs, parents that are neither in
    /// the database nor in a preceding row.
    async fn validate_rows(&self, rows: &[SeedRow]) -> AppResult<()> {
        let mut errors = Vec::new();
        let mut seen_slugs = HashSet::new();

        for row in rows {
            if row.name.is_empty() {
                errors.push(format!("Line {}: missing name", row.line));
            }
            if row.slug.is_empty() {
                errors.push(format!("Line {}: missing slug", row.line));
            }
            if !seen_slugs.insert(row.slug.clone()) {
                errors.push(format!(
                    "Line {}: duplicate slug \"{}\" in file",
                    row.line, row.slug
                ));
            }

            if let Some(parent_slug) = row.parent_slug.as_deref().filter(|s| !s.is_empty()) {
                let known_in_file = seen_slugs.contains(parent_slug) && parent_slug != row.slug;
                let known_in_db = self
                    .uow
                    .categories()
                    .find_by_slug(parent_slug)
                    .await?
                    .is_some();
                if !known_in_file && !known_in_db {
                    errors.push(format!(
                        "Line {}: parent \"{}\" not found in database or preceding rows \
                         (parents must be listed before children)",
                        row.line, parent_slug
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(errors.join("; ")))
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> CategoryService for CategoryManager<U> {
    async fn list(&self) -> AppResult<Vec<Category>> {
        self.uow.categories().list().await
    }

    async fn get(&self, id: i32) -> AppResult<Category> {
        self.uow
            .categories()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn seed(
        &self,
        rows: Vec<SeedRow>,
        dry_run: bool,
        update: bool,
    ) -> AppResult<SeedReport> {
        if rows.is_empty() {
            return Err(AppError::validation("Seed file has no rows"));
        }

        self.validate_rows(&rows).await?;

        if dry_run {
            let mut report = SeedReport {
                dry_run: true,
                ..Default::default()
            };
            for row in &rows {
                let exists = self.uow.categories().find_by_slug(&row.slug).await?.is_some();
                let label = format!("{} [{}]", row.name, row.slug);
                if !exists {
                    report.created.push(label);
                } else if update {
                    report.updated.push(label);
                } else {
                    report.skipped.push(label);
                }
            }
            return Ok(report);
        }

        let clock = self.clock.clone();
        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let mut report = SeedReport::default();
                    // Resolves parents created earlier in this import
                    let mut slug_cache: HashMap<String, Category> = HashMap::new();

                    // Parent map for cycle checks when re-parenting
                    let mut parent_of: HashMap<i32, Option<i32>> = ctx
                        .categories()
                        .list()
                        .await?
                        .into_iter()
                        .map(|c| (c.id, c.parent_id))
                        .collect();

                    for row in rows {
                        let label = format!("{} [{}]", row.name, row.slug);

                        let parent = match row.parent_slug.as_deref().filter(|s| !s.is_empty()) {
                            Some(parent_slug) => {
                                let parent = match slug_cache.get(parent_slug) {
                                    Some(cached) => Some(cached.clone()),
                                    None => ctx.categories().find_by_slug(parent_slug).await?,
                                };
                                Some(parent.ok_or_else(|| {
                                    AppError::validation(format!(
                                        "Line {}: parent \"{}\" not found",
                                        row.line, parent_slug
                                    ))
                                })?)
                            }
                            None => None,
                        };
                        let parent_id = parent.as_ref().map(|p| p.id);

                        let spec = CategorySpec {
                            name: row.name,
                            slug: row.slug.clone(),
                            parent_id,
                            icon: row.icon.unwrap_or_default(),
                        };

                        match ctx.categories().find_by_slug(&row.slug).await? {
                            Some(existing) => {
                                if update {
                                    if would_create_cycle(existing.id, parent_id, |id| {
                                        parent_of.get(&id).copied().flatten()
                                    }) {
                                        return Err(AppError::validation(format!(
                                            "Line {}: moving \"{}\" under \"{}\" would create \
                                             a cycle",
                                            row.line,
                                            row.slug,
                                            parent.map(|p| p.slug).unwrap_or_default()
                                        )));
                                    }

                                    let updated =
                                        ctx.categories().update(existing.id, spec).await?;
                                    parent_of.insert(updated.id, updated.parent_id);
                                    slug_cache.insert(row.slug, updated);
                                    report.updated.push(label);
                                } else {
                                    slug_cache.insert(row.slug, existing);
                                    report.skipped.push(label);
                                }
                            }
                            None => {
                                let created =
                                    ctx.categories().insert(spec, clock.now()).await?;
                                parent_of.insert(created.id, created.parent_id);
                                slug_cache.insert(row.slug, created);
                                report.created.push(label);
                            }
                        }
                    }

                    Ok(report)
                })
            })
            .await
    }
}
