//! Review persistence.
//!
//! The store enforces at most one review per (booking, direction); a
//! violation is translated to [`AppError::DuplicateReview`]. The
//! rating aggregate feeding the denormalized user fields is computed
//! here so the review service can recompute and write back inside one
//! transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, EntityTrait, QueryFilter, QueryOrder, Set, Statement,
};
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use super::entities::booking::{self, Entity as BookingEntity};
use super::entities::review::{self, Entity as ReviewEntity};
use super::violates_constraint;
use crate::domain::{Review, ReviewDirection};
use crate::errors::{AppError, AppResult};

/// Denormalized rating aggregate for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingStats {
    pub rating_avg: Option<Decimal>,
    pub review_count: i32,
}

/// Standalone review queries.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Reviews whose booking references the item, newest first.
    async fn list_for_item(&self, item_id: Uuid) -> AppResult<Vec<Review>>;

    /// Reviews received by a user, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Review>>;
}

/// SeaORM-backed implementation of [`ReviewRepository`].
pub struct ReviewStore {
    db: DatabaseConnection,
}

impl ReviewStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReviewRepository for ReviewStore {
    async fn list_for_item(&self, item_id: Uuid) -> AppResult<Vec<Review>> {
        let models = ReviewEntity::find()
            .filter(
                review::Column::BookingId.in_subquery(
                    Query::select()
                        .column(booking::Column::Id)
                        .from(BookingEntity)
                        .and_where(booking::Column::ItemId.eq(item_id))
                        .to_owned(),
                ),
            )
            .order_by_desc(review::Column::CreatedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(Review::try_from).collect()
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Review>> {
        let models = ReviewEntity::find()
            .filter(review::Column::ReviewedUserId.eq(user_id))
            .order_by_desc(review::Column::CreatedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(Review::try_from).collect()
    }
}

/// Transaction-scoped review writes.
pub struct TxReviews<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxReviews<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        booking_id: Uuid,
        reviewer_id: Uuid,
        reviewed_user_id: Uuid,
        direction: ReviewDirection,
        rating: i16,
        comment: String,
        now: DateTime<Utc>,
    ) -> AppResult<Review> {
        let active = review::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_id: Set(booking_id),
            reviewer_id: Set(reviewer_id),
            reviewed_user_id: Set(reviewed_user_id),
            direction: Set(direction.as_str().to_string()),
            rating: Set(rating),
            comment: Set(comment),
            created_at: Set(now),
        };

        let model = active.insert(self.txn).await.map_err(|e| {
            if violates_constraint(&e, "uq_review_booking_direction") {
                AppError::DuplicateReview
            } else {
                AppError::from(e)
            }
        })?;

        Review::try_from(model)
    }

    /// Aggregate over every review the user has received. The average
    /// is rounded half-up to two decimals; `None` when there are no
    /// reviews yet.
    pub async fn rating_stats(&self, user_id: Uuid) -> AppResult<RatingStats> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT COALESCE(SUM(rating), 0)::bigint AS rating_sum, \
             COUNT(*)::bigint AS review_count \
             FROM reviews WHERE reviewed_user_id = $1",
            [user_id.into()],
        );

        let row = self
            .txn
            .query_one(stmt)
            .await?
            .ok_or_else(|| AppError::internal("rating aggregate returned no row"))?;

        let sum: i64 = row.try_get("", "rating_sum")?;
        let count: i64 = row.try_get("", "review_count")?;

        let rating_avg = if count > 0 {
            Some(
                (Decimal::from(sum) / Decimal::from(count))
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            )
        } else {
            None
        };

        Ok(RatingStats {
            rating_avg,
            review_count: count as i32,
        })
    }
}
