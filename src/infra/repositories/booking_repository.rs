//! Booking persistence.
//!
//! The overlap invariant lives in PostgreSQL: the
//! `xcl_booking_no_overlap` exclusion constraint rejects any insert or
//! update that would give one item two active bookings with
//! intersecting date ranges, even if every application-level check is
//! bypassed. This module translates that rejection into a typed error.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, LockBehavior, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use super::entities::booking::{self, Entity as BookingEntity};
use super::violates_constraint;
use crate::domain::{AvailabilityRange, Booking, BookingRoleFilter, BookingStatus};
use crate::errors::{AppError, AppResult};

/// Everything needed to persist a new booking: identity, dates and the
/// pricing snapshot computed at admission time.
#[derive(Debug, Clone)]
pub struct NewBookingRow {
    pub item_id: Uuid,
    pub renter_id: Uuid,
    pub owner_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i32,
    pub base_total: Decimal,
    pub discount_rate: Decimal,
    pub discount_amount: Decimal,
    pub final_total: Decimal,
    pub deposit: Decimal,
}

/// Standalone booking queries.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>>;

    /// Bookings where the user appears in the requested role, newest
    /// first.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        role: BookingRoleFilter,
    ) -> AppResult<Vec<Booking>>;

    /// Active bookings for an item intersecting the window, ordered by
    /// start date. The availability projection.
    async fn find_active_overlapping(
        &self,
        item_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<AvailabilityRange>>;
}

/// SeaORM-backed implementation of [`BookingRepository`].
pub struct BookingStore {
    db: DatabaseConnection,
}

impl BookingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn active_status_values() -> Vec<&'static str> {
    BookingStatus::ACTIVE.iter().map(|s| s.as_str()).collect()
}

#[async_trait]
impl BookingRepository for BookingStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let result = BookingEntity::find_by_id(id).one(&self.db).await?;
        result.map(Booking::try_from).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        role: BookingRoleFilter,
    ) -> AppResult<Vec<Booking>> {
        let condition = match role {
            BookingRoleFilter::Renter => Condition::all().add(booking::Column::RenterId.eq(user_id)),
            BookingRoleFilter::Owner => Condition::all().add(booking::Column::OwnerId.eq(user_id)),
            BookingRoleFilter::Both => Condition::any()
                .add(booking::Column::RenterId.eq(user_id))
                .add(booking::Column::OwnerId.eq(user_id)),
        };

        let models = BookingEntity::find()
            .filter(condition)
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(Booking::try_from).collect()
    }

    async fn find_active_overlapping(
        &self,
        item_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<AvailabilityRange>> {
        let mut query = BookingEntity::find()
            .filter(booking::Column::ItemId.eq(item_id))
            .filter(booking::Column::Status.is_in(active_status_values()));

        // Inclusive intersection: start <= window_end AND end >= window_start
        if let Some(from) = from {
            query = query.filter(booking::Column::EndDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(booking::Column::StartDate.lte(to));
        }

        let models = query
            .order_by_asc(booking::Column::StartDate)
            .all(&self.db)
            .await?;

        models
            .into_iter()
            .map(|m| {
                Ok(AvailabilityRange {
                    start_date: m.start_date,
                    end_date: m.end_date,
                    status: m.status.parse()?,
                })
            })
            .collect()
    }
}

/// Transaction-scoped booking access.
pub struct TxBookings<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxBookings<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let result = BookingEntity::find_by_id(id).one(self.txn).await?;
        result.map(Booking::try_from).transpose()
    }

    /// Insert a new PENDING booking. An exclusion-constraint rejection
    /// from the store surfaces as [`AppError::BookingOverlap`].
    pub async fn insert(&self, row: NewBookingRow, now: DateTime<Utc>) -> AppResult<Booking> {
        let active = booking::ActiveModel {
            id: Set(Uuid::new_v4()),
            item_id: Set(row.item_id),
            renter_id: Set(row.renter_id),
            owner_id: Set(row.owner_id),
            start_date: Set(row.start_date),
            end_date: Set(row.end_date),
            status: Set(BookingStatus::Pending.as_str().to_string()),
            total_days: Set(row.total_days),
            base_total: Set(row.base_total),
            discount_rate: Set(row.discount_rate),
            discount_amount: Set(row.discount_amount),
            final_total: Set(row.final_total),
            deposit: Set(row.deposit),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active.insert(self.txn).await.map_err(|e| {
            if violates_constraint(&e, "xcl_booking_no_overlap") {
                AppError::BookingOverlap
            } else {
                AppError::from(e)
            }
        })?;

        Booking::try_from(model)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        now: DateTime<Utc>,
    ) -> AppResult<Booking> {
        let model = BookingEntity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: booking::ActiveModel = model.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(now);

        let model = active.update(self.txn).await?;
        Booking::try_from(model)
    }

    /// PENDING bookings created at or before the cutoff, locked with
    /// `FOR UPDATE SKIP LOCKED` so a concurrently-held booking (e.g.
    /// mid-transition) is skipped instead of blocking the sweep.
    pub async fn find_expired_pending(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Booking>> {
        let models = BookingEntity::find()
            .filter(booking::Column::Status.eq(BookingStatus::Pending.as_str()))
            .filter(booking::Column::CreatedAt.lte(cutoff))
            .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
            .all(self.txn)
            .await?;

        models.into_iter().map(Booking::try_from).collect()
    }

    /// Same scan without locks, for dry runs.
    pub async fn peek_expired_pending(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Booking>> {
        let models = BookingEntity::find()
            .filter(booking::Column::Status.eq(BookingStatus::Pending.as_str()))
            .filter(booking::Column::CreatedAt.lte(cutoff))
            .all(self.txn)
            .await?;

        models.into_iter().map(Booking::try_from).collect()
    }

    /// Bulk-cancel the given bookings. Returns the number of rows
    /// changed.
    pub async fn cancel_all(&self, ids: Vec<Uuid>, now: DateTime<Utc>) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = BookingEntity::update_many()
            .col_expr(
                booking::Column::Status,
                Expr::value(BookingStatus::Cancelled.as_str()),
            )
            .col_expr(booking::Column::UpdatedAt, Expr::value(now))
            .filter(booking::Column::Id.is_in(ids))
            .exec(self.txn)
            .await?;

        Ok(result.rows_affected)
    }
}
