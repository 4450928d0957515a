//! Booking service - the admission pipeline and state machine.
//!
//! Creation and transition for one item are serialized through the
//! item row lock taken inside the transaction; the store's exclusion
//! constraint independently guarantees that no two active bookings
//! for the same item can ever hold overlapping dates, whatever the
//! interleaving.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    check_transition, pricing, AvailabilityRange, Booking, BookingRoleFilter, BookingStatus,
    Clock, PriceQuote,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{NewBookingRow, UnitOfWork};

/// Pricing breakdown for a prospective rental, shown before the user
/// commits. `deposit_amount` is display-only and never folded into
/// the quote's `final_total`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PricePreview {
    pub item_id: Uuid,
    #[schema(value_type = String)]
    pub price_per_day: Decimal,
    #[schema(value_type = String)]
    pub deposit_amount: Decimal,
    #[serde(flatten)]
    pub quote: PriceQuote,
}

/// Booking service trait for dependency injection.
#[async_trait]
pub trait BookingService: Send + Sync {
    /// Admit a new booking request: validate, price, persist as
    /// PENDING. Serialized per item.
    async fn create(
        &self,
        renter_id: Uuid,
        item_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<Booking>;

    /// Drive a booking through the state machine.
    async fn transition(
        &self,
        actor_id: Uuid,
        booking_id: Uuid,
        target: BookingStatus,
    ) -> AppResult<Booking>;

    /// Booking detail, participants only.
    async fn get(&self, actor_id: Uuid, booking_id: Uuid) -> AppResult<Booking>;

    /// The caller's bookings, filtered by role.
    async fn list_my(&self, user_id: Uuid, role: BookingRoleFilter) -> AppResult<Vec<Booking>>;

    /// Blocked date ranges for an item within an optional window.
    async fn availability(
        &self,
        item_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<AvailabilityRange>>;

    /// Pricing breakdown without creating anything.
    async fn preview_price(
        &self,
        item_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<PricePreview>;
}

/// Concrete implementation of BookingService using Unit of Work.
pub struct BookingManager<U: UnitOfWork> {
    uow: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U: UnitOfWork> BookingManager<U> {
    pub fn new(uow: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { uow, clock }
    }
}

#[async_trait]
impl<U: UnitOfWork> BookingService for BookingManager<U> {
    async fn create(
        &self,
        renter_id: Uuid,
        item_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<Booking> {
        let clock = self.clock.clone();

        let booking = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    // Per-item serialization: the row lock blocks any
                    // concurrent admission for the same item until this
                    // transaction ends.
                    let item = ctx
                        .items()
                        .find_for_update(item_id)
                        .await?
                        .ok_or(AppError::NotFound)?;

                    if !item.is_active {
                        return Err(AppError::ItemInactive);
                    }
                    if item.owner_id == renter_id {
                        return Err(AppError::SelfBooking);
                    }
                    if start_date < clock.today() {
                        return Err(AppError::validation("Start date cannot be in the past"));
                    }

                    // Rejects start >= end as well
                    let quote = pricing::quote(item.price_per_day, start_date, end_date)?;

                    ctx.bookings()
                        .insert(
                            NewBookingRow {
                                item_id,
                                renter_id,
                                owner_id: item.owner_id,
                                start_date,
                                end_date,
                                total_days: quote.total_days as i32,
                                base_total: quote.base_total,
                                discount_rate: quote.discount_rate,
                                discount_amount: quote.discount_amount,
                                final_total: quote.final_total,
                                deposit: item.deposit_amount,
                            },
                            clock.now(),
                        )
                        .await
                })
            })
            .await?;

        tracing::info!(
            booking_id = %booking.id,
            item_id = %booking.item_id,
            renter_id = %booking.renter_id,
            "Booking created"
        );
        Ok(booking)
    }

    async fn transition(
        &self,
        actor_id: Uuid,
        booking_id: Uuid,
        target: BookingStatus,
    ) -> AppResult<Booking> {
        let clock = self.clock.clone();

        let booking = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let booking = ctx
                        .bookings()
                        .find_by_id(booking_id)
                        .await?
                        .ok_or(AppError::NotFound)?;

                    // Take the same per-item lock as creation, then
                    // re-read so the decision is made on the state no
                    // concurrent writer can still change.
                    ctx.items()
                        .find_for_update(booking.item_id)
                        .await?
                        .ok_or(AppError::NotFound)?;
                    let booking = ctx
                        .bookings()
                        .find_by_id(booking_id)
                        .await?
                        .ok_or(AppError::NotFound)?;

                    check_transition(&booking, actor_id, target, clock.now())?;

                    ctx.bookings()
                        .update_status(booking_id, target, clock.now())
                        .await
                })
            })
            .await?;

        tracing::info!(
            booking_id = %booking.id,
            status = %booking.status,
            "Booking transitioned"
        );
        Ok(booking)
    }

    async fn get(&self, actor_id: Uuid, booking_id: Uuid) -> AppResult<Booking> {
        let booking = self
            .uow
            .bookings()
            .find_by_id(booking_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !booking.is_participant(actor_id) {
            return Err(AppError::Forbidden);
        }
        Ok(booking)
    }

    async fn list_my(&self, user_id: Uuid, role: BookingRoleFilter) -> AppResult<Vec<Booking>> {
        self.uow.bookings().list_for_user(user_id, role).await
    }

    async fn availability(
        &self,
        item_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<AvailabilityRange>> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(AppError::validation("from must not be after to"));
            }
        }

        self.uow
            .items()
            .find_by_id(item_id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.uow
            .bookings()
            .find_active_overlapping(item_id, from, to)
            .await
    }

    async fn preview_price(
        &self,
        item_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<PricePreview> {
        let item = self
            .uow
            .items()
            .find_by_id(item_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let quote = pricing::quote(item.price_per_day, start_date, end_date)?;

        Ok(PricePreview {
            item_id: item.id,
            price_per_day: item.price_per_day,
            deposit_amount: item.deposit_amount,
            quote,
        })
    }
}
