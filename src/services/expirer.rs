//! Scheduled expirer for stale pending bookings.
//!
//! A booking left PENDING past the approval window cannot be approved
//! anymore (the state machine rejects it); this sweep cancels such
//! bookings so their calendar dates free up. Invoked by an external
//! scheduler through the `expire-bookings` CLI command. Idempotent:
//! a second run over the same data finds nothing left to cancel.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::Clock;
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

/// One booking the sweep cancelled (or would cancel, in dry-run).
#[derive(Debug, Clone, Serialize)]
pub struct ExpiredBooking {
    pub id: Uuid,
    pub item_id: Uuid,
    pub renter_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub age_hours: f64,
}

/// Outcome of one sweep.
#[derive(Debug, Serialize)]
pub struct ExpirationReport {
    pub dry_run: bool,
    pub threshold_hours: i64,
    pub cutoff: DateTime<Utc>,
    pub expired: Vec<ExpiredBooking>,
}

impl ExpirationReport {
    pub fn count(&self) -> usize {
        self.expired.len()
    }
}

pub struct Expirer<U: UnitOfWork> {
    uow: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U: UnitOfWork> Expirer<U> {
    pub fn new(uow: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { uow, clock }
    }

    /// Run one sweep. In a single transaction, PENDING bookings
    /// created at or before `now - threshold` are cancelled; rows
    /// locked by another transaction are skipped rather than waited
    /// on. A dry run performs the scan and commits nothing.
    pub async fn run(&self, threshold_hours: i64, dry_run: bool) -> AppResult<ExpirationReport> {
        let now = self.clock.now();
        let cutoff = now - Duration::hours(threshold_hours);

        let expired = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let stale = if dry_run {
                        ctx.bookings().peek_expired_pending(cutoff).await?
                    } else {
                        ctx.bookings().find_expired_pending(cutoff).await?
                    };

                    let report: Vec<ExpiredBooking> = stale
                        .iter()
                        .map(|b| ExpiredBooking {
                            id: b.id,
                            item_id: b.item_id,
                            renter_id: b.renter_id,
                            created_at: b.created_at,
                            age_hours: (now - b.created_at).num_seconds() as f64 / 3600.0,
                        })
                        .collect();

                    if !dry_run {
                        let ids = stale.iter().map(|b| b.id).collect();
                        let cancelled = ctx.bookings().cancel_all(ids, now).await?;
                        tracing::info!(cancelled, threshold_hours, "Expired pending bookings");
                    }

                    Ok(report)
                })
            })
            .await?;

        Ok(ExpirationReport {
            dry_run,
            threshold_hours,
            cutoff,
            expired,
        })
    }
}
