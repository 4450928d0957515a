//! Expire-bookings command.
//!
//! Cancels bookings left PENDING past the approval window so their
//! calendar dates free up. Meant to be invoked periodically by an
//! external scheduler, e.g. hourly from cron:
//!
//! ```text
//! 0 * * * * rentit expire-bookings
//! ```

use std::sync::Arc;

use crate::cli::args::ExpireArgs;
use crate::config::Config;
use crate::domain::SystemClock;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Persistence};
use crate::services::Expirer;

/// Execute the expire-bookings command
pub async fn execute(args: ExpireArgs, config: Config) -> AppResult<()> {
    if args.hours <= 0 {
        return Err(AppError::validation("--hours must be positive"));
    }

    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(AppError::from)?;

    let uow = Arc::new(Persistence::new(db.get_connection()));
    let expirer = Expirer::new(uow, Arc::new(SystemClock));

    let report = expirer.run(args.hours, args.dry_run).await?;

    if report.count() == 0 {
        println!(
            "No PENDING bookings older than {}h found. Nothing to expire.",
            report.threshold_hours
        );
        return Ok(());
    }

    if report.dry_run {
        println!("[DRY RUN] Would expire {} booking(s):", report.count());
        for booking in &report.expired {
            println!(
                "  - {} | item: {} | renter: {} | created: {} | age: {:.1}h",
                booking.id,
                booking.item_id,
                booking.renter_id,
                booking.created_at.format("%Y-%m-%d %H:%M"),
                booking.age_hours
            );
        }
        return Ok(());
    }

    println!(
        "Expired {} PENDING booking(s) older than {}h.",
        report.count(),
        report.threshold_hours
    );
    Ok(())
}
