//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20250110_000001_create_users_table;
mod m20250110_000002_create_categories_table;
mod m20250111_000001_create_items_tables;
mod m20250112_000001_create_bookings_table;
mod m20250112_000002_booking_overlap_exclusion;
mod m20250113_000001_create_reviews_table;
mod m20250114_000001_create_messaging_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250110_000001_create_users_table::Migration),
            Box::new(m20250110_000002_create_categories_table::Migration),
            Box::new(m20250111_000001_create_items_tables::Migration),
            Box::new(m20250112_000001_create_bookings_table::Migration),
            Box::new(m20250112_000002_booking_overlap_exclusion::Migration),
            Box::new(m20250113_000001_create_reviews_table::Migration),
            Box::new(m20250114_000001_create_messaging_tables::Migration),
        ]
    }
}
