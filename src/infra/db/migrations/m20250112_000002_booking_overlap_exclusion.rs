//! Migration: Install the booking overlap exclusion constraint.
//!
//! A GiST index over (item_id, daterange) lets PostgreSQL reject, at
//! insert/update time, any pair of active bookings for the same item
//! whose inclusive date ranges intersect. The constraint cannot be
//! bypassed by application code, which makes it the authoritative
//! enforcement of the overlap invariant; row locks in the service
//! layer only serialize admission so conflicts fail fast.
//!
//! Raw SQL because the schema builder cannot express
//! `daterange(start_date, end_date, '[]')` over two separate date
//! columns.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("CREATE EXTENSION IF NOT EXISTS btree_gist")
            .await?;

        conn.execute_unprepared(
            "ALTER TABLE bookings ADD CONSTRAINT xcl_booking_no_overlap \
             EXCLUDE USING GIST ( \
                 item_id WITH =, \
                 daterange(start_date, end_date, '[]') WITH && \
             ) WHERE (status IN ('pending', 'approved', 'payment_pending'))",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE bookings DROP CONSTRAINT IF EXISTS xcl_booking_no_overlap",
            )
            .await?;
        Ok(())
    }
}
