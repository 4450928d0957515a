//! Migration: Create the bookings table.
//!
//! Business rules that must survive any application bug are CHECKed
//! here: date ordering, no self-booking, minimum duration and
//! non-negative money. The overlap exclusion constraint follows in
//! its own migration (it needs the btree_gist extension).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .col(ColumnDef::new(Bookings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Bookings::ItemId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::RenterId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::StartDate).date().not_null())
                    .col(ColumnDef::new(Bookings::EndDate).date().not_null())
                    .col(ColumnDef::new(Bookings::Status).string().not_null())
                    .col(ColumnDef::new(Bookings::TotalDays).integer().not_null())
                    .col(
                        ColumnDef::new(Bookings::BaseTotal)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::DiscountRate)
                            .decimal_len(4, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Bookings::DiscountAmount)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Bookings::FinalTotal)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::Deposit)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_item")
                            .from(Bookings::Table, Bookings::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_renter")
                            .from(Bookings::Table, Bookings::RenterId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_owner")
                            .from(Bookings::Table, Bookings::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, cols) in [
            ("idx_booking_item_status", vec![Bookings::ItemId, Bookings::Status]),
            ("idx_booking_renter", vec![Bookings::RenterId]),
            ("idx_booking_owner", vec![Bookings::OwnerId]),
            ("idx_booking_status", vec![Bookings::Status]),
            ("idx_booking_dates", vec![Bookings::StartDate, Bookings::EndDate]),
            ("idx_booking_created", vec![Bookings::CreatedAt]),
        ] {
            let mut index = Index::create();
            index.name(name).table(Bookings::Table);
            for col in cols {
                index.col(col);
            }
            manager.create_index(index.to_owned()).await?;
        }

        let checks = [
            "ALTER TABLE bookings ADD CONSTRAINT ck_booking_date_order \
             CHECK (start_date < end_date)",
            "ALTER TABLE bookings ADD CONSTRAINT ck_booking_no_self \
             CHECK (renter_id <> owner_id)",
            "ALTER TABLE bookings ADD CONSTRAINT ck_booking_min_duration \
             CHECK (total_days >= 1)",
            "ALTER TABLE bookings ADD CONSTRAINT ck_booking_money_non_negative \
             CHECK (base_total >= 0 AND discount_amount >= 0 \
                    AND final_total >= 0 AND deposit >= 0)",
        ];
        for sql in checks {
            manager.get_connection().execute_unprepared(sql).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Bookings {
    Table,
    Id,
    ItemId,
    RenterId,
    OwnerId,
    StartDate,
    EndDate,
    Status,
    TotalDays,
    BaseTotal,
    DiscountRate,
    DiscountAmount,
    FinalTotal,
    Deposit,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Items {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
