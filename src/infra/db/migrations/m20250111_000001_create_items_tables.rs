//! Migration: Create the items and item_images tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .col(ColumnDef::new(Items::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Items::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Items::Title).string().not_null())
                    .col(ColumnDef::new(Items::Description).text().not_null())
                    .col(ColumnDef::new(Items::CategoryId).integer().null())
                    .col(ColumnDef::new(Items::Condition).string().not_null())
                    .col(
                        ColumnDef::new(Items::PricePerDay)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Items::DepositAmount)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Items::Location).string().not_null())
                    .col(
                        ColumnDef::new(Items::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Items::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Items::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_owner")
                            .from(Items::Table, Items::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_category")
                            .from(Items::Table, Items::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, cols) in [
            ("idx_item_owner", vec![Items::OwnerId]),
            ("idx_item_category", vec![Items::CategoryId]),
            ("idx_item_price", vec![Items::PricePerDay]),
            ("idx_item_active_created", vec![Items::IsActive, Items::CreatedAt]),
        ] {
            let mut index = Index::create();
            index.name(name).table(Items::Table);
            for col in cols {
                index.col(col);
            }
            manager.create_index(index.to_owned()).await?;
        }

        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE items ADD CONSTRAINT ck_item_money_non_negative \
                 CHECK (price_per_day >= 0 AND deposit_amount >= 0)",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ItemImages::Table)
                    .col(
                        ColumnDef::new(ItemImages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ItemImages::ItemId).uuid().not_null())
                    .col(ColumnDef::new(ItemImages::Url).string().not_null())
                    .col(
                        ColumnDef::new(ItemImages::IsCover)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ItemImages::Position)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ItemImages::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_image_item")
                            .from(ItemImages::Table, ItemImages::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_item_image_item")
                    .table(ItemImages::Table)
                    .col(ItemImages::ItemId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ItemImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Items {
    Table,
    Id,
    OwnerId,
    Title,
    Description,
    CategoryId,
    Condition,
    PricePerDay,
    DepositAmount,
    Location,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ItemImages {
    Table,
    Id,
    ItemId,
    Url,
    IsCover,
    Position,
    UploadedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
}
