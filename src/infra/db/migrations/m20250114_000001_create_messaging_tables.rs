//! Migration: Create the conversations and messages tables.
//!
//! Conversation uniqueness needs two constraints: a composite one for
//! booking-scoped threads, and a partial one for the booking-less
//! general thread (NULL never collides with NULL in a plain unique
//! index, so the absent-booking class gets its own).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Conversations::Table)
                    .col(
                        ColumnDef::new(Conversations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Conversations::Participant1Id)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Conversations::Participant2Id)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Conversations::BookingId).uuid().null())
                    .col(
                        ColumnDef::new(Conversations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Conversations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_conversation_p1")
                            .from(Conversations::Table, Conversations::Participant1Id)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_conversation_p2")
                            .from(Conversations::Table, Conversations::Participant2Id)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_conversation_booking")
                            .from(Conversations::Table, Conversations::BookingId)
                            .to(Bookings::Table, Bookings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        let conn = manager.get_connection();

        // Participants are stored in canonical order and must differ
        conn.execute_unprepared(
            "ALTER TABLE conversations ADD CONSTRAINT ck_conversation_pair_order \
             CHECK (participant_1_id < participant_2_id)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX uq_conversation_pair_booking \
             ON conversations (participant_1_id, participant_2_id, booking_id) \
             WHERE booking_id IS NOT NULL",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX uq_conversation_pair_general \
             ON conversations (participant_1_id, participant_2_id) \
             WHERE booking_id IS NULL",
        )
        .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_conversation_updated")
                    .table(Conversations::Table)
                    .col(Conversations::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .col(ColumnDef::new(Messages::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Messages::ConversationId).uuid().not_null())
                    .col(ColumnDef::new(Messages::SenderId).uuid().not_null())
                    .col(ColumnDef::new(Messages::Content).text().not_null())
                    .col(
                        ColumnDef::new(Messages::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Messages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_conversation")
                            .from(Messages::Table, Messages::ConversationId)
                            .to(Conversations::Table, Conversations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_sender")
                            .from(Messages::Table, Messages::SenderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_message_conversation_created")
                    .table(Messages::Table)
                    .col(Messages::ConversationId)
                    .col(Messages::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Conversations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Conversations {
    Table,
    Id,
    Participant1Id,
    Participant2Id,
    BookingId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Messages {
    Table,
    Id,
    ConversationId,
    SenderId,
    Content,
    IsRead,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Bookings {
    Table,
    Id,
}
