//! Initial schema: users and router connections

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. Create users table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Email, 255).not_null().unique_key())
                    .col(string_len(User::PasswordHash, 255).not_null())
                    .col(ColumnDef::new(User::FullName).string_len(255).null())
                    .col(string_len(User::Role, 32).not_null().default("user"))
                    .col(boolean(User::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(User::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(User::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_email")
                    .table(User::Table)
                    .col(User::Email)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. Create router_connections table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(RouterConnection::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RouterConnection::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RouterConnection::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(RouterConnection::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RouterConnection::RouterIp)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RouterConnection::ApiPort)
                            .integer()
                            .not_null()
                            .default(8728),
                    )
                    .col(
                        ColumnDef::new(RouterConnection::ApiUsername)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RouterConnection::ApiPassword)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(RouterConnection::ApiSsl)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RouterConnection::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RouterConnection::LastConnected)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RouterConnection::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_router_connections_user_id")
                            .from(RouterConnection::Table, RouterConnection::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_router_connections_user_created")
                    .table(RouterConnection::Table)
                    .col(RouterConnection::UserId)
                    .col(RouterConnection::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RouterConnection::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Email,
    PasswordHash,
    FullName,
    Role,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RouterConnection {
    #[sea_orm(iden = "router_connections")]
    Table,
    Id,
    UserId,
    Name,
    RouterIp,
    ApiPort,
    ApiUsername,
    ApiPassword,
    ApiSsl,
    IsActive,
    LastConnected,
    CreatedAt,
}
