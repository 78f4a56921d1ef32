//! Migration to create the systems table.
//!
//! Systems describe external platforms a tenant tracks. The table is reserved:
//! no API reads or writes it yet.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Systems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Systems::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Systems::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Systems::Description).text().null())
                    .col(ColumnDef::new(Systems::Version).string_len(50).null())
                    .col(ColumnDef::new(Systems::EndpointUrl).string_len(500).null())
                    .col(ColumnDef::new(Systems::Configuration).json_binary().null())
                    .col(ColumnDef::new(Systems::TenantId).string_len(255).not_null())
                    .col(ColumnDef::new(Systems::CreatedBy).string_len(255).null())
                    .col(
                        ColumnDef::new(Systems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Systems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Systems::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_systems_name")
                    .table(Systems::Table)
                    .col(Systems::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_systems_tenant_id")
                    .table(Systems::Table)
                    .col(Systems::TenantId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_systems_tenant_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_systems_name").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Systems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Systems {
    Table,
    Id,
    Name,
    Description,
    Version,
    EndpointUrl,
    Configuration,
    TenantId,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
    IsActive,
}
