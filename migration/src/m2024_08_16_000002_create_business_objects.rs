//! Migration to create the business_objects table.
//!
//! Enumerated columns (`type`, `status`, `complexity`) are stored as their
//! lowercase string form. Rows are soft-deleted through `is_active`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BusinessObjects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BusinessObjects::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BusinessObjects::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(BusinessObjects::Type).string_len(32).not_null())
                    .col(ColumnDef::new(BusinessObjects::Description).text().null())
                    .col(
                        ColumnDef::new(BusinessObjects::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(BusinessObjects::Complexity)
                            .string_len(32)
                            .not_null()
                            .default("low"),
                    )
                    .col(ColumnDef::new(BusinessObjects::Owner).string_len(255).null())
                    .col(ColumnDef::new(BusinessObjects::Tags).text().null())
                    .col(
                        ColumnDef::new(BusinessObjects::TenantId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BusinessObjects::CreatedBy)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BusinessObjects::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(BusinessObjects::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(BusinessObjects::IsActive)
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
                    .name("idx_business_objects_name")
                    .table(BusinessObjects::Table)
                    .col(BusinessObjects::Name)
                    .to_owned(),
            )
            .await?;

        // Listing always filters on tenant and active flag, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_business_objects_tenant_id")
                    .table(BusinessObjects::Table)
                    .col(BusinessObjects::TenantId)
                    .col(BusinessObjects::IsActive)
                    .col(BusinessObjects::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_business_objects_tenant_id")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(Index::drop().name("idx_business_objects_name").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BusinessObjects::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BusinessObjects {
    Table,
    Id,
    Name,
    Type,
    Description,
    Status,
    Complexity,
    Owner,
    Tags,
    TenantId,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
    IsActive,
}
