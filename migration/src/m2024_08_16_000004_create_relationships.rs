//! Migration to create the relationships table.
//!
//! Relationships are typed directed edges between two business objects. Both
//! endpoints reference `business_objects.id`; source and target may be equal.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Relationships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Relationships::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Relationships::SourceId).uuid().not_null())
                    .col(ColumnDef::new(Relationships::TargetId).uuid().not_null())
                    .col(ColumnDef::new(Relationships::Type).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Relationships::Description)
                            .string_len(500)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Relationships::TenantId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Relationships::CreatedBy)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Relationships::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_relationships_source_id")
                            .from(Relationships::Table, Relationships::SourceId)
                            .to(BusinessObjects::Table, BusinessObjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_relationships_target_id")
                            .from(Relationships::Table, Relationships::TargetId)
                            .to(BusinessObjects::Table, BusinessObjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_relationships_tenant_id")
                    .table(Relationships::Table)
                    .col(Relationships::TenantId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_relationships_tenant_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Relationships::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Relationships {
    Table,
    Id,
    SourceId,
    TargetId,
    Type,
    Description,
    TenantId,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BusinessObjects {
    Table,
    Id,
}
