//! Migration to create the analyses table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Analyses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Analyses::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Analyses::BusinessObjectId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Analyses::AnalysisType)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Analyses::Summary).text().null())
                    .col(ColumnDef::new(Analyses::Insights).json_binary().null())
                    .col(ColumnDef::new(Analyses::Recommendations).json_binary().null())
                    .col(ColumnDef::new(Analyses::ConfidenceScore).double().null())
                    .col(ColumnDef::new(Analyses::Metrics).json_binary().null())
                    .col(ColumnDef::new(Analyses::TenantId).string_len(255).not_null())
                    .col(ColumnDef::new(Analyses::CreatedBy).string_len(255).null())
                    .col(
                        ColumnDef::new(Analyses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_analyses_business_object_id")
                            .from(Analyses::Table, Analyses::BusinessObjectId)
                            .to(BusinessObjects::Table, BusinessObjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_analyses_tenant_object")
                    .table(Analyses::Table)
                    .col(Analyses::TenantId)
                    .col(Analyses::BusinessObjectId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_analyses_tenant_object").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Analyses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Analyses {
    Table,
    Id,
    BusinessObjectId,
    AnalysisType,
    Summary,
    Insights,
    Recommendations,
    ConfidenceScore,
    Metrics,
    TenantId,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BusinessObjects {
    Table,
    Id,
}
