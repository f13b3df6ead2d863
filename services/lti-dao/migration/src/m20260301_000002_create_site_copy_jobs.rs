use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SiteCopyJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SiteCopyJobs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SiteCopyJobs::BatchId).big_integer().not_null())
                    .col(ColumnDef::new(SiteCopyJobs::SourceSiteId).string().not_null())
                    .col(ColumnDef::new(SiteCopyJobs::TargetSiteId).string().not_null())
                    .col(ColumnDef::new(SiteCopyJobs::Status).string().not_null())
                    .col(ColumnDef::new(SiteCopyJobs::Message).text())
                    .col(
                        ColumnDef::new(SiteCopyJobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SiteCopyJobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(SiteCopyJobs::Table)
                    .col(SiteCopyJobs::BatchId)
                    .name("idx_kaltura_site_copy_jobs_batch_id")
                    .to_owned(),
            )
            .await?;

        // Work queue polling filters on status and reads in id order.
        manager
            .create_index(
                Index::create()
                    .table(SiteCopyJobs::Table)
                    .col(SiteCopyJobs::Status)
                    .col(SiteCopyJobs::Id)
                    .name("idx_kaltura_site_copy_jobs_status_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SiteCopyJobs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SiteCopyJobs {
    #[iden = "kaltura_site_copy_jobs"]
    Table,
    Id,
    BatchId,
    SourceSiteId,
    TargetSiteId,
    Status,
    Message,
    CreatedAt,
    UpdatedAt,
}
