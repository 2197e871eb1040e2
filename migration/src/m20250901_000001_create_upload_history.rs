use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per attempt to push a generated document to the MES
        manager
            .create_table(
                Table::create()
                    .table(UploadHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UploadHistory::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UploadHistory::Filename).string().not_null())
                    .col(ColumnDef::new(UploadHistory::Status).string().not_null())
                    .col(ColumnDef::new(UploadHistory::Message).text().null())
                    .col(ColumnDef::new(UploadHistory::Payload).json().not_null())
                    .col(
                        ColumnDef::new(UploadHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_upload_history_created_at")
                    .table(UploadHistory::Table)
                    .col(UploadHistory::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UploadHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UploadHistory {
    Table,
    Id,
    Filename,
    Status,
    Message,
    Payload,
    CreatedAt,
}
