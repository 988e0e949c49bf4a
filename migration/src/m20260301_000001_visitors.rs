//! 访客表迁移
//!
//! 创建 visitors 表，每个浏览上下文（标签页）的首次访问写入一行：
//! - 会话 ID (session_id)
//! - 入口页面、用户代理、来源页面
//! - 地理位置占位值 (country, city)
//! - 服务端写入时间 (created_at)

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Visitors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Visitors::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Visitors::SessionId).string_len(64).not_null())
                    .col(ColumnDef::new(Visitors::EntryPage).text().not_null())
                    .col(ColumnDef::new(Visitors::UserAgent).text().not_null())
                    .col(ColumnDef::new(Visitors::Referrer).text().not_null())
                    .col(ColumnDef::new(Visitors::Country).string_len(100).null())
                    .col(ColumnDef::new(Visitors::City).string_len(100).null())
                    .col(
                        ColumnDef::new(Visitors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 时间范围查询（活跃访客计数、按日期分桶）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_visitors_created_at")
                    .table(Visitors::Table)
                    .col(Visitors::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_visitors_session_id")
                    .table(Visitors::Table)
                    .col(Visitors::SessionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_visitors_session_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_visitors_created_at").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Visitors::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Visitors {
    #[sea_orm(iden = "visitors")]
    Table,
    Id,
    SessionId,
    EntryPage,
    UserAgent,
    Referrer,
    Country,
    City,
    CreatedAt,
}
