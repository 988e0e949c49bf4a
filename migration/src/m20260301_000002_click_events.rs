//! 点击事件表迁移
//!
//! 创建 click_events 表。visitor_id 对应 visitors.session_id，
//! 但不建立外键约束（点击可能先于访问记录落库）。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClickEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClickEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClickEvents::VisitorId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClickEvents::ElementId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClickEvents::ElementClass).text().not_null())
                    .col(ColumnDef::new(ClickEvents::ElementText).text().not_null())
                    .col(ColumnDef::new(ClickEvents::PageUrl).text().not_null())
                    .col(ColumnDef::new(ClickEvents::XPosition).integer().not_null())
                    .col(ColumnDef::new(ClickEvents::YPosition).integer().not_null())
                    .col(
                        ColumnDef::new(ClickEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 最近点击计数
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_click_events_created_at")
                    .table(ClickEvents::Table)
                    .col(ClickEvents::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // get_top_clicked_elements 分组
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_click_events_element_id")
                    .table(ClickEvents::Table)
                    .col(ClickEvents::ElementId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_click_events_element_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_click_events_created_at").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ClickEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ClickEvents {
    #[sea_orm(iden = "click_events")]
    Table,
    Id,
    VisitorId,
    ElementId,
    ElementClass,
    ElementText,
    PageUrl,
    XPosition,
    YPosition,
    CreatedAt,
}
