//! Mutation operations for SeaOrmStorage
//!
//! 写入在单个事务中逐行完成，提交成功后才发布新行通知。

use chrono::Utc;
use sea_orm::{EntityTrait, TransactionTrait};
use tracing::debug;

use super::SeaOrmStorage;
use super::converters::{new_click_to_active_model, new_visit_to_active_model};
use crate::errors::{ClickpulseError, Result};
use crate::storage::{InsertNotification, NewClick, NewVisit, Table};

use migration::entities::{click_event, visitor};

impl SeaOrmStorage {
    pub(super) async fn insert_visit_rows(&self, rows: Vec<NewVisit>) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let created_at = Utc::now();
        let txn = self.db.begin().await.map_err(|e| {
            ClickpulseError::database_operation(format!("开始事务失败: {}", e))
        })?;

        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let result = visitor::Entity::insert(new_visit_to_active_model(row, created_at))
                .exec(&txn)
                .await
                .map_err(|e| {
                    ClickpulseError::database_operation(format!("写入访问记录失败: {}", e))
                })?;
            inserted.push(result.last_insert_id);
        }

        txn.commit()
            .await
            .map_err(|e| ClickpulseError::database_operation(format!("提交事务失败: {}", e)))?;

        debug!("Inserted {} visitor rows", inserted.len());
        for id in inserted {
            self.feed
                .publish(InsertNotification::inserted(Table::Visitors, id, created_at));
        }
        Ok(())
    }

    pub(super) async fn insert_click_rows(&self, rows: Vec<NewClick>) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let created_at = Utc::now();
        let txn = self.db.begin().await.map_err(|e| {
            ClickpulseError::database_operation(format!("开始事务失败: {}", e))
        })?;

        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let result = click_event::Entity::insert(new_click_to_active_model(row, created_at))
                .exec(&txn)
                .await
                .map_err(|e| {
                    ClickpulseError::database_operation(format!("写入点击事件失败: {}", e))
                })?;
            inserted.push(result.last_insert_id);
        }

        txn.commit()
            .await
            .map_err(|e| ClickpulseError::database_operation(format!("提交事务失败: {}", e)))?;

        debug!("Inserted {} click_events rows", inserted.len());
        for id in inserted {
            self.feed.publish(InsertNotification::inserted(
                Table::ClickEvents,
                id,
                created_at,
            ));
        }
        Ok(())
    }
}
