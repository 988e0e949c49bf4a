//! Query operations for SeaOrmStorage
//!
//! 只读查询：按时间排序的访问列表、精确计数、热门元素聚合和表清单。

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Statement, sea_query::Expr,
};
use tracing::debug;

use super::converters::model_to_visit;
use super::SeaOrmStorage;
use crate::errors::{ClickpulseError, Result};
use crate::storage::{Table, TopClickedElement, Visit};

use migration::entities::{click_event, visitor};

/// get_top_clicked_elements 查询结果行
#[derive(Debug, FromQueryResult)]
struct TopClickedRow {
    element_id: String,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct TableNameRow {
    table_name: String,
}

impl SeaOrmStorage {
    pub(super) async fn load_visits_ordered(&self) -> Result<Vec<Visit>> {
        let models = visitor::Entity::find()
            .order_by_asc(visitor::Column::CreatedAt)
            .order_by_asc(visitor::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ClickpulseError::database_operation(format!("查询访问记录失败: {}", e)))?;

        debug!("Loaded {} visitor rows", models.len());
        Ok(models.into_iter().map(model_to_visit).collect())
    }

    pub(super) async fn count_created_since(
        &self,
        table: Table,
        since: DateTime<Utc>,
    ) -> Result<u64> {
        let result = match table {
            Table::Visitors => {
                visitor::Entity::find()
                    .filter(visitor::Column::CreatedAt.gte(since))
                    .count(&self.db)
                    .await
            }
            Table::ClickEvents => {
                click_event::Entity::find()
                    .filter(click_event::Column::CreatedAt.gte(since))
                    .count(&self.db)
                    .await
            }
        };

        result.map_err(|e| {
            ClickpulseError::database_operation(format!("统计 {} 失败: {}", table, e))
        })
    }

    /// 按 element_id 分组计数，点击数降序，同数时按 element_id 升序
    pub(super) async fn get_top_clicked_elements(
        &self,
        limit: u64,
    ) -> Result<Vec<TopClickedElement>> {
        let rows = click_event::Entity::find()
            .select_only()
            .column(click_event::Column::ElementId)
            .column_as(click_event::Column::Id.count(), "count")
            .group_by(click_event::Column::ElementId)
            .order_by_desc(Expr::cust("count"))
            .order_by_asc(click_event::Column::ElementId)
            .limit(limit)
            .into_model::<TopClickedRow>()
            .all(&self.db)
            .await
            .map_err(|e| ClickpulseError::database_operation(format!("热门元素查询失败: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| TopClickedElement {
                element_id: row.element_id,
                count: row.count,
            })
            .collect())
    }

    pub(super) async fn load_table_names(&self) -> Result<Vec<String>> {
        let backend = self.db.get_database_backend();
        let sql = match backend {
            DbBackend::Sqlite => {
                "SELECT name AS table_name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
            }
            DbBackend::Postgres => {
                "SELECT table_name::text AS table_name FROM information_schema.tables \
                 WHERE table_schema = 'public' AND table_type = 'BASE TABLE' ORDER BY table_name"
            }
            _ => {
                "SELECT table_name AS table_name FROM information_schema.tables \
                 WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE' ORDER BY table_name"
            }
        };

        let rows = TableNameRow::find_by_statement(Statement::from_string(backend, sql))
            .all(&self.db)
            .await
            .map_err(|e| ClickpulseError::database_operation(format!("读取表清单失败: {}", e)))?;

        Ok(rows.into_iter().map(|row| row.table_name).collect())
    }
}
