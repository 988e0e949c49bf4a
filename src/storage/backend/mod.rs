//! SeaORM storage backend
//!
//! 关系型后端（SQLite、MySQL/MariaDB、PostgreSQL）实现 [`BackendStore`]：
//! 写入在事务中完成，提交后通过 [`InsertFeed`] 广播新行通知。

mod connection;
mod converters;
mod mutations;
mod query;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::config::BackendConfig;
use crate::errors::{ClickpulseError, Result};
use crate::storage::feed::InsertFeed;
use crate::storage::models::StorageConfig;
use crate::storage::{
    BackendStore, InsertHandler, NewClick, NewVisit, Subscription, Table, TopClickedElement, Visit,
};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{
    model_to_click_event, model_to_visit, new_click_to_active_model, new_visit_to_active_model,
};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(ClickpulseError::database_config(format!(
            "无法从后端 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    feed: Arc<InsertFeed>,
}

impl SeaOrmStorage {
    pub async fn new(config: &BackendConfig, backend_name: &str) -> Result<Self> {
        if config.url.is_empty() {
            return Err(ClickpulseError::database_config(
                "backend.url 未设置".to_string(),
            ));
        }

        // 根据不同数据库类型配置连接选项
        let db = if backend_name == "sqlite" {
            connect_sqlite(&config.url, config.timeout).await?
        } else {
            connect_generic(&config.url, backend_name, config.pool_size, config.timeout).await?
        };

        let storage = Self::from_connection(db, backend_name);

        // 运行迁移
        run_migrations(&storage.db).await?;

        warn!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    /// 包装已建立的连接，不运行迁移
    pub fn from_connection(db: DatabaseConnection, backend_name: &str) -> Self {
        SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            feed: Arc::new(InsertFeed::default()),
        }
    }

    pub fn get_backend_config(&self) -> StorageConfig {
        StorageConfig {
            storage_type: self.backend_name.clone(),
            support_realtime: true,
        }
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn feed(&self) -> &InsertFeed {
        &self.feed
    }
}

#[async_trait]
impl BackendStore for SeaOrmStorage {
    fn backend_name(&self) -> &str {
        &self.backend_name
    }

    async fn insert_visits(&self, rows: Vec<NewVisit>) -> Result<()> {
        self.insert_visit_rows(rows).await
    }

    async fn insert_clicks(&self, rows: Vec<NewClick>) -> Result<()> {
        self.insert_click_rows(rows).await
    }

    async fn select_visits(&self) -> Result<Vec<Visit>> {
        self.load_visits_ordered().await
    }

    async fn count_since(&self, table: Table, since: DateTime<Utc>) -> Result<u64> {
        self.count_created_since(table, since).await
    }

    async fn top_clicked_elements(&self, limit: u64) -> Result<Vec<TopClickedElement>> {
        self.get_top_clicked_elements(limit).await
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        self.load_table_names().await
    }

    async fn ping(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| ClickpulseError::database_connection(format!("后端不可达: {}", e)))
    }

    fn subscribe_to_inserts(&self, table: Table, on_insert: InsertHandler) -> Subscription {
        self.feed.subscribe(table, on_insert)
    }
}
