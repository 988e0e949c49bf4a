//! 后端存储契约
//!
//! 追踪端与仪表盘只依赖 [`BackendStore`]：写入、按时间排序读取、
//! 精确计数、服务端聚合函数以及新行订阅。[`SeaOrmStorage`] 是基于
//! SeaORM 的关系型实现（SQLite / MySQL / PostgreSQL）。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::BackendConfig;
use crate::errors::Result;

pub mod backend;
pub mod feed;
pub mod models;
mod subscription;

pub use backend::SeaOrmStorage;
pub use feed::InsertFeed;
pub use models::{
    ClickEvent, InsertNotification, NewClick, NewVisit, StorageConfig, Table, TopClickedElement,
    Visit,
};
pub use subscription::Subscription;

/// 服务端聚合函数名，返回按点击数降序的前 N 个元素
pub const TOP_CLICKED_FUNCTION: &str = "get_top_clicked_elements";

/// 新行通知回调，在订阅任务中被调用，不应阻塞
pub type InsertHandler = Arc<dyn Fn(InsertNotification) + Send + Sync>;

#[async_trait]
pub trait BackendStore: Send + Sync {
    /// 存储类型名称（sqlite / mysql / postgres / ...）
    fn backend_name(&self) -> &str;

    /// insert(visitors, rows)
    async fn insert_visits(&self, rows: Vec<NewVisit>) -> Result<()>;

    /// insert(click_events, rows)
    async fn insert_clicks(&self, rows: Vec<NewClick>) -> Result<()>;

    /// select(visitors).order(created_at)
    async fn select_visits(&self) -> Result<Vec<Visit>>;

    /// select(table, count: exact).filter(created_at >= since)
    async fn count_since(&self, table: Table, since: DateTime<Utc>) -> Result<u64>;

    /// rpc(get_top_clicked_elements, { limit_count })
    async fn top_clicked_elements(&self, limit: u64) -> Result<Vec<TopClickedElement>>;

    /// 列出后端中的业务表
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// 连通性检查
    async fn ping(&self) -> Result<()>;

    /// 订阅指定表的新行通知，返回的句柄负责取消订阅
    fn subscribe_to_inserts(&self, table: Table, on_insert: InsertHandler) -> Subscription;
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &BackendConfig) -> Result<Arc<SeaOrmStorage>> {
        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(&config.url)?;

        let storage = SeaOrmStorage::new(config, &backend_type).await?;
        Ok(Arc::new(storage))
    }
}
