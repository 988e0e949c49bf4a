//! 追踪写入客户端
//!
//! 对后端存储的薄封装：一次调用写入一行。失败时记录日志并返回错误，
//! 不重试，不向访问者暴露。

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::error;

use crate::errors::{ClickpulseError, Result};
use crate::storage::{BackendStore, NewClick, NewVisit};

#[derive(Clone)]
pub struct TrackingClient {
    store: Arc<dyn BackendStore>,
}

impl TrackingClient {
    pub fn new(store: Arc<dyn BackendStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn BackendStore> {
        &self.store
    }

    /// 写入一条访问记录
    pub async fn track_visit(&self, visit: NewVisit) -> Result<()> {
        let session_id = visit.session_id.clone();
        self.store.insert_visits(vec![visit]).await.map_err(|e| {
            error!(
                target: "clickpulse::tracking",
                "Failed to track visit for session {}: {}", session_id, e
            );
            ClickpulseError::tracking_write(format!("visit: {}", e.message()))
        })
    }

    /// 写入一条点击事件
    pub async fn track_click(&self, click: NewClick) -> Result<()> {
        let element_id = click.element_id.clone();
        self.store.insert_clicks(vec![click]).await.map_err(|e| {
            error!(
                target: "clickpulse::tracking",
                "Failed to track click on {}: {}", element_id, e
            );
            ClickpulseError::tracking_write(format!("click: {}", e.message()))
        })
    }

    /// 不等待结果的写入，必须在 tokio 运行时内调用
    pub fn spawn_track_visit(&self, visit: NewVisit) -> JoinHandle<Result<()>> {
        let client = self.clone();
        tokio::spawn(async move { client.track_visit(visit).await })
    }

    pub fn spawn_track_click(&self, click: NewClick) -> JoinHandle<Result<()>> {
        let client = self.clone();
        tokio::spawn(async move { client.track_click(click).await })
    }
}

impl std::fmt::Debug for TrackingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingClient")
            .field("backend", &self.store.backend_name())
            .finish()
    }
}
