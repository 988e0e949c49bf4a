//! 页面端追踪生命周期
//!
//! `mount` 时确定会话 ID、写入一次访问记录并挂上点击监听；
//! `unmount` 或 Drop 时移除监听。同一浏览上下文重新挂载前先卸载旧句柄。

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::capture::{ClickCapture, Document, PageContext};
use crate::config::TrackingConfig;
use crate::errors::Result;
use crate::session::{SessionIdentity, SessionStorage};
use crate::storage::NewVisit;
use crate::tracking::TrackingClient;

/// 浏览上下文：会话存储 + 当前页面环境
#[derive(Clone)]
pub struct BrowsingContext {
    pub session: Arc<dyn SessionStorage>,
    pub page: PageContext,
}

impl BrowsingContext {
    pub fn new(session: Arc<dyn SessionStorage>, page: PageContext) -> Self {
        Self { session, page }
    }
}

#[derive(Clone, Debug)]
pub struct Tracker {
    client: TrackingClient,
    placeholder_country: String,
    placeholder_city: String,
}

impl Tracker {
    pub fn new(
        client: TrackingClient,
        placeholder_country: impl Into<String>,
        placeholder_city: impl Into<String>,
    ) -> Self {
        Self {
            client,
            placeholder_country: placeholder_country.into(),
            placeholder_city: placeholder_city.into(),
        }
    }

    pub fn from_config(client: TrackingClient, config: &TrackingConfig) -> Self {
        Self::new(
            client,
            config.placeholder_country.clone(),
            config.placeholder_city.clone(),
        )
    }

    /// 必须在 tokio 运行时内调用
    pub fn mount(&self, context: BrowsingContext, document: Arc<Document>) -> TrackerHandle {
        let identity = SessionIdentity::new(context.session.clone());
        let session_id = identity.get_or_create_session_id();

        let visit = NewVisit {
            session_id: session_id.clone(),
            entry_page: context.page.pathname.clone(),
            user_agent: context.page.user_agent.clone(),
            referrer: context.page.referrer.clone(),
            country: Some(self.placeholder_country.clone()),
            city: Some(self.placeholder_city.clone()),
        };
        let visit_task = self.client.spawn_track_visit(visit);

        info!(
            "Tracker mounted on {} for session {}",
            context.page.pathname, session_id
        );

        let capture = ClickCapture::attach(document, identity, self.client.clone(), context.page);

        TrackerHandle {
            session_id,
            capture: Some(capture),
            visit_task: Some(visit_task),
        }
    }
}

pub struct TrackerHandle {
    session_id: String,
    capture: Option<ClickCapture>,
    visit_task: Option<JoinHandle<Result<()>>>,
}

impl TrackerHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_mounted(&self) -> bool {
        self.capture.as_ref().is_some_and(ClickCapture::is_attached)
    }

    /// 取出挂载时发起的访问写入任务，调用方可选择等待
    pub fn take_visit_task(&mut self) -> Option<JoinHandle<Result<()>>> {
        self.visit_task.take()
    }

    pub fn unmount(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(capture) = self.capture.take() {
            capture.detach();
            debug!("Tracker unmounted for session {}", self.session_id);
        }
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for TrackerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerHandle")
            .field("session_id", &self.session_id)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
