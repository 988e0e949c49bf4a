//! 服务端页面视图注册表
//!
//! 每个 Cookie 会话对应一个已挂载的页面视图（文档 + 追踪句柄）。
//! 空闲超时、显式离开或重新挂载都会丢弃旧视图，从而移除其点击监听。

use std::sync::Arc;
use std::time::Duration;

use moka::notification::RemovalCause;
use moka::sync::Cache;
use tracing::debug;

use crate::capture::{Document, PageContext, PointerEvent};
use crate::session::CookieSessionStorage;
use crate::tracker::{BrowsingContext, Tracker, TrackerHandle};

const MAX_PAGE_VIEWS: u64 = 100_000;

pub struct PageView {
    document: Arc<Document>,
    tracker: TrackerHandle,
}

impl PageView {
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    pub fn session_id(&self) -> &str {
        self.tracker.session_id()
    }
}

/// 挂载结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedPage {
    pub session_id: String,
    /// 本次新发放的会话 ID，需要回写 Cookie
    pub issued_session: Option<String>,
}

#[derive(Clone)]
pub struct PageRegistry {
    pages: Cache<String, Arc<PageView>>,
}

impl PageRegistry {
    pub fn new(idle: Duration) -> Self {
        let pages = Cache::builder()
            .max_capacity(MAX_PAGE_VIEWS)
            .time_to_idle(idle)
            .eviction_listener(|session: Arc<String>, _page, cause: RemovalCause| {
                if cause.was_evicted() {
                    debug!("Page view for session {} evicted ({:?})", session, cause);
                }
            })
            .build();
        Self { pages }
    }

    /// 为 Cookie 会话挂载新的页面视图，同一会话的旧视图先被卸载
    pub fn mount(
        &self,
        tracker: &Tracker,
        session_cookie: Option<&str>,
        page: PageContext,
    ) -> MountedPage {
        if let Some(previous) = session_cookie {
            self.pages.invalidate(previous);
        }

        let storage = Arc::new(CookieSessionStorage::from_cookie(session_cookie));
        let document = Arc::new(Document::new());
        let handle = tracker.mount(
            BrowsingContext::new(storage.clone(), page),
            document.clone(),
        );

        let session_id = handle.session_id().to_string();
        self.pages.insert(
            session_id.clone(),
            Arc::new(PageView {
                document,
                tracker: handle,
            }),
        );

        MountedPage {
            session_id,
            issued_session: storage.take_issued(),
        }
    }

    /// 把点击分发到该会话的页面文档，返回触达的监听器数量
    pub fn dispatch_click(&self, session_id: &str, event: &PointerEvent) -> Option<usize> {
        self.pages
            .get(session_id)
            .map(|page| page.document().dispatch_click(event))
    }

    /// 卸载页面视图，返回是否存在
    pub fn leave(&self, session_id: &str) -> bool {
        self.pages.remove(session_id).is_some()
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<PageView>> {
        self.pages.get(session_id)
    }

    pub fn len(&self) -> u64 {
        self.pages.run_pending_tasks();
        self.pages.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.pages.invalidate_all();
        self.pages.run_pending_tasks();
    }
}
