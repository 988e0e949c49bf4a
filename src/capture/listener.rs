use std::sync::Arc;

use tracing::{debug, error};

use super::{ClickPayload, Document, ListenerId, PageContext, PointerEvent};
use crate::session::SessionIdentity;
use crate::tracking::TrackingClient;

/// 页面视图上的点击监听器句柄
///
/// 每个页面视图只注册一个监听器，`detach()` 或 Drop 时移除，且只移除一次。
pub struct ClickCapture {
    document: Arc<Document>,
    listener: Option<ListenerId>,
}

impl ClickCapture {
    pub fn attach(
        document: Arc<Document>,
        session: SessionIdentity,
        client: TrackingClient,
        page: PageContext,
    ) -> Self {
        let href = page.href.clone();
        let listener = document.add_click_listener(Arc::new(move |event: &PointerEvent| {
            handle_click(&session, &client, &page, event);
        }));
        debug!("Click capture attached to {} ({:?})", href, listener);

        Self {
            document,
            listener: Some(listener),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    pub fn detach(mut self) {
        self.detach_once();
    }

    fn detach_once(&mut self) {
        if let Some(id) = self.listener.take() {
            self.document.remove_click_listener(id);
            debug!("Click capture detached ({:?})", id);
        }
    }
}

impl Drop for ClickCapture {
    fn drop(&mut self) {
        self.detach_once();
    }
}

fn handle_click(
    session: &SessionIdentity,
    client: &TrackingClient,
    page: &PageContext,
    event: &PointerEvent,
) {
    let Some(session_id) = session.current_session_id() else {
        error!("No session ID found for click tracking");
        return;
    };

    if tokio::runtime::Handle::try_current().is_err() {
        error!("Click on {} dropped: no async runtime available", page.href);
        return;
    }

    let click = ClickPayload::from_event(event, &page.href).into_new_click(session_id);
    // 写入失败已在 TrackingClient 内记录
    let _ = client.spawn_track_click(click);
}
