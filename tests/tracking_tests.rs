//! 追踪写入、点击捕获与追踪器生命周期测试

mod common;

use std::sync::Arc;
use std::time::Duration;

use clickpulse::capture::{
    ClickCapture, Document, ElementSnapshot, NO_CLASS, NO_ID, PageContext, PointerEvent,
};
use clickpulse::errors::ClickpulseError;
use clickpulse::session::{MemorySessionStorage, SESSION_KEY, SessionIdentity, SessionStorage};
use clickpulse::storage::{BackendStore, NewClick, NewVisit};
use clickpulse::tracker::{BrowsingContext, Tracker};
use clickpulse::tracking::TrackingClient;
use common::{Op, RecordingStore, wait_until};

fn client_for(store: &Arc<RecordingStore>) -> TrackingClient {
    let backend: Arc<dyn BackendStore> = store.clone();
    TrackingClient::new(backend)
}

fn page(pathname: &str) -> PageContext {
    PageContext {
        href: format!("https://example.com{}", pathname),
        pathname: pathname.to_string(),
        user_agent: "Mozilla/5.0 (test)".to_string(),
        referrer: "https://search.example/".to_string(),
    }
}

fn click_on(id: &str, classes: &[&str], text: Option<&str>, x: i32, y: i32) -> PointerEvent {
    PointerEvent {
        target: ElementSnapshot {
            id: id.to_string(),
            class_list: classes.iter().map(|c| c.to_string()).collect(),
            text_content: text.map(str::to_string),
        },
        client_x: x,
        client_y: y,
    }
}

// =============================================================================
// TrackingClient
// =============================================================================

#[cfg(test)]
mod client_tests {
    use super::*;

    fn visit() -> NewVisit {
        NewVisit {
            session_id: "sid".to_string(),
            entry_page: "/".to_string(),
            user_agent: "ua".to_string(),
            referrer: String::new(),
            country: Some("Unknown".to_string()),
            city: Some("Unknown".to_string()),
        }
    }

    fn click() -> NewClick {
        NewClick {
            visitor_id: "sid".to_string(),
            element_id: "cta".to_string(),
            element_class: "btn".to_string(),
            element_text: "Go".to_string(),
            page_url: "/".to_string(),
            x_position: 1,
            y_position: 2,
        }
    }

    #[tokio::test]
    async fn test_track_visit_writes_one_row() {
        let store = RecordingStore::new();
        client_for(&store).track_visit(visit()).await.unwrap();

        assert_eq!(store.calls(Op::InsertVisits), 1);
        assert_eq!(store.visits().len(), 1);
        assert_eq!(store.visits()[0].session_id, "sid");
    }

    #[tokio::test]
    async fn test_failed_visit_returns_tracking_error_without_retry() {
        let store = RecordingStore::new();
        store.fail(Op::InsertVisits);

        let err = client_for(&store).track_visit(visit()).await.unwrap_err();
        assert!(matches!(err, ClickpulseError::TrackingWrite(_)));
        assert_eq!(store.calls(Op::InsertVisits), 1);
        assert!(store.visits().is_empty());
    }

    #[tokio::test]
    async fn test_failed_click_returns_tracking_error() {
        let store = RecordingStore::new();
        store.fail(Op::InsertClicks);

        let err = client_for(&store).track_click(click()).await.unwrap_err();
        assert!(matches!(err, ClickpulseError::TrackingWrite(_)));
        assert_eq!(store.calls(Op::InsertClicks), 1);
    }

    #[tokio::test]
    async fn test_spawned_write_reports_result() {
        let store = RecordingStore::new();
        store.fail(Op::InsertClicks);
        let client = client_for(&store);

        let result = client.spawn_track_click(click()).await.unwrap();
        assert!(result.is_err());

        store.heal(Op::InsertClicks);
        let result = client.spawn_track_click(click()).await.unwrap();
        assert!(result.is_ok());
        assert_eq!(store.clicks().len(), 1);
    }
}

// =============================================================================
// ClickCapture
// =============================================================================

#[cfg(test)]
mod capture_tests {
    use super::*;

    fn identity_with(session: Option<&str>) -> SessionIdentity {
        let storage = Arc::new(MemorySessionStorage::new());
        if let Some(session) = session {
            storage.set_item(SESSION_KEY, session);
        }
        SessionIdentity::new(storage)
    }

    #[tokio::test]
    async fn test_click_is_written_with_payload() {
        let store = RecordingStore::new();
        let document = Arc::new(Document::new());
        let _capture = ClickCapture::attach(
            document.clone(),
            identity_with(Some("sid-1")),
            client_for(&store),
            page("/pricing"),
        );

        let reached = document.dispatch_click(&click_on(
            "signup",
            &["btn", "btn-primary"],
            Some("Sign up"),
            120,
            48,
        ));
        assert_eq!(reached, 1);

        assert!(wait_until(|| store.clicks().len() == 1).await);
        let click = &store.clicks()[0];
        assert_eq!(click.visitor_id, "sid-1");
        assert_eq!(click.element_id, "signup");
        assert_eq!(click.element_class, "btn btn-primary");
        assert_eq!(click.element_text, "Sign up");
        assert_eq!(click.page_url, "https://example.com/pricing");
        assert_eq!((click.x_position, click.y_position), (120, 48));
    }

    #[tokio::test]
    async fn test_sentinels_for_bare_element() {
        let store = RecordingStore::new();
        let document = Arc::new(Document::new());
        let _capture = ClickCapture::attach(
            document.clone(),
            identity_with(Some("sid-1")),
            client_for(&store),
            page("/"),
        );

        document.dispatch_click(&click_on("", &[], None, 0, 0));

        assert!(wait_until(|| store.clicks().len() == 1).await);
        let click = &store.clicks()[0];
        assert_eq!(click.element_id, NO_ID);
        assert_eq!(click.element_class, NO_CLASS);
        assert_eq!(click.element_text, "");
    }

    #[tokio::test]
    async fn test_click_without_session_is_skipped() {
        let store = RecordingStore::new();
        let document = Arc::new(Document::new());
        let _capture = ClickCapture::attach(
            document.clone(),
            identity_with(None),
            client_for(&store),
            page("/"),
        );

        document.dispatch_click(&click_on("cta", &[], None, 1, 1));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(store.calls(Op::InsertClicks), 0);
    }

    #[tokio::test]
    async fn test_detach_removes_listener_once() {
        let store = RecordingStore::new();
        let document = Arc::new(Document::new());
        let capture = ClickCapture::attach(
            document.clone(),
            identity_with(Some("sid")),
            client_for(&store),
            page("/"),
        );
        assert_eq!(document.listener_count(), 1);
        assert!(capture.is_attached());

        capture.detach();
        assert_eq!(document.listener_count(), 0);

        assert_eq!(document.dispatch_click(&click_on("cta", &[], None, 1, 1)), 0);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.calls(Op::InsertClicks), 0);
    }

    #[tokio::test]
    async fn test_failed_click_write_does_not_break_dispatch() {
        let store = RecordingStore::new();
        store.fail(Op::InsertClicks);
        let document = Arc::new(Document::new());
        let _capture = ClickCapture::attach(
            document.clone(),
            identity_with(Some("sid")),
            client_for(&store),
            page("/"),
        );

        assert_eq!(document.dispatch_click(&click_on("a", &[], None, 1, 1)), 1);
        assert_eq!(document.dispatch_click(&click_on("b", &[], None, 1, 1)), 1);
        assert!(wait_until(|| store.calls(Op::InsertClicks) == 2).await);
        assert!(store.clicks().is_empty());
    }
}

// =============================================================================
// Tracker 生命周期
// =============================================================================

#[cfg(test)]
mod tracker_tests {
    use super::*;

    fn tracker_for(store: &Arc<RecordingStore>) -> Tracker {
        Tracker::new(client_for(store), "Unknown", "Unknown")
    }

    #[tokio::test]
    async fn test_mount_writes_exactly_one_visit() {
        let store = RecordingStore::new();
        let session = Arc::new(MemorySessionStorage::new());
        let document = Arc::new(Document::new());

        let mut handle = tracker_for(&store).mount(
            BrowsingContext::new(session.clone(), page("/pricing")),
            document.clone(),
        );
        handle.take_visit_task().unwrap().await.unwrap().unwrap();

        assert_eq!(store.calls(Op::InsertVisits), 1);
        let visit = &store.visits()[0];
        assert_eq!(visit.session_id, handle.session_id());
        assert_eq!(visit.entry_page, "/pricing");
        assert_eq!(visit.user_agent, "Mozilla/5.0 (test)");
        assert_eq!(visit.referrer, "https://search.example/");
        assert_eq!(visit.country.as_deref(), Some("Unknown"));
        assert_eq!(visit.city.as_deref(), Some("Unknown"));
        assert_eq!(
            session.get_item(SESSION_KEY).as_deref(),
            Some(handle.session_id())
        );
        assert!(handle.is_mounted());
        assert_eq!(document.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_visit_and_clicks_share_session_id() {
        let store = RecordingStore::new();
        let session = Arc::new(MemorySessionStorage::new());
        let document = Arc::new(Document::new());

        let mut handle = tracker_for(&store).mount(
            BrowsingContext::new(session, page("/")),
            document.clone(),
        );
        handle.take_visit_task().unwrap().await.unwrap().unwrap();

        document.dispatch_click(&click_on("cta", &["btn"], Some("Go"), 5, 6));
        assert!(wait_until(|| store.clicks().len() == 1).await);

        assert_eq!(store.clicks()[0].visitor_id, store.visits()[0].session_id);
    }

    #[tokio::test]
    async fn test_remount_in_same_context_reuses_session() {
        let store = RecordingStore::new();
        let session = Arc::new(MemorySessionStorage::new());
        let tracker = tracker_for(&store);

        let first = tracker.mount(
            BrowsingContext::new(session.clone(), page("/")),
            Arc::new(Document::new()),
        );
        let first_id = first.session_id().to_string();
        first.unmount();

        let second = tracker.mount(
            BrowsingContext::new(session, page("/docs")),
            Arc::new(Document::new()),
        );
        assert_eq!(second.session_id(), first_id);

        assert!(wait_until(|| store.visits().len() == 2).await);
        assert!(store.visits().iter().all(|v| v.session_id == first_id));
    }

    #[tokio::test]
    async fn test_unmount_detaches_listener() {
        let store = RecordingStore::new();
        let document = Arc::new(Document::new());
        let handle = tracker_for(&store).mount(
            BrowsingContext::new(Arc::new(MemorySessionStorage::new()), page("/")),
            document.clone(),
        );

        handle.unmount();
        assert_eq!(document.listener_count(), 0);
        assert_eq!(document.dispatch_click(&click_on("cta", &[], None, 0, 0)), 0);
    }

    #[tokio::test]
    async fn test_drop_detaches_listener() {
        let store = RecordingStore::new();
        let document = Arc::new(Document::new());
        {
            let _handle = tracker_for(&store).mount(
                BrowsingContext::new(Arc::new(MemorySessionStorage::new()), page("/")),
                document.clone(),
            );
            assert_eq!(document.listener_count(), 1);
        }
        assert_eq!(document.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_visit_write_still_mounts() {
        let store = RecordingStore::new();
        store.fail(Op::InsertVisits);
        let document = Arc::new(Document::new());

        let mut handle = tracker_for(&store).mount(
            BrowsingContext::new(Arc::new(MemorySessionStorage::new()), page("/")),
            document.clone(),
        );
        let result = handle.take_visit_task().unwrap().await.unwrap();

        assert!(matches!(result, Err(ClickpulseError::TrackingWrite(_))));
        assert!(handle.is_mounted());
        assert_eq!(document.listener_count(), 1);
    }
}
