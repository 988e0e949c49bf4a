//! 会话标识测试

use std::sync::Arc;

use clickpulse::session::{
    CookieSessionStorage, MemorySessionStorage, SESSION_KEY, SessionIdentity, SessionStorage,
};
use uuid::Uuid;

#[cfg(test)]
mod memory_storage_tests {
    use super::*;

    #[test]
    fn test_first_call_creates_and_persists_uuid() {
        let storage = Arc::new(MemorySessionStorage::new());
        let identity = SessionIdentity::new(storage.clone());
        assert!(identity.current_session_id().is_none());

        let session_id = identity.get_or_create_session_id();
        assert!(Uuid::parse_str(&session_id).is_ok());
        assert_eq!(storage.get_item(SESSION_KEY), Some(session_id));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_session_id_is_stable_within_context() {
        let identity = SessionIdentity::new(Arc::new(MemorySessionStorage::new()));
        let first = identity.get_or_create_session_id();
        let second = identity.get_or_create_session_id();
        assert_eq!(first, second);
        assert_eq!(identity.current_session_id(), Some(first));
    }

    #[test]
    fn test_separate_contexts_get_separate_ids() {
        let a = SessionIdentity::new(Arc::new(MemorySessionStorage::new()));
        let b = SessionIdentity::new(Arc::new(MemorySessionStorage::new()));
        assert_ne!(a.get_or_create_session_id(), b.get_or_create_session_id());
    }

    #[test]
    fn test_blank_value_is_treated_as_missing() {
        let storage = Arc::new(MemorySessionStorage::new());
        storage.set_item(SESSION_KEY, "   ");
        let identity = SessionIdentity::new(storage.clone());

        assert!(identity.current_session_id().is_none());
        let session_id = identity.get_or_create_session_id();
        assert!(!session_id.trim().is_empty());
        assert_eq!(storage.get_item(SESSION_KEY), Some(session_id));
    }

    #[test]
    fn test_existing_id_is_reused() {
        let storage = Arc::new(MemorySessionStorage::new());
        storage.set_item(SESSION_KEY, "existing-session");
        let identity = SessionIdentity::new(storage);
        assert_eq!(identity.get_or_create_session_id(), "existing-session");
    }
}

#[cfg(test)]
mod cookie_storage_tests {
    use super::*;

    #[test]
    fn test_cookie_value_becomes_session_id() {
        let storage = Arc::new(CookieSessionStorage::from_cookie(Some("abc-123")));
        let identity = SessionIdentity::new(storage.clone());

        assert_eq!(identity.get_or_create_session_id(), "abc-123");
        assert!(storage.take_issued().is_none());
    }

    #[test]
    fn test_missing_cookie_issues_new_id_once() {
        let storage = Arc::new(CookieSessionStorage::from_cookie(None));
        let identity = SessionIdentity::new(storage.clone());

        let session_id = identity.get_or_create_session_id();
        assert_eq!(storage.take_issued(), Some(session_id));
        assert!(storage.take_issued().is_none());
    }

    #[test]
    fn test_empty_cookie_is_ignored() {
        let storage = CookieSessionStorage::from_cookie(Some("  "));
        assert!(storage.get_item(SESSION_KEY).is_none());
    }
}
