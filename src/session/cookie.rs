use std::collections::HashMap;

use parking_lot::Mutex;

use super::{SESSION_KEY, SessionStorage};

/// 以 Cookie 为载体的会话存储
///
/// 由请求中的 Cookie 值初始化；之后写入的会话 ID 通过
/// [`take_issued`](Self::take_issued) 取出，由 HTTP 层回写 `Set-Cookie`。
#[derive(Debug, Default)]
pub struct CookieSessionStorage {
    items: Mutex<HashMap<String, String>>,
    issued: Mutex<Option<String>>,
}

impl CookieSessionStorage {
    pub fn from_cookie(value: Option<&str>) -> Self {
        let storage = Self::default();
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            storage
                .items
                .lock()
                .insert(SESSION_KEY.to_string(), value.to_string());
        }
        storage
    }

    /// 取出本次新写入的会话 ID（只返回一次）
    pub fn take_issued(&self) -> Option<String> {
        self.issued.lock().take()
    }
}

impl SessionStorage for CookieSessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        let previous = self
            .items
            .lock()
            .insert(key.to_string(), value.to_string());

        if key == SESSION_KEY && previous.as_deref() != Some(value) {
            *self.issued.lock() = Some(value.to_string());
        }
    }
}
