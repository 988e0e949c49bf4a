//! 会话标识
//!
//! 每个浏览上下文（标签页）持有一个会话 ID，首次访问时生成并写入
//! [`SessionStorage`]，之后该上下文内的所有访问与点击都复用它。

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

mod cookie;

pub use cookie::CookieSessionStorage;

/// 会话 ID 在存储中的键名，访问与点击两条路径共用
pub const SESSION_KEY: &str = "analytics_session_id";

/// 浏览上下文级别的键值存储
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
}

/// 进程内存储，一个实例对应一个浏览上下文
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.read().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items.write().insert(key.to_string(), value.to_string());
    }
}

#[derive(Clone)]
pub struct SessionIdentity {
    storage: Arc<dyn SessionStorage>,
}

impl SessionIdentity {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// 读取会话 ID，不存在时生成 UUID v4 并持久化
    pub fn get_or_create_session_id(&self) -> String {
        if let Some(existing) = self.current_session_id() {
            return existing;
        }

        let session_id = Uuid::new_v4().to_string();
        self.storage.set_item(SESSION_KEY, &session_id);
        tracing::debug!("New analytics session started: {}", session_id);
        session_id
    }

    /// 只读查询，点击路径使用
    pub fn current_session_id(&self) -> Option<String> {
        self.storage
            .get_item(SESSION_KEY)
            .filter(|id| !id.trim().is_empty())
    }
}

impl std::fmt::Debug for SessionIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIdentity")
            .field("session_id", &self.current_session_id())
            .finish()
    }
}
