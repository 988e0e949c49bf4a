use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// 被点击的元素
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub class_list: Vec<String>,
    #[serde(default)]
    pub text_content: Option<String>,
}

/// 点击事件，坐标相对视口
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub target: ElementSnapshot,
    #[serde(default)]
    pub client_x: i32,
    #[serde(default)]
    pub client_y: i32,
}

/// 页面环境：地址、UA、来源
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub href: String,
    pub pathname: String,
    pub user_agent: String,
    #[serde(default)]
    pub referrer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

pub type ClickListener = Arc<dyn Fn(&PointerEvent) + Send + Sync>;

/// 页面级点击事件目标
#[derive(Default)]
pub struct Document {
    listeners: DashMap<ListenerId, ClickListener>,
    next_id: AtomicU64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_click_listener(&self, listener: ClickListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.insert(id, listener);
        id
    }

    /// 返回监听器是否存在
    pub fn remove_click_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// 按注册顺序同步调用所有监听器，返回调用数量
    pub fn dispatch_click(&self, event: &PointerEvent) -> usize {
        // 先复制出监听器再调用，监听器内部可以安全地增删监听
        let mut live: Vec<(ListenerId, ClickListener)> = self
            .listeners
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        live.sort_by_key(|(id, _)| *id);

        for (_, listener) in &live {
            listener(event);
        }
        live.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
