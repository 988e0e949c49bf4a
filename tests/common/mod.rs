//! 测试共用的后端替身
//!
//! `RecordingStore` 在内存中实现 `BackendStore`：记录每类调用次数、
//! 订阅与取消次数，可注入失败和延迟，并能手动投递新行通知。

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use clickpulse::errors::{ClickpulseError, Result};
use clickpulse::storage::{
    BackendStore, ClickEvent, InsertHandler, InsertNotification, NewClick, NewVisit,
    Subscription, Table, TopClickedElement, Visit,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    InsertVisits,
    InsertClicks,
    SelectVisits,
    CountVisitors,
    CountClicks,
    TopClicked,
}

#[derive(Default)]
pub struct RecordingStore {
    next_id: AtomicI64,
    visits: Mutex<Vec<Visit>>,
    clicks: Mutex<Vec<ClickEvent>>,
    calls: Mutex<BTreeMap<String, usize>>,
    failing: Mutex<HashSet<Op>>,
    delay: Mutex<Option<Duration>>,
    handlers: Mutex<Vec<(u64, Table, InsertHandler)>>,
    cancelled: Arc<Mutex<HashSet<u64>>>,
    pub subscribes: AtomicUsize,
    pub unsubscribes: Arc<AtomicUsize>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record(&self, op: Op) -> Result<()> {
        *self.calls.lock().entry(format!("{:?}", op)).or_default() += 1;
        if self.failing.lock().contains(&op) {
            return Err(ClickpulseError::database_operation(format!(
                "{:?} failed",
                op
            )));
        }
        Ok(())
    }

    pub fn calls(&self, op: Op) -> usize {
        self.calls
            .lock()
            .get(&format!("{:?}", op))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    pub fn fail(&self, op: Op) {
        self.failing.lock().insert(op);
    }

    pub fn heal(&self, op: Op) {
        self.failing.lock().remove(&op);
    }

    /// 让读取操作变慢，用于观察刷新中的状态
    pub fn set_read_delay(&self, delay: Option<Duration>) {
        *self.delay.lock() = delay;
    }

    async fn maybe_delay(&self) {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn visits(&self) -> Vec<Visit> {
        self.visits.lock().clone()
    }

    pub fn clicks(&self) -> Vec<ClickEvent> {
        self.clicks.lock().clone()
    }

    /// 直接写入一条带指定时间的访问，不触发通知
    pub fn seed_visit(&self, session_id: &str, created_at: DateTime<Utc>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.visits.lock().push(Visit {
            id,
            session_id: session_id.to_string(),
            entry_page: "/".to_string(),
            user_agent: "test-agent".to_string(),
            referrer: String::new(),
            country: Some("Unknown".to_string()),
            city: Some("Unknown".to_string()),
            created_at,
        });
    }

    pub fn seed_click(&self, element_id: &str, created_at: DateTime<Utc>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.clicks.lock().push(ClickEvent {
            id,
            visitor_id: "seed".to_string(),
            element_id: element_id.to_string(),
            element_class: "no-class".to_string(),
            element_text: String::new(),
            page_url: "https://example.com/".to_string(),
            x_position: 0,
            y_position: 0,
            created_at,
        });
    }

    /// 向仍然有效的订阅投递一条通知
    pub fn notify(&self, table: Table) {
        let cancelled = self.cancelled.lock().clone();
        let handlers: Vec<InsertHandler> = self
            .handlers
            .lock()
            .iter()
            .filter(|(id, t, _)| *t == table && !cancelled.contains(id))
            .map(|(_, _, h)| h.clone())
            .collect();
        for handler in handlers {
            handler(InsertNotification::inserted(table, 0, Utc::now()));
        }
    }

    /// 模拟取消后仍迟到的通知
    pub fn notify_including_cancelled(&self, table: Table) {
        let handlers: Vec<InsertHandler> = self
            .handlers
            .lock()
            .iter()
            .filter(|(_, t, _)| *t == table)
            .map(|(_, _, h)| h.clone())
            .collect();
        for handler in handlers {
            handler(InsertNotification::inserted(table, 0, Utc::now()));
        }
    }

    pub fn active_subscriptions(&self) -> usize {
        let cancelled = self.cancelled.lock();
        self.handlers
            .lock()
            .iter()
            .filter(|(id, _, _)| !cancelled.contains(id))
            .count()
    }
}

#[async_trait]
impl BackendStore for RecordingStore {
    fn backend_name(&self) -> &str {
        "recording"
    }

    async fn insert_visits(&self, rows: Vec<NewVisit>) -> Result<()> {
        self.record(Op::InsertVisits)?;
        let now = Utc::now();
        let mut visits = self.visits.lock();
        for row in rows {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            visits.push(Visit {
                id,
                session_id: row.session_id,
                entry_page: row.entry_page,
                user_agent: row.user_agent,
                referrer: row.referrer,
                country: row.country,
                city: row.city,
                created_at: now,
            });
        }
        Ok(())
    }

    async fn insert_clicks(&self, rows: Vec<NewClick>) -> Result<()> {
        self.record(Op::InsertClicks)?;
        let now = Utc::now();
        let mut clicks = self.clicks.lock();
        for row in rows {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            clicks.push(ClickEvent {
                id,
                visitor_id: row.visitor_id,
                element_id: row.element_id,
                element_class: row.element_class,
                element_text: row.element_text,
                page_url: row.page_url,
                x_position: row.x_position,
                y_position: row.y_position,
                created_at: now,
            });
        }
        Ok(())
    }

    async fn select_visits(&self) -> Result<Vec<Visit>> {
        self.record(Op::SelectVisits)?;
        self.maybe_delay().await;
        let mut visits = self.visits();
        visits.sort_by_key(|v| v.created_at);
        Ok(visits)
    }

    async fn count_since(&self, table: Table, since: DateTime<Utc>) -> Result<u64> {
        match table {
            Table::Visitors => {
                self.record(Op::CountVisitors)?;
                self.maybe_delay().await;
                Ok(self.visits().iter().filter(|v| v.created_at >= since).count() as u64)
            }
            Table::ClickEvents => {
                self.record(Op::CountClicks)?;
                self.maybe_delay().await;
                Ok(self.clicks().iter().filter(|c| c.created_at >= since).count() as u64)
            }
        }
    }

    async fn top_clicked_elements(&self, limit: u64) -> Result<Vec<TopClickedElement>> {
        self.record(Op::TopClicked)?;
        self.maybe_delay().await;
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for click in self.clicks() {
            *counts.entry(click.element_id).or_default() += 1;
        }
        let mut rows: Vec<TopClickedElement> = counts
            .into_iter()
            .map(|(element_id, count)| TopClickedElement { element_id, count })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.element_id.cmp(&b.element_id)));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(vec!["click_events".to_string(), "visitors".to_string()])
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn subscribe_to_inserts(&self, table: Table, on_insert: InsertHandler) -> Subscription {
        let id = self.subscribes.fetch_add(1, Ordering::SeqCst) as u64;
        self.handlers.lock().push((id, table, on_insert));

        let cancelled = self.cancelled.clone();
        let unsubscribes = self.unsubscribes.clone();
        Subscription::new(table, move || {
            cancelled.lock().insert(id);
            unsubscribes.fetch_add(1, Ordering::SeqCst);
        })
    }
}

/// 轮询等待条件成立，最多 2 秒
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
