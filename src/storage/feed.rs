//! 进程内新行通知
//!
//! 每张表一个 broadcast 通道。写入提交后按行发布通知，订阅者在独立任务里
//! 接收并回调。没有订阅者时通知直接丢弃。

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{trace, warn};

use super::{InsertHandler, InsertNotification, Subscription, Table};

/// 通道容量，订阅者落后超过该值会收到 lagged 通知
const DEFAULT_CAPACITY: usize = 1024;

pub struct InsertFeed {
    visitors: broadcast::Sender<InsertNotification>,
    click_events: broadcast::Sender<InsertNotification>,
}

impl Default for InsertFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl InsertFeed {
    pub fn new(capacity: usize) -> Self {
        let (visitors, _) = broadcast::channel(capacity);
        let (click_events, _) = broadcast::channel(capacity);
        Self {
            visitors,
            click_events,
        }
    }

    fn sender(&self, table: Table) -> &broadcast::Sender<InsertNotification> {
        match table {
            Table::Visitors => &self.visitors,
            Table::ClickEvents => &self.click_events,
        }
    }

    pub fn publish(&self, notification: InsertNotification) {
        let table = notification.table;
        if self.sender(table).send(notification).is_err() {
            trace!("No live subscribers for {} inserts", table);
        }
    }

    pub fn subscriber_count(&self, table: Table) -> usize {
        self.sender(table).receiver_count()
    }

    /// 订阅新行通知，必须在 tokio 运行时内调用
    pub fn subscribe(&self, table: Table, on_insert: InsertHandler) -> Subscription {
        let mut rx = self.sender(table).subscribe();

        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(notification) => on_insert(notification),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            "{} insert subscriber lagged, {} notifications skipped",
                            table, skipped
                        );
                        // 订阅端只做全量重取，一次补发即可覆盖被跳过的行
                        on_insert(InsertNotification::lagged(table));
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Subscription::new(table, move || task.abort())
    }
}
