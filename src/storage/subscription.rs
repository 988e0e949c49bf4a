use std::fmt;

use super::Table;

type CancelFn = Box<dyn FnOnce() + Send>;

/// 新行订阅句柄
///
/// `unsubscribe()` 或 Drop 时执行取消逻辑，且只执行一次。
pub struct Subscription {
    table: Table,
    cancel: Option<CancelFn>,
}

impl Subscription {
    pub fn new(table: Table, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            table,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    pub fn unsubscribe(mut self) {
        self.cancel_once();
    }

    fn cancel_once(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            tracing::debug!("Unsubscribing from {} inserts", self.table);
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_once();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("table", &self.table)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_unsubscribe_runs_cancel_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let sub = Subscription::new(Table::Visitors, move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert!(sub.is_active());
        sub.unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_cancels() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        {
            let _sub = Subscription::new(Table::ClickEvents, move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
