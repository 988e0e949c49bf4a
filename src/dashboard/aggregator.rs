use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tracing::{debug, error, info};

use super::series::bucket_visits_by_date;
use super::{
    DashboardPhase, DashboardSettings, DashboardSnapshot, LineChartConfig, RealtimeCounters,
    VisitorBucket, window_start,
};
use crate::errors::{ClickpulseError, Result};
use crate::storage::{
    BackendStore, InsertNotification, Subscription, Table, TopClickedElement, Visit,
};

#[derive(Default)]
struct DashboardState {
    loaded: bool,
    visitors: Vec<VisitorBucket>,
    top_clicked: Vec<TopClickedElement>,
    counters: RealtimeCounters,
}

struct Shared {
    store: Arc<dyn BackendStore>,
    settings: DashboardSettings,
    state: RwLock<DashboardState>,
    /// 进行中的通知刷新数量
    in_flight: AtomicUsize,
    closed: AtomicBool,
    shutdown: watch::Sender<bool>,
    loaded: watch::Sender<bool>,
}

/// 刷新任务结束（或被取消）时递减计数
struct InFlightGuard(Arc<Shared>);

impl InFlightGuard {
    fn enter(shared: &Arc<Shared>) -> Self {
        shared.in_flight.fetch_add(1, Ordering::SeqCst);
        Self(shared.clone())
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn wait_closed(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|closed| *closed).await;
}

pub struct DashboardAggregator;

impl DashboardAggregator {
    /// 挂载仪表盘：订阅两张表的新行，并在后台完成首次加载
    ///
    /// 必须在 tokio 运行时内调用。
    pub fn mount(store: Arc<dyn BackendStore>, settings: DashboardSettings) -> DashboardHandle {
        let (shutdown, _) = watch::channel(false);
        let (loaded, _) = watch::channel(false);

        let shared = Arc::new(Shared {
            store,
            settings,
            state: RwLock::new(DashboardState::default()),
            in_flight: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            shutdown,
            loaded,
        });

        let subscriptions = vec![
            subscribe(&shared, Table::Visitors),
            subscribe(&shared, Table::ClickEvents),
        ];

        let initial = shared.clone();
        shared.spawn_cancellable(async move { initial.load_initial().await });

        info!(
            "Dashboard mounted on {} backend",
            shared.store.backend_name()
        );

        DashboardHandle {
            shared,
            subscriptions: Mutex::new(subscriptions),
        }
    }
}

fn subscribe(shared: &Arc<Shared>, table: Table) -> Subscription {
    // 订阅回调只持有弱引用，避免 store -> feed -> 回调 -> store 的循环
    let weak: Weak<Shared> = Arc::downgrade(shared);
    shared.store.subscribe_to_inserts(
        table,
        Arc::new(move |notification: InsertNotification| {
            if let Some(shared) = weak.upgrade() {
                shared.on_insert(notification);
            }
        }),
    )
}

impl Shared {
    fn spawn_cancellable<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let shutdown = self.shutdown.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = wait_closed(shutdown) => {}
                _ = task => {}
            }
        });
    }

    fn on_insert(self: &Arc<Self>, notification: InsertNotification) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }

        debug!(
            "Insert on {} (row {:?}), refreshing dashboard",
            notification.table, notification.row_id
        );

        let guard = InFlightGuard::enter(self);
        let shared = self.clone();
        self.spawn_cancellable(async move {
            let _guard = guard;
            match notification.table {
                Table::Visitors => shared.refresh_visits().await,
                Table::ClickEvents => shared.refresh_clicks().await,
            }
        });
    }

    async fn load_initial(&self) {
        let now = Utc::now();
        let store = &self.store;
        let active_since = window_start(now, self.settings.active_visitor_window);
        let clicks_since = window_start(now, self.settings.recent_click_window);

        let (visits, top_clicked, active_visitors, recent_clicks) = tokio::join!(
            store.select_visits(),
            store.top_clicked_elements(self.settings.top_clicked_limit),
            store.count_since(Table::Visitors, active_since),
            store.count_since(Table::ClickEvents, clicks_since),
        );

        // 按 a, b, c, d 顺序应用，遇到第一个失败即停止，已应用的部分保留
        if let Err(e) = self.apply_initial(visits, top_clicked, active_visitors, recent_clicks) {
            error!(target: "clickpulse::dashboard", "Error fetching analytics: {}", e);
        }

        self.state.write().loaded = true;
        self.loaded.send_replace(true);
        debug!("Dashboard initial load finished");
    }

    fn apply_initial(
        &self,
        visits: Result<Vec<Visit>>,
        top_clicked: Result<Vec<TopClickedElement>>,
        active_visitors: Result<u64>,
        recent_clicks: Result<u64>,
    ) -> Result<()> {
        let series = bucket_visits_by_date(&visits.map_err(fetch_error)?, &self.settings.locale);
        self.state.write().visitors = series;

        self.state.write().top_clicked = top_clicked.map_err(fetch_error)?;
        self.state.write().counters.active_visitors = active_visitors.map_err(fetch_error)?;
        self.state.write().counters.recent_clicks = recent_clicks.map_err(fetch_error)?;
        Ok(())
    }

    /// 新访问：全量重算日期序列 + 活跃访客数，点击数据不动
    async fn refresh_visits(&self) {
        let since = window_start(Utc::now(), self.settings.active_visitor_window);
        let (visits, active) = tokio::join!(
            self.store.select_visits(),
            self.store.count_since(Table::Visitors, since),
        );

        match visits {
            Ok(visits) => {
                let series = bucket_visits_by_date(&visits, &self.settings.locale);
                self.state.write().visitors = series;
            }
            Err(e) => error!(target: "clickpulse::dashboard", "Error refreshing visitors: {}", e),
        }

        match active {
            Ok(count) => self.state.write().counters.active_visitors = count,
            Err(e) => {
                error!(target: "clickpulse::dashboard", "Error refreshing active visitors: {}", e)
            }
        }
    }

    /// 新点击：重取热门元素 + 近期点击数，访问数据不动
    async fn refresh_clicks(&self) {
        let since = window_start(Utc::now(), self.settings.recent_click_window);
        let (top_clicked, recent) = tokio::join!(
            self.store
                .top_clicked_elements(self.settings.top_clicked_limit),
            self.store.count_since(Table::ClickEvents, since),
        );

        match top_clicked {
            Ok(rows) => self.state.write().top_clicked = rows,
            Err(e) => {
                error!(target: "clickpulse::dashboard", "Error refreshing top clicked elements: {}", e)
            }
        }

        match recent {
            Ok(count) => self.state.write().counters.recent_clicks = count,
            Err(e) => error!(target: "clickpulse::dashboard", "Error refreshing recent clicks: {}", e),
        }
    }

    fn phase(&self) -> DashboardPhase {
        if !self.state.read().loaded {
            DashboardPhase::Loading
        } else if self.in_flight.load(Ordering::SeqCst) > 0 {
            DashboardPhase::ReadyUpdating
        } else {
            DashboardPhase::Ready
        }
    }
}

fn fetch_error(e: ClickpulseError) -> ClickpulseError {
    ClickpulseError::dashboard_fetch(e.message())
}

/// 已挂载的仪表盘
///
/// `unmount()` 可重复调用，两个订阅各只取消一次；Drop 时自动卸载。
pub struct DashboardHandle {
    shared: Arc<Shared>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl DashboardHandle {
    pub fn phase(&self) -> DashboardPhase {
        self.shared.phase()
    }

    pub fn is_mounted(&self) -> bool {
        !self.shared.closed.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let phase = self.shared.phase();
        let state = self.shared.state.read();
        DashboardSnapshot {
            phase,
            visitors: state.visitors.clone(),
            top_clicked: state.top_clicked.clone(),
            counters: state.counters,
            chart: LineChartConfig::daily_visitors(&state.visitors),
        }
    }

    pub fn chart(&self) -> LineChartConfig {
        LineChartConfig::daily_visitors(&self.shared.state.read().visitors)
    }

    /// 等待首次加载完成（或仪表盘被卸载）
    pub async fn ready(&self) {
        let loaded = self.shared.loaded.subscribe();
        let shutdown = self.shared.shutdown.subscribe();
        tokio::select! {
            _ = wait_loaded(loaded) => {}
            _ = wait_closed(shutdown) => {}
        }
    }

    pub fn unmount(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let subscriptions: Vec<Subscription> = self.subscriptions.lock().drain(..).collect();
        for subscription in subscriptions {
            subscription.unsubscribe();
        }

        // 取消仍在进行的刷新
        self.shared.shutdown.send_replace(true);
        info!("Dashboard unmounted");
    }
}

async fn wait_loaded(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|loaded| *loaded).await;
}

impl Drop for DashboardHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}
