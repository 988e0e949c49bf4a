use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::api::pages::PageRegistry;
use crate::api::services::CollectorState;
use crate::config::StaticConfig;
use crate::dashboard::{DashboardAggregator, DashboardHandle};
use crate::storage::{BackendStore, SeaOrmStorage, StorageFactory};
use crate::tracker::Tracker;
use crate::tracking::TrackingClient;

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub dashboard: Arc<DashboardHandle>,
    pub collector: Arc<CollectorState>,
}

/// 准备服务器启动的上下文
///
/// 连接后端并迁移、挂载共享仪表盘、构建采集端状态。
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    // 多个依赖都可能启用 rustls provider，显式选定一个
    let _ = rustls::crypto::ring::default_provider().install_default();

    let storage = StorageFactory::create(&config.backend)
        .await
        .context("Failed to create storage backend")?;
    info!(
        "Using storage backend: {}",
        storage.get_backend_config().storage_type
    );

    let store: Arc<dyn BackendStore> = storage.clone();

    let dashboard = Arc::new(DashboardAggregator::mount(
        store.clone(),
        config.dashboard.settings(),
    ));

    let tracker = Tracker::from_config(TrackingClient::new(store), &config.tracking);
    let collector = Arc::new(CollectorState {
        tracker,
        pages: PageRegistry::new(Duration::from_secs(
            config.tracking.page_idle_minutes.max(1) * 60,
        )),
        cookie_name: config.tracking.cookie_name.clone(),
    });

    info!(
        "Pre-startup completed in {:.2?}",
        start_time.elapsed()
    );

    Ok(StartupContext {
        storage,
        dashboard,
        collector,
    })
}
