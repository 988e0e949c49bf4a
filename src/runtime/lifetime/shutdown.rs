use std::time::Duration;

use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::api::pages::PageRegistry;
use crate::dashboard::DashboardHandle;

/// 关闭超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

pub async fn listen_for_shutdown(dashboard: &DashboardHandle, pages: &PageRegistry) {
    // 等待 Ctrl+C 信号
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, releasing subscriptions...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }

    let shutdown_result = timeout(
        Duration::from_secs(SHUTDOWN_TIMEOUT_SECS),
        perform_shutdown_tasks(dashboard, pages),
    )
    .await;

    match shutdown_result {
        Ok(()) => info!("All shutdown tasks completed successfully"),
        Err(_) => error!(
            "Shutdown tasks timed out after {} seconds",
            SHUTDOWN_TIMEOUT_SECS
        ),
    }
}

async fn perform_shutdown_tasks(dashboard: &DashboardHandle, pages: &PageRegistry) {
    // 卸载所有页面视图，移除点击监听
    let mounted = pages.len();
    pages.clear();
    info!("Released {} mounted page views", mounted);

    // 取消两个新行订阅
    dashboard.unmount();

    // 让已派发的追踪写入有机会完成
    tokio::task::yield_now().await;
}
