//! Server mode
//!
//! 启动 HTTP 服务：采集信标、仪表盘数据、健康检查。

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders, from_fn},
};
use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

use crate::api::middleware::request_id;
use crate::api::services::AppStartTime;
use crate::api::{AppContext, configure};
use crate::config::StaticConfig;
use crate::runtime::lifetime;
use crate::storage::BackendStore;

/// Build CORS middleware from configuration
///
/// 空列表表示仅同源；`"*"` 表示任意来源。
fn build_cors_middleware(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "HEAD", "OPTIONS"])
        .allowed_headers(vec!["Content-Type", "Authorization", "apikey"])
        .max_age(3600);

    if allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }
    cors
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: Arc<StaticConfig>) -> Result<()> {
    let app_start_time = AppStartTime::now();

    let startup = lifetime::startup::prepare_server_startup(&config)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let store: Arc<dyn BackendStore> = startup.storage.clone();
    let ctx = AppContext {
        store,
        collector: startup.collector.clone(),
        dashboard: startup.dashboard.clone(),
        start_time: app_start_time,
        api_key: config.backend.api_key.clone(),
    };

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let allowed_origins = config.server.cors_allowed_origins.clone();
    if allowed_origins.is_empty() {
        warn!("No CORS origins configured, collector accepts same-origin beacons only");
    }

    let server = HttpServer::new(move || {
        App::new()
            .wrap(from_fn(request_id))
            .wrap(build_cors_middleware(&allowed_origins))
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .configure(|cfg| configure(cfg, &ctx))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server.bind(bind_address)?.run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&startup.dashboard, &startup.collector.pages) => {
            warn!("Graceful shutdown: subscriptions released");
        }
    }

    Ok(())
}
