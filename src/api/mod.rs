//! HTTP 接口
//!
//! - `/collect/*`: 采集信标（需 API key）
//! - `/api/*`: 仪表盘数据（需 API key）
//! - `/health`: 存活与就绪检查

pub mod constants;
pub mod middleware;
pub mod pages;
pub mod services;
pub mod types;

use std::sync::Arc;

use actix_web::web;

use crate::dashboard::DashboardHandle;
use crate::storage::BackendStore;
use middleware::ApiKeyAuth;
use services::{AppStartTime, CollectorState, collect_routes, dashboard_routes, health_routes};

/// 所有路由共享的应用状态
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn BackendStore>,
    pub collector: Arc<CollectorState>,
    pub dashboard: Arc<DashboardHandle>,
    pub start_time: AppStartTime,
    pub api_key: String,
}

/// 注册应用数据与全部路由，服务器和测试共用
pub fn configure(cfg: &mut web::ServiceConfig, ctx: &AppContext) {
    cfg.app_data(web::Data::new(ctx.store.clone()))
        .app_data(web::Data::from(ctx.collector.clone()))
        .app_data(web::Data::new(ctx.dashboard.clone()))
        .app_data(web::Data::new(ctx.start_time.clone()))
        .app_data(web::JsonConfig::default().limit(constants::MAX_BEACON_BYTES))
        .service(web::scope("/health").service(health_routes()))
        .service(
            web::scope("/collect")
                .wrap(ApiKeyAuth::new(ctx.api_key.clone()))
                .service(collect_routes()),
        )
        .service(
            web::scope("/api")
                .wrap(ApiKeyAuth::new(ctx.api_key.clone()))
                .service(dashboard_routes()),
        );
}
