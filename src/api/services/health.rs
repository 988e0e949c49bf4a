use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, trace};

use crate::api::constants::HEALTH_PING_TIMEOUT_SECS;
use crate::api::types::{ErrorCode, json_response};
use crate::dashboard::{DashboardHandle, DashboardPhase};
use crate::storage::BackendStore;

// 应用启动时间
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct HealthStorageCheck {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct HealthDashboardCheck {
    pub mounted: bool,
    pub phase: DashboardPhase,
}

#[derive(Serialize, Debug)]
pub struct HealthChecks {
    pub storage: HealthStorageCheck,
    pub dashboard: HealthDashboardCheck,
}

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u32,
    pub checks: HealthChecks,
    pub response_time_ms: u32,
}

/// Health Service
///
/// 直接探测后端，不经过追踪或仪表盘逻辑。
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        store: web::Data<Arc<dyn BackendStore>>,
        dashboard: web::Data<Arc<DashboardHandle>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> HttpResponse {
        let start_time = Instant::now();
        trace!("Received health check request");

        let backend = store.backend_name().to_string();
        let storage = match tokio::time::timeout(
            Duration::from_secs(HEALTH_PING_TIMEOUT_SECS),
            store.ping(),
        )
        .await
        {
            Ok(Ok(())) => HealthStorageCheck {
                status: "healthy".to_string(),
                backend,
                error: None,
            },
            Ok(Err(e)) => {
                error!("Storage health check failed: {}", e);
                HealthStorageCheck {
                    status: "unhealthy".to_string(),
                    backend,
                    error: Some(e.to_string()),
                }
            }
            Err(_) => {
                error!("Storage health check timeout");
                HealthStorageCheck {
                    status: "unhealthy".to_string(),
                    backend,
                    error: Some("timeout".to_string()),
                }
            }
        };

        let now = chrono::Utc::now();
        let uptime_seconds = (now - app_start_time.start_datetime).num_seconds().max(0) as u32;
        let is_healthy = storage.status == "healthy";

        let body = HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            timestamp: now.to_rfc3339(),
            uptime: uptime_seconds,
            checks: HealthChecks {
                storage,
                dashboard: HealthDashboardCheck {
                    mounted: dashboard.is_mounted(),
                    phase: dashboard.phase(),
                },
            },
            response_time_ms: start_time.elapsed().as_millis() as u32,
        };

        if is_healthy {
            json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(body))
        } else {
            json_response(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ServiceUnavailable,
                "Backend unavailable",
                Some(body),
            )
        }
    }

    /// 首次加载完成后才算就绪
    pub async fn readiness_check(dashboard: web::Data<Arc<DashboardHandle>>) -> HttpResponse {
        match dashboard.phase() {
            DashboardPhase::Loading => HttpResponse::ServiceUnavailable().finish(),
            _ => HttpResponse::NoContent().finish(),
        }
    }

    pub async fn liveness_check() -> HttpResponse {
        HttpResponse::NoContent().finish()
    }
}

pub fn health_routes() -> actix_web::Scope {
    web::scope("")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
