use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use tracing::trace;

use crate::api::types::{ErrorCode, error_response, success_response};
use crate::dashboard::DashboardHandle;

pub struct DashboardService;

impl DashboardService {
    pub async fn snapshot(dashboard: web::Data<Arc<DashboardHandle>>) -> HttpResponse {
        if !dashboard.is_mounted() {
            return unavailable();
        }
        let snapshot = dashboard.snapshot();
        trace!("Dashboard snapshot served ({:?})", snapshot.phase);
        success_response(snapshot)
    }

    pub async fn chart(dashboard: web::Data<Arc<DashboardHandle>>) -> HttpResponse {
        if !dashboard.is_mounted() {
            return unavailable();
        }
        success_response(dashboard.chart())
    }
}

fn unavailable() -> HttpResponse {
    error_response(
        StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::ServiceUnavailable,
        "Dashboard is not mounted",
    )
}

pub fn dashboard_routes() -> actix_web::Scope {
    web::scope("")
        .route("/dashboard", web::get().to(DashboardService::snapshot))
        .route("/dashboard/chart", web::get().to(DashboardService::chart))
}
