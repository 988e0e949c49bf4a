pub mod collect;
pub mod dashboard;
pub mod health;

pub use collect::{CollectService, CollectorState, collect_routes};
pub use dashboard::{DashboardService, dashboard_routes};
pub use health::{AppStartTime, HealthService, health_routes};
