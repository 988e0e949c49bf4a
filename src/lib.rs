//! clickpulse - self-hosted visit and click analytics
//!
//! 页面端追踪（会话标识、点击采集、访问记录）写入关系型后端，
//! 仪表盘在挂载时拉取数据并随新行通知实时刷新。
//!
//! # Features
//! - **server**: HTTP collector and dashboard (default)
//! - **cli**: maintenance commands
//!
//! # Architecture
//! - `session`: per browsing context session id
//! - `capture`: document click listener and payload shaping
//! - `tracking`: thin write client over the backend store
//! - `tracker`: page-side mount/unmount lifecycle
//! - `dashboard`: aggregator, date bucketing, chart config
//! - `storage`: backend store contract and SeaORM implementation
//! - `api`: HTTP routes and middleware
//! - `config`, `system`, `runtime`: configuration, logging, lifecycle

#[cfg(feature = "server")]
pub mod api;
pub mod capture;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod system;
pub mod tracker;
pub mod tracking;
