//! API 模块常量定义

/// API 密钥请求头
pub const API_KEY_HEADER: &str = "apikey";

/// 请求 ID 响应头
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 采集信标的最大请求体（字节）
pub const MAX_BEACON_BYTES: usize = 64 * 1024;

/// 健康检查中后端探活的超时（秒）
pub const HEALTH_PING_TIMEOUT_SECS: u64 = 5;
