use serde::{Deserialize, Serialize};

use crate::dashboard::{DashboardSettings, window_from_minutes};
use crate::errors::{ClickpulseError, Result};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 环境变量前缀：CP__SERVER__PORT=9000
pub const ENV_PREFIX: &str = "CP";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - server: 服务器地址、端口、CPU 数量、CORS
/// - backend: 后端存储地址与访问密钥（必填）
/// - logging: 日志配置
/// - tracking: 采集端占位值与 Cookie
/// - dashboard: 仪表盘窗口与日期格式
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：CP，分隔符：__
    /// 示例：CP__BACKEND__URL=postgres://...
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        use config::{Config, Environment, File};

        let settings = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ClickpulseError::config(format!("Failed to build config: {}", e)))?;

        let config = settings
            .try_deserialize::<StaticConfig>()
            .map_err(|e| ClickpulseError::config(format!("Failed to deserialize config: {}", e)))?;

        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        Ok(config)
    }

    /// 校验必填项与取值范围，任何失败都是启动期致命错误
    pub fn validate(&self) -> Result<()> {
        super::validators::validate_static_config(self)
    }

    /// 示例配置：默认值 + 可直接启动的本地 SQLite 后端
    pub fn sample() -> Self {
        let mut sample_config = Self::default();
        sample_config.backend.url = "sqlite://clickpulse.db?mode=rwc".to_string();
        sample_config.backend.api_key = "change-me".to_string();
        sample_config
    }

    /// 生成示例 TOML 配置文本
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::sample())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ClickpulseError::serialization(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 允许跨域投递采集信标的来源，空表示仅同源
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

/// 后端存储配置
///
/// `url` 与 `api_key` 为必填项，缺失时拒绝启动。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_backend_pool_size")]
    pub pool_size: u32,
    /// 连接超时（秒）
    #[serde(default = "default_backend_timeout")]
    pub timeout: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 采集端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// 未接入地理位置服务，写入固定占位值
    #[serde(default = "default_placeholder")]
    pub placeholder_country: String,
    #[serde(default = "default_placeholder")]
    pub placeholder_city: String,
    /// 保存会话 ID 的 Cookie 名称
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// 页面视图空闲多久后卸载（分钟）
    #[serde(default = "default_page_idle_minutes")]
    pub page_idle_minutes: u64,
}

/// 仪表盘配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_top_clicked_limit")]
    pub top_clicked_limit: u64,
    #[serde(default = "default_active_visitor_window")]
    pub active_visitor_window_minutes: i64,
    #[serde(default = "default_recent_click_window")]
    pub recent_click_window_minutes: i64,
    /// 观看者时区偏移（分钟），未设置时使用本机时区
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
    /// 日期标签格式（chrono strftime），默认与 en-US toLocaleDateString 一致
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl DashboardConfig {
    pub fn settings(&self) -> DashboardSettings {
        DashboardSettings {
            top_clicked_limit: self.top_clicked_limit,
            active_visitor_window: window_from_minutes(self.active_visitor_window_minutes),
            recent_click_window: window_from_minutes(self.recent_click_window_minutes),
            locale: crate::dashboard::ViewerLocale::new(
                self.utc_offset_minutes,
                self.date_format.clone(),
            ),
        }
    }
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_backend_pool_size() -> u32 {
    10
}

fn default_backend_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_placeholder() -> String {
    "Unknown".to_string()
}

fn default_cookie_name() -> String {
    "cp_sid".to_string()
}

fn default_page_idle_minutes() -> u64 {
    30
}

fn default_top_clicked_limit() -> u64 {
    10
}

fn default_active_visitor_window() -> i64 {
    30
}

fn default_recent_click_window() -> i64 {
    60
}

fn default_date_format() -> String {
    "%-m/%-d/%Y".to_string()
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            pool_size: default_backend_pool_size(),
            timeout: default_backend_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            placeholder_country: default_placeholder(),
            placeholder_city: default_placeholder(),
            cookie_name: default_cookie_name(),
            page_idle_minutes: default_page_idle_minutes(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_clicked_limit: default_top_clicked_limit(),
            active_visitor_window_minutes: default_active_visitor_window(),
            recent_click_window_minutes: default_recent_click_window(),
            utc_offset_minutes: None,
            date_format: default_date_format(),
        }
    }
}
