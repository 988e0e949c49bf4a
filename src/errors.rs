use std::fmt;

#[derive(Debug, Clone)]
pub enum ClickpulseError {
    Config(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    TrackingWrite(String),
    DashboardFetch(String),
    Validation(String),
    Serialization(String),
    FileOperation(String),
}

impl ClickpulseError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ClickpulseError::Config(_) => "E001",
            ClickpulseError::DatabaseConfig(_) => "E002",
            ClickpulseError::DatabaseConnection(_) => "E003",
            ClickpulseError::DatabaseOperation(_) => "E004",
            ClickpulseError::TrackingWrite(_) => "E005",
            ClickpulseError::DashboardFetch(_) => "E006",
            ClickpulseError::Validation(_) => "E007",
            ClickpulseError::Serialization(_) => "E008",
            ClickpulseError::FileOperation(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ClickpulseError::Config(_) => "Configuration Error",
            ClickpulseError::DatabaseConfig(_) => "Database Configuration Error",
            ClickpulseError::DatabaseConnection(_) => "Database Connection Error",
            ClickpulseError::DatabaseOperation(_) => "Database Operation Error",
            ClickpulseError::TrackingWrite(_) => "Tracking Write Error",
            ClickpulseError::DashboardFetch(_) => "Dashboard Fetch Error",
            ClickpulseError::Validation(_) => "Validation Error",
            ClickpulseError::Serialization(_) => "Serialization Error",
            ClickpulseError::FileOperation(_) => "File Operation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ClickpulseError::Config(msg)
            | ClickpulseError::DatabaseConfig(msg)
            | ClickpulseError::DatabaseConnection(msg)
            | ClickpulseError::DatabaseOperation(msg)
            | ClickpulseError::TrackingWrite(msg)
            | ClickpulseError::DashboardFetch(msg)
            | ClickpulseError::Validation(msg)
            | ClickpulseError::Serialization(msg)
            | ClickpulseError::FileOperation(msg) => msg,
        }
    }

    /// 启动阶段的致命错误（配置缺失、数据库不可达）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClickpulseError::Config(_)
                | ClickpulseError::DatabaseConfig(_)
                | ClickpulseError::DatabaseConnection(_)
        )
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ClickpulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ClickpulseError {}

// 便捷的构造函数
impl ClickpulseError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        ClickpulseError::Config(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ClickpulseError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ClickpulseError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ClickpulseError::DatabaseOperation(msg.into())
    }

    pub fn tracking_write<T: Into<String>>(msg: T) -> Self {
        ClickpulseError::TrackingWrite(msg.into())
    }

    pub fn dashboard_fetch<T: Into<String>>(msg: T) -> Self {
        ClickpulseError::DashboardFetch(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ClickpulseError::Validation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ClickpulseError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        ClickpulseError::FileOperation(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ClickpulseError {
    fn from(err: sea_orm::DbErr) -> Self {
        ClickpulseError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ClickpulseError {
    fn from(err: std::io::Error) -> Self {
        ClickpulseError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ClickpulseError {
    fn from(err: serde_json::Error) -> Self {
        ClickpulseError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClickpulseError>;
