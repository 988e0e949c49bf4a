//! 静态配置校验
//!
//! 启动时调用一次。后端地址与访问密钥缺失属于致命错误，不做任何回退。

use chrono::{FixedOffset, TimeDelta};

use super::StaticConfig;
use crate::dashboard::{MAX_WINDOW_MINUTES, is_valid_date_format};
use crate::errors::{ClickpulseError, Result};

/// 校验整份静态配置，返回第一个发现的问题
pub fn validate_static_config(config: &StaticConfig) -> Result<()> {
    require_non_blank("backend.url", &config.backend.url)?;
    require_non_blank("backend.api_key", &config.backend.api_key)?;
    require_non_blank("tracking.cookie_name", &config.tracking.cookie_name)?;
    require_non_blank("dashboard.date_format", &config.dashboard.date_format)?;

    if config.dashboard.top_clicked_limit == 0 {
        return Err(ClickpulseError::config(
            "dashboard.top_clicked_limit must be greater than 0",
        ));
    }
    if !is_valid_date_format(&config.dashboard.date_format) {
        return Err(ClickpulseError::config(format!(
            "dashboard.date_format is not a valid date format: {:?}",
            config.dashboard.date_format
        )));
    }
    validate_window(
        "dashboard.active_visitor_window_minutes",
        config.dashboard.active_visitor_window_minutes,
    )?;
    validate_window(
        "dashboard.recent_click_window_minutes",
        config.dashboard.recent_click_window_minutes,
    )?;
    if let Some(offset) = config.dashboard.utc_offset_minutes {
        validate_utc_offset(offset)?;
    }

    Ok(())
}

fn require_non_blank(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClickpulseError::config(format!(
            "Missing required configuration value '{}' (env: {})",
            key,
            env_name(key)
        )));
    }
    Ok(())
}

fn validate_window(key: &str, minutes: i64) -> Result<()> {
    let in_range = (1..=MAX_WINDOW_MINUTES).contains(&minutes);
    if !in_range || TimeDelta::try_minutes(minutes).is_none() {
        return Err(ClickpulseError::config(format!(
            "{} must be between 1 and {}, got {}",
            key, MAX_WINDOW_MINUTES, minutes
        )));
    }
    Ok(())
}

fn validate_utc_offset(minutes: i32) -> Result<()> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .map(|_| ())
        .ok_or_else(|| {
            ClickpulseError::config(format!(
                "dashboard.utc_offset_minutes out of range: {}",
                minutes
            ))
        })
}

/// "backend.api_key" -> "CP__BACKEND__API_KEY"
pub fn env_name(key: &str) -> String {
    format!(
        "{}__{}",
        super::ENV_PREFIX,
        key.replace('.', "__").to_uppercase()
    )
}
