//! 配置加载测试

use tempfile::TempDir;

use clickpulse::config::{StaticConfig, install_config, try_get_config};
use clickpulse::errors::ClickpulseError;

#[cfg(test)]
mod defaults_tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.tracking.placeholder_country, "Unknown");
        assert_eq!(config.tracking.placeholder_city, "Unknown");
        assert_eq!(config.tracking.cookie_name, "cp_sid");
        assert_eq!(config.dashboard.top_clicked_limit, 10);
        assert_eq!(config.dashboard.active_visitor_window_minutes, 30);
        assert_eq!(config.dashboard.recent_click_window_minutes, 60);
        assert_eq!(config.backend.pool_size, 10);
    }

    #[test]
    fn test_default_config_is_rejected() {
        // 后端地址与密钥没有默认值
        let err = StaticConfig::default().validate().unwrap_err();
        assert!(matches!(err, ClickpulseError::Config(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_sample_config_is_valid() {
        assert!(StaticConfig::sample().validate().is_ok());
        let text = StaticConfig::generate_sample_config();
        assert!(text.contains("[backend]"));
        assert!(text.contains("[dashboard]"));
    }

    #[test]
    fn test_dashboard_settings_from_config() {
        let config = StaticConfig::default();
        let settings = config.dashboard.settings();
        assert_eq!(settings.top_clicked_limit, 10);
        assert_eq!(settings.active_visitor_window, chrono::Duration::minutes(30));
        assert_eq!(settings.recent_click_window, chrono::Duration::minutes(60));
    }

    #[test]
    fn test_settings_from_unvalidated_values_do_not_panic() {
        let mut config = StaticConfig::default();
        config.dashboard.active_visitor_window_minutes = i64::MAX / 2;
        config.dashboard.date_format = "%Q".to_string();

        let settings = config.dashboard.settings();
        assert_eq!(
            settings.active_visitor_window,
            chrono::Duration::minutes(clickpulse::dashboard::MAX_WINDOW_MINUTES)
        );
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(settings.locale.format_date(date), "3/9/2024");
    }
}

#[cfg(test)]
mod file_tests {
    use super::*;

    #[test]
    fn test_load_from_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9100

[backend]
url = "sqlite://analytics.db?mode=rwc"
api_key = "anon"

[dashboard]
top_clicked_limit = 5
utc_offset_minutes = 480
"#,
        )
        .unwrap();

        let config = StaticConfig::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.backend.url, "sqlite://analytics.db?mode=rwc");
        assert_eq!(config.dashboard.top_clicked_limit, 5);
        assert_eq!(config.dashboard.utc_offset_minutes, Some(480));
        // 未出现的段落使用默认值
        assert_eq!(config.tracking.cookie_name, "cp_sid");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let config = StaticConfig::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.dashboard.top_clicked_limit, 10);
    }

    #[test]
    fn test_save_then_load_sample() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        StaticConfig::sample().save_to_file(&path).unwrap();
        let loaded = StaticConfig::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.backend.api_key, "change-me");
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_install_config_replaces_global() {
        let mut first = StaticConfig::sample();
        first.server.port = 9001;
        install_config(first);
        assert_eq!(try_get_config().unwrap().server.port, 9001);

        let mut second = StaticConfig::sample();
        second.server.port = 9002;
        install_config(second);
        assert_eq!(try_get_config().unwrap().server.port, 9002);
    }
}
