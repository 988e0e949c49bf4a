//! 仪表盘聚合
//!
//! 挂载时并发拉取四项数据（全部访问、热门元素、活跃访客、近期点击），
//! 之后由新行通知驱动局部刷新。状态通过 [`DashboardHandle::snapshot`] 读取。

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

mod aggregator;
pub mod chart;
pub mod series;

pub use aggregator::{DashboardAggregator, DashboardHandle};
pub use chart::LineChartConfig;
pub use series::bucket_visits_by_date;

use crate::storage::TopClickedElement;

/// en-US `toLocaleDateString` 的格式
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// 统计窗口上限：一年
pub const MAX_WINDOW_MINUTES: i64 = 366 * 24 * 60;

/// 格式串能否解析并渲染一个纯日期
///
/// 未知占位符（`%Q`）和需要时间或时区的占位符（`%H`、`%z`）在渲染时都会失败。
pub fn is_valid_date_format(format: &str) -> bool {
    if format.trim().is_empty()
        || StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
    {
        return false;
    }
    let mut rendered = String::new();
    write!(rendered, "{}", NaiveDate::default().format(format)).is_ok()
}

/// 窗口分钟数收敛到 [1, MAX_WINDOW_MINUTES]
pub fn window_from_minutes(minutes: i64) -> TimeDelta {
    TimeDelta::try_minutes(minutes.clamp(1, MAX_WINDOW_MINUTES)).unwrap_or(TimeDelta::MAX)
}

/// `now - window`，溢出时取最早可表示时间
pub fn window_start(now: DateTime<Utc>, window: TimeDelta) -> DateTime<Utc> {
    now.checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardPhase {
    Loading,
    Ready,
    /// 有后台刷新在进行，展示的是上一次的数据
    ReadyUpdating,
}

/// 某一天的访问数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorBucket {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealtimeCounters {
    /// 最近 30 分钟的访问数
    pub active_visitors: u64,
    /// 最近 60 分钟的点击数
    pub recent_clicks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub phase: DashboardPhase,
    pub visitors: Vec<VisitorBucket>,
    pub top_clicked: Vec<TopClickedElement>,
    pub counters: RealtimeCounters,
    pub chart: LineChartConfig,
}

/// 观看者的时区与日期格式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerLocale {
    /// None 表示使用本机时区
    offset: Option<FixedOffset>,
    date_format: String,
}

impl Default for ViewerLocale {
    fn default() -> Self {
        Self {
            offset: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl ViewerLocale {
    pub fn new(utc_offset_minutes: Option<i32>, date_format: impl Into<String>) -> Self {
        let offset = utc_offset_minutes.and_then(|minutes| {
            let offset = FixedOffset::east_opt(minutes.saturating_mul(60));
            if offset.is_none() {
                warn!(
                    "Invalid viewer UTC offset {} minutes, falling back to local time",
                    minutes
                );
            }
            offset
        });

        let mut date_format = date_format.into();
        if !is_valid_date_format(&date_format) {
            warn!(
                "Invalid date format {:?}, falling back to {}",
                date_format, DEFAULT_DATE_FORMAT
            );
            date_format = DEFAULT_DATE_FORMAT.to_string();
        }

        Self {
            offset,
            date_format,
        }
    }

    pub fn utc() -> Self {
        Self::new(Some(0), DEFAULT_DATE_FORMAT)
    }

    /// 时间戳在观看者时区中的日历日期
    pub fn calendar_date(&self, at: DateTime<Utc>) -> NaiveDate {
        match self.offset {
            Some(offset) => at.with_timezone(&offset).date_naive(),
            None => at.with_timezone(&Local).date_naive(),
        }
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format(&self.date_format).to_string()
    }
}

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub top_clicked_limit: u64,
    pub active_visitor_window: TimeDelta,
    pub recent_click_window: TimeDelta,
    pub locale: ViewerLocale,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            top_clicked_limit: 10,
            active_visitor_window: window_from_minutes(30),
            recent_click_window: window_from_minutes(60),
            locale: ViewerLocale::default(),
        }
    }
}
