use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

/// 后端存储中的表
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Table {
    Visitors,
    ClickEvents,
}

/// 已落库的访问记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: i64,
    pub session_id: String,
    pub entry_page: String,
    pub user_agent: String,
    pub referrer: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 待写入的访问记录，created_at 由存储端赋值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVisit {
    pub session_id: String,
    pub entry_page: String,
    pub user_agent: String,
    pub referrer: String,
    pub country: Option<String>,
    pub city: Option<String>,
}

/// 已落库的点击事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub id: i64,
    pub visitor_id: String,
    pub element_id: String,
    pub element_class: String,
    pub element_text: String,
    pub page_url: String,
    pub x_position: i32,
    pub y_position: i32,
    pub created_at: DateTime<Utc>,
}

/// 待写入的点击事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClick {
    pub visitor_id: String,
    pub element_id: String,
    pub element_class: String,
    pub element_text: String,
    pub page_url: String,
    pub x_position: i32,
    pub y_position: i32,
}

/// get_top_clicked_elements 的结果行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopClickedElement {
    pub element_id: String,
    pub count: i64,
}

/// 新行写入通知
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertNotification {
    pub table: Table,
    /// 新行主键；订阅端落后被跳过若干条时为 None
    pub row_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl InsertNotification {
    pub fn inserted(table: Table, row_id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            table,
            row_id: Some(row_id),
            created_at,
        }
    }

    pub fn lagged(table: Table) -> Self {
        Self {
            table,
            row_id: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StorageConfig {
    pub storage_type: String,
    pub support_realtime: bool,
}
