//! 统一响应结构与错误码

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::ClickpulseError;

/// API 错误码
///
/// 使用 serde_repr 序列化为数字，按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 3000-3099: 采集错误
/// - 4000-4099: 仪表盘错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    NotFound = 1004,
    InternalServerError = 1005,
    ServiceUnavailable = 1030,

    ApiKeyMissing = 2000,
    ApiKeyInvalid = 2001,

    TrackingFailed = 3000,

    DashboardFetchFailed = 4000,
}

impl From<&ClickpulseError> for ErrorCode {
    fn from(err: &ClickpulseError) -> Self {
        match err {
            ClickpulseError::Validation(_) | ClickpulseError::Serialization(_) => {
                ErrorCode::BadRequest
            }
            ClickpulseError::TrackingWrite(_) => ErrorCode::TrackingFailed,
            ClickpulseError::DashboardFetch(_) => ErrorCode::DashboardFetchFailed,
            ClickpulseError::DatabaseConnection(_) => ErrorCode::ServiceUnavailable,
            _ => ErrorCode::InternalServerError,
        }
    }
}

/// 错误对应的 HTTP 状态码
pub fn http_status(err: &ClickpulseError) -> StatusCode {
    match err {
        ClickpulseError::Validation(_) | ClickpulseError::Serialization(_) => {
            StatusCode::BAD_REQUEST
        }
        ClickpulseError::DatabaseConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code,
            message: message.into(),
            data,
        })
}

pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

pub fn error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, code, message, None)
}

pub fn error_from_clickpulse(err: &ClickpulseError) -> HttpResponse {
    error_response(http_status(err), ErrorCode::from(err), err.message())
}

/// POST /collect/pageview 请求体，UA 取自请求头
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageviewRequest {
    pub pathname: String,
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub referrer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageviewAccepted {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickAccepted {
    /// 本次点击触达的监听器数量，0 表示被跳过
    pub listeners: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_serializes_as_number() {
        let json = serde_json::to_string(&ErrorCode::ApiKeyInvalid).unwrap();
        assert_eq!(json, "2001");
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = ClickpulseError::validation("pathname is required");
        assert_eq!(http_status(&err), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::from(&err), ErrorCode::BadRequest);
    }

    #[test]
    fn test_response_omits_empty_data() {
        let body = ApiResponse::<()> {
            code: ErrorCode::NotFound,
            message: "gone".into(),
            data: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], 1004);
        assert!(json.get("data").is_none());
    }
}
