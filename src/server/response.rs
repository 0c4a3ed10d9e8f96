//! 统一的 JSON 响应格式
//!
//! ```json
//! {"status": "success", "message": "Success", "result": ...}
//! {"status": "error", "message": "Device not found"}
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// API 响应信封
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip)]
    code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应（200）
    pub fn success(result: T, message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            result: Some(result),
            details: None,
            code: StatusCode::OK,
        }
    }
}

impl ApiResponse<()> {
    /// 错误响应
    pub fn error(message: impl Into<String>, code: StatusCode) -> Self {
        Self {
            status: "error",
            message: message.into(),
            result: None,
            details: None,
            code,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let code = self.code;
        (code, Json(self)).into_response()
    }
}

/// 将云端错误码映射为 HTTP 状态，非 4xx/5xx 的错误码统一为 502
pub fn status_for_api_code(code: i64) -> StatusCode {
    u16::try_from(code)
        .ok()
        .filter(|c| (400..600).contains(c))
        .and_then(|c| StatusCode::from_u16(c).ok())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}
