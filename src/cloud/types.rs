//! Tuya OpenAPI 响应结构

use super::source::{FetchError, Reading};
use serde::Deserialize;

/// OpenAPI 通用响应信封
///
/// ```json
/// {"success": true, "result": [{"code": "doorcontact_state", "value": false}], "t": 1700000000000}
/// {"success": false, "code": 1106, "msg": "permission deny", "t": 1700000000000}
/// ```
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub t: Option<i64>,
}

impl ApiEnvelope {
    /// 转换为读数列表，失败信封转为 `FetchError::Api`
    pub fn into_readings(self) -> Result<Vec<Reading>, FetchError> {
        if !self.success {
            return Err(FetchError::Api {
                code: self.code.unwrap_or(0),
                message: self.msg.unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        match self.result {
            None | Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value)
                .map_err(|e| FetchError::Decode(format!("status result: {}", e))),
        }
    }
}
