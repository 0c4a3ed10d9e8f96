//! 设备状态源 trait 定义

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 云端返回的配额耗尽错误码
pub const QUOTA_EXHAUSTED_CODE: i64 = 1106;

/// 单条设备读数（code/value 对）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// 数据点编码，如 `doorcontact_state`
    pub code: String,
    /// JSON 标量值
    pub value: serde_json::Value,
}

impl Reading {
    pub fn new(code: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            code: code.into(),
            value: value.into(),
        }
    }
}

/// 状态查询失败
#[derive(Debug, Error)]
pub enum FetchError {
    /// 云端返回 `success: false`
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// 网络或 HTTP 层失败
    #[error("transport error: {0}")]
    Transport(String),

    /// 响应体无法解析
    #[error("invalid response: {0}")]
    Decode(String),
}

impl FetchError {
    /// 是否为配额/权限耗尽：错误码为 1106，或消息中含 "quota" / "permission"（不区分大小写）
    pub fn is_quota_exhausted(&self) -> bool {
        match self {
            FetchError::Api { code, message } => {
                let lower = message.to_lowercase();
                *code == QUOTA_EXHAUSTED_CODE
                    || lower.contains("quota")
                    || lower.contains("permission")
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// 一次状态查询的结果
pub type StatusResult = Result<Vec<Reading>, FetchError>;

/// 设备状态源
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// 查询设备当前全部读数
    async fn fetch_status(&self, device_id: &str) -> StatusResult;
}
