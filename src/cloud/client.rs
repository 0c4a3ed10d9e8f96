//! Tuya OpenAPI HTTP 客户端
//!
//! 只负责 `GET /v1.0/devices/{id}/status`。鉴权使用配置中预先签发的
//! access token，不在此处实现签名与 token 刷新。

use super::source::{FetchError, StatusResult, StatusSource};
use super::types::ApiEnvelope;
use crate::config::CloudConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// 基于 HTTP 轮询的状态源
#[derive(Debug)]
pub struct HttpStatusSource {
    client: Client,
    config: CloudConfig,
}

impl HttpStatusSource {
    /// 创建新的客户端
    pub fn new(config: CloudConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// 设备状态 URL
    pub fn status_url(&self, device_id: &str) -> String {
        format!(
            "{}/v1.0/devices/{}/status",
            self.config.endpoint.trim_end_matches('/'),
            device_id
        )
    }
}

#[async_trait]
impl StatusSource for HttpStatusSource {
    async fn fetch_status(&self, device_id: &str) -> StatusResult {
        let url = self.status_url(device_id);
        let t = chrono::Utc::now().timestamp_millis();

        debug!(url = %url, "Fetching device status");

        let response = self
            .client
            .get(&url)
            .header("client_id", &self.config.access_id)
            .header("access_token", &self.config.access_token)
            .header("t", t.to_string())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // OpenAPI 失败时通常仍返回 200 + success:false，优先解析信封
        match serde_json::from_str::<ApiEnvelope>(&body) {
            Ok(envelope) => envelope.into_readings(),
            Err(_) if !status.is_success() => Err(FetchError::Transport(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            ))),
            Err(e) => Err(FetchError::Decode(e.to_string())),
        }
    }
}
