//! 通用 Webhook 渠道
//!
//! POST JSON 到任意 URL，可选 Bearer token 认证。

use crate::config::WebhookConfig;
use crate::notification::channel::{NotificationChannel, NotificationMessage, SendResult};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

/// Webhook 请求载荷
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    /// 消息内容
    pub message: &'a str,
    /// 事件类型: door_opened | door_closed | sensor_initialized
    pub event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<&'a str>,
    pub timestamp: &'a str,
}

/// Webhook 渠道
#[derive(Debug)]
pub struct WebhookChannel {
    client: Client,
    config: WebhookConfig,
}

impl WebhookChannel {
    /// 创建新的 Webhook 渠道
    pub fn new(config: WebhookConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            bail!("webhook url is required");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    pub fn build_payload<'a>(message: &'a NotificationMessage) -> WebhookPayload<'a> {
        WebhookPayload {
            message: &message.content,
            event: message.kind.as_str(),
            device_id: message.metadata.device_id.as_deref(),
            timestamp: &message.metadata.timestamp,
        }
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, message: &NotificationMessage) -> Result<SendResult> {
        let mut request = self
            .client
            .post(&self.config.url)
            .json(&Self::build_payload(message));

        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                info!(url = %self.config.url, event = message.kind.as_str(), "Webhook delivered");
                Ok(SendResult::Sent)
            }
            Ok(response) => {
                let status = response.status().as_u16();
                error!(url = %self.config.url, status, "Webhook rejected");
                Ok(SendResult::Failed(format!("HTTP {}", status)))
            }
            Err(e) => {
                error!(url = %self.config.url, error = %e, "Webhook request failed");
                Ok(SendResult::Failed(e.to_string()))
            }
        }
    }
}
