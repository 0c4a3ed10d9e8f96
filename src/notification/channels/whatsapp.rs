//! WhatsApp 渠道 - 通过 WhatsApp 网关 HTTP API 发送群消息

use crate::config::WhatsAppConfig;
use crate::notification::channel::{NotificationChannel, NotificationMessage, SendResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

/// 网关请求载荷
#[derive(Debug, Serialize, PartialEq)]
pub struct WhatsAppPayload {
    /// 群组 ID
    pub phone: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_forwarded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

/// WhatsApp 渠道
#[derive(Debug)]
pub struct WhatsAppChannel {
    client: Client,
    config: WhatsAppConfig,
}

impl WhatsAppChannel {
    pub fn new(config: WhatsAppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// 构造请求载荷，可选字段只在启用时出现
    pub fn build_payload(&self, message: &NotificationMessage) -> WhatsAppPayload {
        WhatsAppPayload {
            phone: self.config.group_id.clone(),
            message: message.content.clone(),
            is_forwarded: self.config.is_forwarded.then_some(true),
            duration: (self.config.duration > 0).then_some(self.config.duration),
        }
    }
}

#[async_trait]
impl NotificationChannel for WhatsAppChannel {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn send(&self, message: &NotificationMessage) -> Result<SendResult> {
        let payload = self.build_payload(message);

        info!(content = %message.content, "Sending WhatsApp message");
        debug!(url = %self.config.api_url, group = %self.config.group_id, "WhatsApp target");

        let response = match self
            .client
            .post(&self.config.api_url)
            .basic_auth(&self.config.api_user, Some(&self.config.api_password))
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Failed to send WhatsApp message");
                return Ok(SendResult::Failed(e.to_string()));
            }
        };

        let status = response.status();
        if status.is_success() {
            info!(status = status.as_u16(), "WhatsApp message sent successfully");
            Ok(SendResult::Sent)
        } else {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), response = %body, "WhatsApp API rejected message");
            Ok(SendResult::Failed(format!("HTTP {}: {}", status.as_u16(), body)))
        }
    }
}
