//! 通知渠道 trait 定义

use super::alert::AlertKind;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 通知消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// 消息内容（已格式化）
    pub content: String,
    /// 告警类型
    pub kind: AlertKind,
    /// 消息元数据
    pub metadata: MessageMetadata,
}

impl NotificationMessage {
    /// 创建消息，时间戳取当前时间
    pub fn new(content: impl Into<String>, kind: AlertKind) -> Self {
        Self {
            content: content.into(),
            kind,
            metadata: MessageMetadata {
                device_id: None,
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// 设置设备 ID
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.metadata.device_id = Some(device_id.into());
        self
    }
}

/// 消息元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub device_id: Option<String>,
    /// RFC 3339
    pub timestamp: String,
}

/// 发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    /// 发送成功
    Sent,
    /// 跳过（dry-run 等）
    Skipped(String),
    /// 发送失败
    Failed(String),
}

/// 通知渠道 trait
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// 渠道名称（用于日志和配置）
    fn name(&self) -> &str;

    /// 发送消息，远端拒绝返回 `SendResult::Failed`，`Err` 只用于本地错误（如序列化失败）
    async fn send(&self, message: &NotificationMessage) -> Result<SendResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_message_builder() {
        let msg = NotificationMessage::new("door open", AlertKind::Opened).with_device_id("door-1");

        assert_eq!(msg.content, "door open");
        assert_eq!(msg.kind, AlertKind::Opened);
        assert_eq!(msg.metadata.device_id, Some("door-1".to_string()));
        assert!(chrono::DateTime::parse_from_rfc3339(&msg.metadata.timestamp).is_ok());
    }
}
