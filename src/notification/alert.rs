//! 门磁告警 - 告警类型、文案与 Notifier

use super::channel::NotificationMessage;
use super::dispatcher::NotificationDispatcher;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{info, warn};

/// 告警类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// 门被打开
    Opened,
    /// 门被关闭
    Closed,
    /// 监控启动后的首次读数
    Initialized,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Opened => "door_opened",
            AlertKind::Closed => "door_closed",
            AlertKind::Initialized => "sensor_initialized",
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "opened" | "open" | "door_opened" => Ok(AlertKind::Opened),
            "closed" | "close" | "door_closed" => Ok(AlertKind::Closed),
            "initialized" | "init" | "sensor_initialized" => Ok(AlertKind::Initialized),
            other => Err(format!(
                "unknown alert kind '{}', expected opened, closed or initialized",
                other
            )),
        }
    }
}

/// 告警文案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertMessages {
    pub opened: String,
    pub closed: String,
    pub initialized: String,
}

impl Default for AlertMessages {
    fn default() -> Self {
        Self {
            opened: "DOOR OPENED - Server room accessed".to_string(),
            closed: "DOOR CLOSED - Server room secured".to_string(),
            initialized: "SENSOR IS WORKING - Monitoring started".to_string(),
        }
    }
}

impl AlertMessages {
    pub fn text_for(&self, kind: AlertKind) -> &str {
        match kind {
            AlertKind::Opened => &self.opened,
            AlertKind::Closed => &self.closed,
            AlertKind::Initialized => &self.initialized,
        }
    }
}

/// 告警发送者，返回是否送达；失败由实现自行记录日志，调用方不重试
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, kind: AlertKind) -> bool;
}

/// 基于 NotificationDispatcher 的告警发送者
pub struct AlertNotifier {
    dispatcher: NotificationDispatcher,
    messages: AlertMessages,
    device_id: Option<String>,
}

impl AlertNotifier {
    pub fn new(dispatcher: NotificationDispatcher, messages: AlertMessages) -> Self {
        Self {
            dispatcher,
            messages,
            device_id: None,
        }
    }

    /// 在消息元数据中附带设备 ID
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// 构造告警消息
    pub fn build_message(&self, kind: AlertKind) -> NotificationMessage {
        let mut message = NotificationMessage::new(self.messages.text_for(kind), kind);
        if let Some(device_id) = &self.device_id {
            message = message.with_device_id(device_id.clone());
        }
        message
    }

    /// 发送任意文本（用于 notify-test）
    pub async fn send_text(&self, kind: AlertKind, text: &str) -> bool {
        let mut message = self.build_message(kind);
        message.content = text.to_string();
        self.deliver(&message).await
    }

    async fn deliver(&self, message: &NotificationMessage) -> bool {
        let report = self.dispatcher.dispatch(message).await;
        if report.is_empty() {
            warn!(kind = %message.kind, "No notification channel registered");
            return false;
        }

        for (channel, reason) in report.failures() {
            warn!(channel = %channel, kind = %message.kind, error = %reason, "Alert delivery failed");
        }

        let delivered = report.is_delivered();
        if delivered {
            info!(kind = %message.kind, content = %message.content, "Alert delivered");
        }
        delivered
    }
}

#[async_trait]
impl Notifier for AlertNotifier {
    async fn notify(&self, kind: AlertKind) -> bool {
        let message = self.build_message(kind);
        self.deliver(&message).await
    }
}
