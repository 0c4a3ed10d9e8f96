//! 控制台渠道 - 直接打印到 stdout

use crate::notification::channel::{NotificationChannel, NotificationMessage, SendResult};
use anyhow::Result;
use async_trait::async_trait;

/// 控制台渠道
#[derive(Debug, Default)]
pub struct ConsoleChannel;

impl ConsoleChannel {
    pub fn new() -> Self {
        Self
    }

    pub fn format(message: &NotificationMessage) -> String {
        match &message.metadata.device_id {
            Some(device_id) => format!(
                "[通知] {} | {} ({})",
                message.metadata.timestamp, message.content, device_id
            ),
            None => format!("[通知] {} | {}", message.metadata.timestamp, message.content),
        }
    }
}

#[async_trait]
impl NotificationChannel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, message: &NotificationMessage) -> Result<SendResult> {
        println!("{}", Self::format(message));
        Ok(SendResult::Sent)
    }
}
