//! 通知系统构建器 - 根据配置注册渠道

use super::channels::{ConsoleChannel, WebhookChannel, WhatsAppChannel};
use super::dispatcher::NotificationDispatcher;
use crate::config::{WebhookConfig, WhatsAppConfig};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// 通知系统构建器
#[derive(Default)]
pub struct NotificationBuilder {
    whatsapp: Option<WhatsAppConfig>,
    webhook: Option<WebhookConfig>,
    console: bool,
    dry_run: bool,
}

impl NotificationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 启用 WhatsApp 渠道（未填写任何字段时忽略）
    pub fn whatsapp(mut self, config: WhatsAppConfig) -> Self {
        self.whatsapp = config.is_configured().then_some(config);
        self
    }

    /// 启用 Webhook 渠道
    pub fn webhook(mut self, config: Option<WebhookConfig>) -> Self {
        self.webhook = config;
        self
    }

    /// 是否启用控制台渠道
    pub fn console(mut self, enable: bool) -> Self {
        self.console = enable;
        self
    }

    /// 设置 dry-run 模式
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 构建 NotificationDispatcher，未配置任何渠道时回退到控制台
    pub fn build(self) -> Result<NotificationDispatcher> {
        let mut dispatcher = NotificationDispatcher::new().with_dry_run(self.dry_run);

        if let Some(config) = self.whatsapp {
            info!(channel = "whatsapp", group = %config.group_id, "Enabling WhatsApp channel");
            dispatcher.register_channel(Arc::new(WhatsAppChannel::new(config)?));
        }

        if let Some(config) = self.webhook {
            info!(channel = "webhook", url = %config.url, "Enabling webhook channel");
            dispatcher.register_channel(Arc::new(WebhookChannel::new(config)?));
        }

        if self.console || dispatcher.channel_count() == 0 {
            dispatcher.register_channel(Arc::new(ConsoleChannel::new()));
        }

        Ok(dispatcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whatsapp() -> WhatsAppConfig {
        WhatsAppConfig {
            api_url: "https://wa.example.com/send/message".to_string(),
            api_user: "user".to_string(),
            api_password: "secret".to_string(),
            group_id: "12345@g.us".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_empty_falls_back_to_console() {
        let dispatcher = NotificationBuilder::new().build().unwrap();
        assert_eq!(dispatcher.channel_names(), vec!["console"]);
    }

    #[test]
    fn test_build_unconfigured_whatsapp_is_ignored() {
        let dispatcher = NotificationBuilder::new()
            .whatsapp(WhatsAppConfig::default())
            .build()
            .unwrap();
        assert_eq!(dispatcher.channel_names(), vec!["console"]);
    }

    #[test]
    fn test_build_all_channels() {
        let dispatcher = NotificationBuilder::new()
            .whatsapp(whatsapp())
            .webhook(Some(WebhookConfig {
                url: "https://hooks.example.com/door".to_string(),
                ..Default::default()
            }))
            .console(true)
            .build()
            .unwrap();
        assert_eq!(dispatcher.channel_names(), vec!["whatsapp", "webhook", "console"]);
    }

    #[test]
    fn test_build_whatsapp_only() {
        let dispatcher = NotificationBuilder::new().whatsapp(whatsapp()).build().unwrap();
        assert_eq!(dispatcher.channel_names(), vec!["whatsapp"]);
    }

    #[test]
    fn test_build_invalid_webhook_fails() {
        let result = NotificationBuilder::new()
            .webhook(Some(WebhookConfig::default()))
            .build();
        assert!(result.is_err());
    }
}
