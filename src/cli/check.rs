//! Check 命令 - 校验配置并打印摘要（敏感值已遮蔽）

use crate::config::{mask_secret, AppConfig};
use anyhow::Result;
use clap::Args;

/// Check 命令参数
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// 控制台模式，不要求 WhatsApp 配置
    #[arg(long)]
    pub console: bool,
}

/// 生成配置摘要
pub fn summarize(config: &AppConfig) -> Vec<(String, String)> {
    let mut lines = vec![
        ("TUYA_ENDPOINT".to_string(), config.cloud.endpoint.clone()),
        ("TUYA_ACCESS_ID".to_string(), mask_secret(&config.cloud.access_id)),
        ("TUYA_ACCESS_TOKEN".to_string(), mask_secret(&config.cloud.access_token)),
        ("DEVICE_ID".to_string(), config.cloud.device_id.clone()),
        (
            "POLL_INTERVAL".to_string(),
            format!("{}s", config.poller.poll_interval_secs),
        ),
        (
            "QUOTA_COOLDOWN".to_string(),
            format!("{}s", config.poller.quota_cooldown_secs),
        ),
        ("WA_API_URL".to_string(), config.whatsapp.api_url.clone()),
        ("WA_API_USER".to_string(), config.whatsapp.api_user.clone()),
        ("WA_API_PASSWORD".to_string(), mask_secret(&config.whatsapp.api_password)),
        ("WA_GROUP_ID".to_string(), config.whatsapp.group_id.clone()),
    ];

    if let Some(webhook) = &config.webhook {
        lines.push(("WEBHOOK_URL".to_string(), webhook.url.clone()));
    }
    lines.push(("SERVER".to_string(), config.server.bind_addr()));

    lines
}

/// 处理 check 命令
pub fn handle_check(config: &AppConfig, args: CheckArgs) -> Result<()> {
    println!("配置摘要:");
    for (key, value) in summarize(config) {
        let value = if value.is_empty() { "NOT SET".to_string() } else { value };
        println!("  {:<18} {}", key, value);
    }
    println!();

    config.validate(!args.console)?;
    println!("配置校验通过");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_masks_secrets() {
        let mut config = AppConfig::default();
        config.cloud.access_token = "supersecrettoken".to_string();
        config.whatsapp.api_password = "hunter22".to_string();

        let summary = summarize(&config);
        let token = summary.iter().find(|(k, _)| k == "TUYA_ACCESS_TOKEN").unwrap();
        let password = summary.iter().find(|(k, _)| k == "WA_API_PASSWORD").unwrap();

        assert!(!token.1.contains("secret"));
        assert!(token.1.starts_with("supe"));
        assert_eq!(password.1, "hunt****");
    }

    #[test]
    fn test_summary_includes_webhook_when_configured() {
        let mut config = AppConfig::default();
        assert!(!summarize(&config).iter().any(|(k, _)| k == "WEBHOOK_URL"));

        config.webhook = Some(crate::config::WebhookConfig {
            url: "https://hooks.example.com".to_string(),
            ..Default::default()
        });
        assert!(summarize(&config).iter().any(|(k, _)| k == "WEBHOOK_URL"));
    }

    #[test]
    fn test_check_fails_on_missing_config() {
        assert!(handle_check(&AppConfig::default(), CheckArgs::default()).is_err());
    }
}
