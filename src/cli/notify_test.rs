//! NotifyTest 命令 - 通过已配置渠道发送测试告警

use super::run::build_notifier;
use crate::config::AppConfig;
use crate::notification::{AlertKind, Notifier};
use anyhow::{bail, Result};
use clap::Args;

/// NotifyTest 命令参数
#[derive(Args, Debug)]
pub struct NotifyTestArgs {
    /// 告警类型: opened, closed, initialized
    #[arg(default_value = "initialized", value_parser = parse_kind)]
    pub kind: AlertKind,

    /// 自定义消息内容（覆盖配置中的文案）
    #[arg(long, short)]
    pub message: Option<String>,

    /// 只输出到控制台
    #[arg(long)]
    pub console: bool,
}

fn parse_kind(s: &str) -> Result<AlertKind, String> {
    s.parse()
}

/// 处理 notify-test 命令
pub async fn handle_notify_test(config: &AppConfig, args: NotifyTestArgs) -> Result<()> {
    let mut config = config.clone();
    if args.console {
        config.whatsapp = Default::default();
        config.webhook = None;
    }

    let notifier = build_notifier(&config, args.console, false)?;
    println!("发送测试告警 ({}) 到: {:?}", args.kind, notifier.dispatcher().channel_names());

    let delivered = match &args.message {
        Some(text) => notifier.send_text(args.kind, text).await,
        None => notifier.notify(args.kind).await,
    };

    if !delivered {
        bail!("测试告警发送失败");
    }

    println!("测试告警发送成功");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("opened").unwrap(), AlertKind::Opened);
        assert!(parse_kind("ajar").is_err());
    }

    #[tokio::test]
    async fn test_console_notify_succeeds() {
        let args = NotifyTestArgs {
            kind: AlertKind::Closed,
            message: Some("TEST: console".to_string()),
            console: true,
        };
        assert!(handle_notify_test(&AppConfig::default(), args).await.is_ok());
    }
}
