// src/cli/run.rs
//! Run 命令 - 启动门磁监控与 HTTP 服务
//!
//! 校验配置后启动后台轮询，Ctrl-C 时先停止轮询再关闭 HTTP 服务；
//! HTTP 服务启动失败（如端口被占用）时停止轮询并返回错误。

use crate::cloud::{HttpStatusSource, StatusSource};
use crate::config::AppConfig;
use crate::monitor::{EdgeTriggeredPoller, MonitorService};
use crate::notification::{AlertNotifier, NotificationBuilder};
use crate::server::{self, AppState};
use anyhow::{anyhow, Context, Result};
use clap::Args;
use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Run 命令参数
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// 不启动 HTTP 服务
    #[arg(long)]
    pub no_server: bool,

    /// 告警输出到控制台（此时 WhatsApp 配置可选）
    #[arg(long)]
    pub console: bool,

    /// 只打印告警，不实际发送
    #[arg(long)]
    pub dry_run: bool,
}

/// 根据配置创建状态源
pub fn build_status_source(config: &AppConfig) -> Result<HttpStatusSource> {
    HttpStatusSource::new(config.cloud.clone()).context("Failed to create Tuya client")
}

/// 根据配置创建告警发送者
pub fn build_notifier(config: &AppConfig, console: bool, dry_run: bool) -> Result<AlertNotifier> {
    let dispatcher = NotificationBuilder::new()
        .whatsapp(config.whatsapp.clone())
        .webhook(config.webhook.clone())
        .console(console)
        .dry_run(dry_run)
        .build()?;

    Ok(AlertNotifier::new(dispatcher, config.alerts.clone())
        .with_device_id(config.cloud.device_id.clone()))
}

/// 处理 run 命令
pub async fn handle_run(config: AppConfig, args: RunArgs) -> Result<()> {
    run_until(config, args, tokio::signal::ctrl_c()).await
}

/// 运行监控直到 `shutdown_signal` 完成或 HTTP 服务提前退出
pub async fn run_until<F>(config: AppConfig, args: RunArgs, shutdown_signal: F) -> Result<()>
where
    F: Future<Output = io::Result<()>>,
{
    config.validate(!args.console)?;
    info!("Configuration validation passed");

    let source: Arc<dyn StatusSource> = Arc::new(build_status_source(&config)?);
    let notifier = build_notifier(&config, args.console, args.dry_run)?;
    info!(channels = ?notifier.dispatcher().channel_names(), "Notification channels ready");

    let poller = EdgeTriggeredPoller::new(
        config.cloud.device_id.clone(),
        config.poller.poll_interval(),
        source.clone(),
        Arc::new(notifier),
    )?
    .with_quota_cooldown(config.poller.quota_cooldown())?;

    let monitor = Arc::new(MonitorService::new(poller));
    monitor.start();

    let shutdown = CancellationToken::new();
    let mut server_task = if args.no_server {
        None
    } else {
        let state = AppState {
            monitor: monitor.clone(),
            source,
        };
        let addr = config.server.bind_addr();
        let token = shutdown.clone();
        Some(tokio::spawn(async move { server::serve(&addr, state, token).await }))
    };

    let exit = tokio::select! {
        signal = shutdown_signal => RunExit::Signal(signal),
        failure = server_failure(&mut server_task) => RunExit::ServerFailed(failure),
    };
    if let RunExit::Signal(Ok(())) = &exit {
        info!("Shutdown requested");
    }

    monitor.stop().await;
    shutdown.cancel();

    match exit {
        RunExit::ServerFailed(e) => {
            let detail = format!("{:#}", e);
            error!(error = %detail, "HTTP server failed, monitor stopped");
            Err(e.context("HTTP server stopped unexpectedly"))
        }
        RunExit::Signal(signal) => {
            signal.context("Failed to listen for Ctrl-C")?;
            if let Some(task) = server_task {
                match task.await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => error!(error = %e, "HTTP server exited with error"),
                    Err(e) => error!(error = %e, "HTTP server task failed"),
                }
            }
            Ok(())
        }
    }
}

enum RunExit {
    Signal(io::Result<()>),
    ServerFailed(anyhow::Error),
}

/// 等待 HTTP 服务任务在关闭前退出；未启动服务时永不完成
async fn server_failure(task: &mut Option<JoinHandle<Result<()>>>) -> anyhow::Error {
    let Some(handle) = task.as_mut() else {
        return std::future::pending().await;
    };
    let failure = match handle.await {
        Ok(Ok(())) => anyhow!("HTTP server exited before shutdown"),
        Ok(Err(e)) => e,
        Err(e) => anyhow!("HTTP server task failed: {}", e),
    };
    *task = None;
    failure
}
