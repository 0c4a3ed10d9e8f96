//! Door Sensor Monitor CLI
//!
//! 轮询云端门磁状态，门开/关变化时发送 WhatsApp 告警

use anyhow::Result;
use clap::{Parser, Subcommand};
use door_sensor_monitor::cli::{
    handle_check, handle_notify_test, handle_run, handle_status, CheckArgs, NotifyTestArgs,
    RunArgs, StatusArgs,
};
use door_sensor_monitor::config::AppConfig;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "dsm")]
#[command(about = "Door Sensor Monitor - 门磁状态监控与告警")]
#[command(version)]
struct Cli {
    /// 配置文件路径 (默认: ~/.config/dsm/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 启动门磁监控（默认同时启动 HTTP 服务）
    Run(RunArgs),
    /// 校验配置并打印摘要
    Check(CheckArgs),
    /// 查询一次设备状态
    Status(StatusArgs),
    /// 发送一条测试告警
    NotifyTest(NotifyTestArgs),
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "door_sensor_monitor=debug,dsm=debug"
    } else {
        "door_sensor_monitor=info,dsm=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref())?;
    debug!(device_id = %config.cloud.device_id, "Configuration loaded");

    match cli.command {
        Commands::Run(args) => handle_run(config, args).await,
        Commands::Check(args) => handle_check(&config, args),
        Commands::Status(args) => handle_status(&config, args).await,
        Commands::NotifyTest(args) => handle_notify_test(&config, args).await,
    }
}
