//! HTTP 接口 - 健康检查、监控状态与设备状态查询

pub mod response;
pub mod routes;

pub use response::ApiResponse;
pub use routes::{router, AppState};

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// 启动 HTTP 服务，`shutdown` 取消后优雅退出
pub async fn serve(addr: &str, state: AppState, shutdown: CancellationToken) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("HTTP server error")
}
