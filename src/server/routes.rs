//! HTTP 路由

use super::response::{status_for_api_code, ApiResponse};
use crate::cloud::{FetchError, StatusSource};
use crate::monitor::MonitorService;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    /// 只用于读取状态快照
    pub monitor: Arc<MonitorService>,
    pub source: Arc<dyn StatusSource>,
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/monitor", get(monitor_status))
        .route("/devices/{device_id}/status", get(device_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 健康检查
async fn health() -> Response {
    ApiResponse::success(serde_json::json!({"status": "ok"}), "Health check passed").into_response()
}

/// 轮询器当前状态
async fn monitor_status(State(state): State<AppState>) -> Response {
    ApiResponse::success(state.monitor.snapshot(), "Success").into_response()
}

/// 实时查询任意设备状态（不影响轮询器状态）
async fn device_status(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Response {
    match state.source.fetch_status(&device_id).await {
        Ok(readings) => ApiResponse::success(readings, "Success").into_response(),
        Err(FetchError::Api { code, message }) => {
            ApiResponse::error(message, status_for_api_code(code))
                .with_details(serde_json::json!({"code": code}))
                .into_response()
        }
        Err(e) => {
            error!(device_id = %device_id, error = %e, "Error fetching device status");
            ApiResponse::error("Internal Server Error", StatusCode::INTERNAL_SERVER_ERROR)
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::{Reading, StatusResult};
    use crate::monitor::EdgeTriggeredPoller;
    use crate::notification::{AlertKind, Notifier};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::net::TcpListener;

    struct FixedSource;

    #[async_trait]
    impl StatusSource for FixedSource {
        async fn fetch_status(&self, device_id: &str) -> StatusResult {
            match device_id {
                "door-1" => Ok(vec![
                    Reading::new("doorcontact_state", false),
                    Reading::new("battery_percentage", 85),
                ]),
                "missing" => Err(FetchError::Api {
                    code: 2001,
                    message: "device not exist".to_string(),
                }),
                "forbidden" => Err(FetchError::Api {
                    code: 403,
                    message: "forbidden".to_string(),
                }),
                _ => Err(FetchError::Transport("connection refused".to_string())),
            }
        }
    }

    struct NullNotifier;

    #[async_trait]
    impl Notifier for NullNotifier {
        async fn notify(&self, _kind: AlertKind) -> bool {
            true
        }
    }

    fn app() -> Router {
        let source: Arc<dyn StatusSource> = Arc::new(FixedSource);
        let poller =
            EdgeTriggeredPoller::new("door-1", Duration::from_secs(2), source.clone(), Arc::new(NullNotifier))
                .unwrap();
        router(AppState {
            monitor: Arc::new(MonitorService::new(poller)),
            source,
        })
    }

    /// 在随机端口启动路由，返回 base URL
    async fn spawn_app() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app()).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn get_json(path: &str) -> (u16, serde_json::Value) {
        let response = reqwest::get(format!("{}{}", spawn_app().await, path))
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, json) = get_json("/health").await;
        assert_eq!(status, 200);
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Health check passed");
        assert_eq!(json["result"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_monitor_snapshot() {
        let (status, json) = get_json("/monitor").await;
        assert_eq!(status, 200);
        assert_eq!(json["result"]["device_id"], "door-1");
        assert_eq!(json["result"]["running"], false);
        assert_eq!(json["result"]["door"], "unknown");
    }

    #[tokio::test]
    async fn test_device_status_success() {
        let (status, json) = get_json("/devices/door-1/status").await;
        assert_eq!(status, 200);
        assert_eq!(json["result"][0]["code"], "doorcontact_state");
        assert_eq!(json["result"][0]["value"], false);
        assert_eq!(json["result"][1]["value"], 85);
    }

    #[tokio::test]
    async fn test_device_status_api_error() {
        let (status, json) = get_json("/devices/missing/status").await;
        assert_eq!(status, 502);
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "device not exist");
        assert_eq!(json["details"]["code"], 2001);

        let (status, _) = get_json("/devices/forbidden/status").await;
        assert_eq!(status, 403);
    }

    #[tokio::test]
    async fn test_device_status_transport_error() {
        let (status, json) = get_json("/devices/other/status").await;
        assert_eq!(status, 500);
        assert_eq!(json["message"], "Internal Server Error");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = reqwest::get(format!("{}/nope", spawn_app().await))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }
}
