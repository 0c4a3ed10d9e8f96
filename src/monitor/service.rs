//! 监控服务 - 管理轮询器的后台任务生命周期

use super::poller::EdgeTriggeredPoller;
use super::snapshot::MonitorSnapshot;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// stop() 等待后台任务结束的最长时间
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

enum Slot {
    /// 未运行，持有轮询器
    Idle(Box<EdgeTriggeredPoller>),
    /// 后台任务运行中
    Running {
        handle: JoinHandle<EdgeTriggeredPoller>,
        shutdown: CancellationToken,
    },
    /// 停止超时（任务已被中止）或任务异常，轮询器已不可用
    Detached,
}

/// 监控服务：轮询器只在一个后台任务中运行，外部只能读取 `MonitorSnapshot`
pub struct MonitorService {
    slot: Mutex<Slot>,
    status: Arc<watch::Sender<MonitorSnapshot>>,
    stop_timeout: Duration,
}

impl MonitorService {
    pub fn new(poller: EdgeTriggeredPoller) -> Self {
        let status = poller.status_sender();
        Self {
            slot: Mutex::new(Slot::Idle(Box::new(poller))),
            status,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }

    /// 设置 stop() 的等待超时
    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    /// 启动后台轮询，已在运行时只记录警告；新建了任务时返回 `true`（需在 tokio 运行时内调用）
    pub fn start(&self) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());

        match std::mem::replace(&mut *slot, Slot::Detached) {
            Slot::Idle(poller) => {
                let poller = *poller;
                let shutdown = CancellationToken::new();
                poller.set_running(true);
                info!(
                    device_id = %poller.device_id(),
                    interval_secs = poller.poll_interval().as_secs(),
                    "Starting door sensor monitor"
                );
                let handle = tokio::spawn(poller.run(shutdown.clone()));
                *slot = Slot::Running { handle, shutdown };
                true
            }
            running @ Slot::Running { .. } => {
                warn!("Polling already running");
                *slot = running;
                false
            }
            Slot::Detached => {
                warn!("Poller is unavailable after an unclean stop, cannot restart");
                false
            }
        }
    }

    /// 请求停止并等待后台任务结束（最多 `stop_timeout`）
    ///
    /// 按时结束返回 `true`；超时则中止任务，服务此后无法再启动。
    pub async fn stop(&self) -> bool {
        let (mut handle, shutdown) = {
            let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
            match std::mem::replace(&mut *slot, Slot::Detached) {
                Slot::Running { handle, shutdown } => (handle, shutdown),
                other => {
                    *slot = other;
                    return true;
                }
            }
        };

        shutdown.cancel();

        let stopped = match tokio::time::timeout(self.stop_timeout, &mut handle).await {
            Ok(Ok(poller)) => {
                let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
                *slot = Slot::Idle(Box::new(poller));
                true
            }
            Ok(Err(e)) => {
                error!(error = %e, "Polling task ended abnormally");
                self.mark_stopped();
                false
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.stop_timeout.as_secs(),
                    "Polling task did not stop in time, aborting it"
                );
                handle.abort();
                self.mark_stopped();
                false
            }
        };

        info!("HTTP polling stopped");
        stopped
    }

    fn mark_stopped(&self) {
        self.status.send_modify(|s| {
            s.running = false;
            s.cooldown_until = None;
        });
    }

    /// 后台任务是否在运行
    pub fn is_running(&self) -> bool {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        matches!(&*slot, Slot::Running { handle, .. } if !handle.is_finished())
    }

    /// 当前状态快照
    pub fn snapshot(&self) -> MonitorSnapshot {
        self.status.borrow().clone()
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<MonitorSnapshot> {
        self.status.subscribe()
    }
}
