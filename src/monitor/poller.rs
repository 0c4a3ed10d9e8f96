//! 边沿触发轮询器
//!
//! 按固定间隔查询门磁状态，只在状态变化（或首次读数）时发送一次告警。
//! 配额耗尽时进入固定时长的冷却，冷却期间不发起任何查询。

use super::decode::SensorSnapshot;
use super::snapshot::MonitorSnapshot;
use super::state::{ContactTracker, DoorState};
use crate::cloud::StatusSource;
use crate::config::DEFAULT_QUOTA_COOLDOWN_SECS;
use crate::notification::{AlertKind, Notifier};
use anyhow::{bail, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// 单次轮询的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// 发送了告警；`delivered` 为渠道是否发送成功
    Notified { kind: AlertKind, delivered: bool },
    /// 状态未变化
    Unchanged,
    /// 响应中没有门磁读数
    NoContact,
    /// 查询失败（非配额原因）
    ReadFailed,
    /// 配额/权限耗尽，需要冷却
    QuotaExhausted,
}

/// 边沿触发轮询器
pub struct EdgeTriggeredPoller {
    device_id: String,
    poll_interval: Duration,
    quota_cooldown: Duration,
    source: Arc<dyn StatusSource>,
    notifier: Arc<dyn Notifier>,
    tracker: ContactTracker,
    status_tx: Arc<watch::Sender<MonitorSnapshot>>,
}

impl EdgeTriggeredPoller {
    /// 创建轮询器，`device_id` 不能为空，`poll_interval` 必须大于 0
    pub fn new(
        device_id: impl Into<String>,
        poll_interval: Duration,
        source: Arc<dyn StatusSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let device_id = device_id.into();
        if device_id.trim().is_empty() {
            bail!("device_id must not be empty");
        }
        if poll_interval.is_zero() {
            bail!("poll_interval must be positive");
        }

        let (status_tx, _) = watch::channel(MonitorSnapshot::new(device_id.clone()));

        Ok(Self {
            device_id,
            poll_interval,
            quota_cooldown: Duration::from_secs(DEFAULT_QUOTA_COOLDOWN_SECS),
            source,
            notifier,
            tracker: ContactTracker::new(),
            status_tx: Arc::new(status_tx),
        })
    }

    /// 设置配额冷却时长，必须大于 0
    pub fn with_quota_cooldown(mut self, cooldown: Duration) -> Result<Self> {
        if cooldown.is_zero() {
            bail!("quota_cooldown must be positive");
        }
        self.quota_cooldown = cooldown;
        Ok(self)
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn quota_cooldown(&self) -> Duration {
        self.quota_cooldown
    }

    /// 上一次记录的门磁读数
    pub fn last_contact(&self) -> Option<bool> {
        self.tracker.last_contact()
    }

    /// 订阅状态快照
    pub fn subscribe(&self) -> watch::Receiver<MonitorSnapshot> {
        self.status_tx.subscribe()
    }

    pub(crate) fn status_sender(&self) -> Arc<watch::Sender<MonitorSnapshot>> {
        Arc::clone(&self.status_tx)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.status_tx.send_modify(|s| {
            s.running = running;
            if !running {
                s.cooldown_until = None;
            }
        });
    }

    /// 执行一次轮询：查询 → 判断 → 告警，远端错误一律归类为 `CycleOutcome`，是否告警只由 ContactTracker 决定
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let result = self.source.fetch_status(&self.device_id).await;
        let now = Utc::now();

        let readings = match result {
            Ok(readings) => readings,
            Err(e) if e.is_quota_exhausted() => {
                error!(
                    device_id = %self.device_id,
                    error = %e,
                    cooldown_secs = self.quota_cooldown.as_secs(),
                    "Quota exhausted, pausing polling"
                );
                let until = chrono::Duration::from_std(self.quota_cooldown)
                    .ok()
                    .and_then(|d| now.checked_add_signed(d));
                self.status_tx.send_modify(|s| {
                    s.polls += 1;
                    s.last_poll_at = Some(now);
                    s.last_error = Some(e.to_string());
                    s.cooldown_until = until;
                });
                return CycleOutcome::QuotaExhausted;
            }
            Err(e) => {
                warn!(device_id = %self.device_id, error = %e, "Failed to get device status");
                self.status_tx.send_modify(|s| {
                    s.polls += 1;
                    s.last_poll_at = Some(now);
                    s.last_error = Some(e.to_string());
                });
                return CycleOutcome::ReadFailed;
            }
        };

        let snapshot = SensorSnapshot::decode(&readings);
        self.status_tx.send_modify(|s| {
            s.polls += 1;
            s.last_poll_at = Some(now);
            s.last_error = None;
            s.cooldown_until = None;
            if let Some(battery) = snapshot.battery() {
                s.battery = Some(battery);
            }
        });

        let Some(contact) = snapshot.contact() else {
            debug!(device_id = %self.device_id, ?snapshot, "No contact reading in response");
            return CycleOutcome::NoContact;
        };

        let previous = self.tracker.state();
        let Some(kind) = self.tracker.observe(contact) else {
            return CycleOutcome::Unchanged;
        };
        let current = self.tracker.state();

        match kind {
            AlertKind::Initialized => info!(
                device_id = %self.device_id,
                door = %current,
                battery = ?snapshot.battery(),
                "Sensor initialized"
            ),
            _ => info!(
                device_id = %self.device_id,
                from = %previous,
                to = %current,
                battery = ?snapshot.battery(),
                "Door state changed"
            ),
        }

        self.status_tx.send_modify(|s| {
            s.door = current;
            s.last_change_at = Some(now);
        });

        let delivered = self.notifier.notify(kind).await;
        self.status_tx.send_modify(|s| {
            if delivered {
                s.notifications_sent += 1;
            } else {
                s.notifications_failed += 1;
            }
        });
        if !delivered {
            warn!(device_id = %self.device_id, kind = %kind, "Alert not delivered, state tracking continues");
        }

        CycleOutcome::Notified { kind, delivered }
    }

    /// 轮询循环，直到 `shutdown` 被取消
    ///
    /// 只在两次查询之间检查取消，已开始的查询会执行完；返回轮询器以便重启后沿用状态。
    pub async fn run(mut self, shutdown: CancellationToken) -> Self {
        info!(
            device_id = %self.device_id,
            interval_secs = self.poll_interval.as_secs(),
            "Polling started"
        );
        self.set_running(true);

        while !shutdown.is_cancelled() {
            let outcome = self.run_cycle().await;
            // 冷却替代而不是叠加正常间隔：冷却结束后立即查询
            let in_cooldown = outcome == CycleOutcome::QuotaExhausted;
            let wait = if in_cooldown {
                self.quota_cooldown
            } else {
                self.poll_interval
            };

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = sleep(wait) => {}
            }

            if in_cooldown {
                info!(device_id = %self.device_id, "Resuming polling after quota cooldown");
            }
        }

        self.set_running(false);
        info!(device_id = %self.device_id, "Polling stopped");
        self
    }

    /// 当前门状态
    pub fn door_state(&self) -> DoorState {
        self.tracker.state()
    }
}
