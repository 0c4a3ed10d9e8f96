//! 监控状态快照，供 HTTP 接口等外部只读访问

use super::state::DoorState;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 监控状态快照
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorSnapshot {
    pub device_id: String,
    pub running: bool,
    pub door: DoorState,
    /// 电量百分比（仅用于展示）
    pub battery: Option<u8>,
    pub last_poll_at: Option<DateTime<Utc>>,
    pub last_change_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    /// 配额冷却结束时间
    pub cooldown_until: Option<DateTime<Utc>>,
    pub polls: u64,
    pub notifications_sent: u64,
    pub notifications_failed: u64,
}

impl MonitorSnapshot {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            running: false,
            door: DoorState::Unknown,
            battery: None,
            last_poll_at: None,
            last_change_at: None,
            last_error: None,
            cooldown_until: None,
            polls: 0,
            notifications_sent: 0,
            notifications_failed: 0,
        }
    }
}
