//! 门磁状态机
//!
//! ```text
//!             first reading (Initialized)
//!   Unknown ─────────────────────────────► Open | Closed
//!
//!   Open ──── false (Closed) ───► Closed
//!   Closed ── true  (Opened) ───► Open
//!   Open ──── true ─────────────► Open     (no alert)
//!   Closed ── false ────────────► Closed   (no alert)
//! ```

use crate::notification::AlertKind;
use serde::{Deserialize, Serialize};

/// 门状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorState {
    #[default]
    Unknown,
    Open,
    Closed,
}

impl DoorState {
    pub fn from_contact(contact: Option<bool>) -> Self {
        match contact {
            None => DoorState::Unknown,
            Some(true) => DoorState::Open,
            Some(false) => DoorState::Closed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DoorState::Unknown => "unknown",
            DoorState::Open => "open",
            DoorState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for DoorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 记录上一次门磁读数，并判断是否需要告警
#[derive(Debug, Clone, Default)]
pub struct ContactTracker {
    last_contact: Option<bool>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_contact(&self) -> Option<bool> {
        self.last_contact
    }

    pub fn state(&self) -> DoorState {
        DoorState::from_contact(self.last_contact)
    }

    /// 记录新读数（无论告警是否送达都会记录），返回本次应发送的告警（最多一个）
    pub fn observe(&mut self, contact: bool) -> Option<AlertKind> {
        let alert = match self.last_contact {
            None => Some(AlertKind::Initialized),
            Some(previous) if previous != contact => Some(if contact {
                AlertKind::Opened
            } else {
                AlertKind::Closed
            }),
            Some(_) => None,
        };
        self.last_contact = Some(contact);
        alert
    }
}
