//! Door Sensor Monitor - 门磁边沿触发轮询、配额退避与聊天告警

pub mod cli;
pub mod cloud;
pub mod config;
pub mod monitor;
pub mod notification;
pub mod server;

pub use cloud::{FetchError, HttpStatusSource, Reading, StatusSource};
pub use config::AppConfig;
pub use monitor::{CycleOutcome, DoorState, EdgeTriggeredPoller, MonitorService, MonitorSnapshot};
pub use notification::{AlertKind, AlertMessages, AlertNotifier, Notifier};
