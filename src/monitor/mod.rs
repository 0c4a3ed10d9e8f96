//! 门磁监控核心 - 读数解码、状态机、轮询循环与生命周期管理

pub mod decode;
pub mod poller;
pub mod service;
pub mod snapshot;
pub mod state;

pub use decode::{SensorSnapshot, BATTERY_CODE, CONTACT_CODE};
pub use poller::{CycleOutcome, EdgeTriggeredPoller};
pub use service::{MonitorService, DEFAULT_STOP_TIMEOUT};
pub use snapshot::MonitorSnapshot;
pub use state::{ContactTracker, DoorState};
