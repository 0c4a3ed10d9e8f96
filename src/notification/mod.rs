//! 通知抽象层 - 统一管理所有告警渠道
//!
//! # 设计目标
//! 1. 统一接口：所有渠道实现 `NotificationChannel` trait
//! 2. 渠道解耦：每个渠道在独立任务中发送，互不影响
//! 3. 告警语义：`Notifier` 只关心 `AlertKind`，文案与渠道由配置决定
//!
//! # 使用示例
//! ```ignore
//! use door_sensor_monitor::notification::{AlertKind, AlertMessages, AlertNotifier, NotificationBuilder, Notifier};
//!
//! let dispatcher = NotificationBuilder::new()
//!     .whatsapp(config.whatsapp.clone())
//!     .build()?;
//!
//! let notifier = AlertNotifier::new(dispatcher, AlertMessages::default());
//! notifier.notify(AlertKind::Opened).await;
//! ```

pub mod alert;
pub mod builder;
pub mod channel;
pub mod channels;
pub mod dispatcher;

pub use alert::{AlertKind, AlertMessages, AlertNotifier, Notifier};
pub use builder::NotificationBuilder;
pub use channel::{MessageMetadata, NotificationChannel, NotificationMessage, SendResult};
pub use dispatcher::{DispatchReport, NotificationDispatcher};
