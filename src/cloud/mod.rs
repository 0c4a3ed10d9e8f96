//! 云平台设备状态读取

pub mod client;
pub mod source;
pub mod types;

pub use client::HttpStatusSource;
pub use source::{FetchError, Reading, StatusResult, StatusSource, QUOTA_EXHAUSTED_CODE};
