//! 读数解码 - 将原始 code/value 列表转换为强类型快照

use crate::cloud::Reading;
use tracing::debug;

/// 门磁状态数据点（true = 打开）
pub const CONTACT_CODE: &str = "doorcontact_state";
/// 电量数据点（百分比）
pub const BATTERY_CODE: &str = "battery_percentage";

/// 解码后的传感器快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorSnapshot {
    /// 至少包含一个可识别的数据点
    Recognized {
        contact: Option<bool>,
        battery: Option<u8>,
    },
    /// 没有任何可识别的数据点
    Unrecognized,
}

impl SensorSnapshot {
    /// 解码读数，忽略未知 code；同一 code 出现多次时以最后一次为准
    pub fn decode(readings: &[Reading]) -> Self {
        let mut contact = None;
        let mut battery = None;

        for reading in readings {
            match reading.code.as_str() {
                CONTACT_CODE => match reading.value.as_bool() {
                    Some(value) => contact = Some(value),
                    None => debug!(value = %reading.value, "Ignoring non-boolean contact reading"),
                },
                BATTERY_CODE => match decode_percentage(&reading.value) {
                    Some(value) => battery = Some(value),
                    None => debug!(value = %reading.value, "Ignoring non-numeric battery reading"),
                },
                _ => {}
            }
        }

        if contact.is_none() && battery.is_none() {
            SensorSnapshot::Unrecognized
        } else {
            SensorSnapshot::Recognized { contact, battery }
        }
    }

    pub fn contact(&self) -> Option<bool> {
        match self {
            SensorSnapshot::Recognized { contact, .. } => *contact,
            SensorSnapshot::Unrecognized => None,
        }
    }

    pub fn battery(&self) -> Option<u8> {
        match self {
            SensorSnapshot::Recognized { battery, .. } => *battery,
            SensorSnapshot::Unrecognized => None,
        }
    }
}

fn decode_percentage(value: &serde_json::Value) -> Option<u8> {
    let raw = value
        .as_u64()
        .map(|v| v as f64)
        .or_else(|| value.as_f64())?;
    if raw < 0.0 {
        return None;
    }
    Some(raw.round().min(100.0) as u8)
}
