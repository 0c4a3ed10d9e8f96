//! Status 命令 - 单次查询设备状态（诊断用）

use super::run::build_status_source;
use crate::cloud::{FetchError, Reading, StatusSource};
use crate::config::AppConfig;
use crate::monitor::{DoorState, SensorSnapshot};
use anyhow::{anyhow, bail, Result};
use clap::Args;
use serde::Serialize;

/// Status 命令参数
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// 设备 ID（默认使用配置中的 DEVICE_ID）
    pub device_id: Option<String>,

    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

/// Status 命令输出
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub device_id: String,
    pub door: DoorState,
    pub battery: Option<u8>,
    pub readings: Vec<Reading>,
}

impl StatusOutput {
    pub fn from_readings(device_id: String, readings: Vec<Reading>) -> Self {
        let snapshot = SensorSnapshot::decode(&readings);
        Self {
            device_id,
            door: DoorState::from_contact(snapshot.contact()),
            battery: snapshot.battery(),
            readings,
        }
    }
}

/// 处理 status 命令
pub async fn handle_status(config: &AppConfig, args: StatusArgs) -> Result<()> {
    let device_id = args
        .device_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .or_else(|| Some(config.cloud.device_id.clone()).filter(|id| !id.is_empty()))
        .ok_or_else(|| anyhow!("未指定设备 ID，请传入参数或设置 DEVICE_ID"))?;

    let source = build_status_source(config)?;
    let readings = match source.fetch_status(&device_id).await {
        Ok(readings) => readings,
        Err(FetchError::Api { code, message }) => {
            eprintln!("查询失败: [{}] {}", code, message);
            eprintln!("可能原因:");
            eprintln!("  1. 设备未关联到当前云项目");
            eprintln!("  2. 设备与项目不在同一数据中心");
            eprintln!("  3. 设备 ID 错误或 access token 已过期");
            bail!("device status query failed with code {}", code);
        }
        Err(e) => return Err(e.into()),
    };

    let output = StatusOutput::from_readings(device_id, readings);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("设备: {}", output.device_id);
        println!("  门状态: {}", output.door);
        match output.battery {
            Some(battery) => println!("  电量: {}%", battery),
            None => println!("  电量: -"),
        }
        println!("  全部读数:");
        for reading in &output.readings {
            println!("    {} = {}", reading.code, reading.value);
        }
    }

    Ok(())
}
