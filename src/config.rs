//! 配置加载
//!
//! 读取优先级（后者覆盖前者）：
//! 1. 默认值
//! 2. JSON 配置文件（`--config <path>` 或 `~/.config/dsm/config.json`）
//! 3. 工作目录下的 `.env`（不覆盖已有环境变量）
//! 4. 环境变量

use crate::notification::AlertMessages;
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// 默认轮询间隔（秒）
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
/// 配额耗尽后的冷却时间（秒）
pub const DEFAULT_QUOTA_COOLDOWN_SECS: u64 = 3600;

/// Tuya 云平台配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// OpenAPI 地址，如 https://openapi.tuyaus.com
    pub endpoint: String,
    pub access_id: String,
    /// 预先签发的 access token
    pub access_token: String,
    /// 被监控的门磁设备 ID
    pub device_id: String,
    pub timeout_secs: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_id: String::new(),
            access_token: String::new(),
            device_id: String::new(),
            timeout_secs: 10,
        }
    }
}

/// WhatsApp 网关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsAppConfig {
    pub api_url: String,
    pub api_user: String,
    pub api_password: String,
    /// 目标群组
    pub group_id: String,
    pub is_forwarded: bool,
    /// 0 表示不发送该字段
    pub duration: u64,
    pub timeout_secs: u64,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_user: String::new(),
            api_password: String::new(),
            group_id: String::new(),
            is_forwarded: false,
            duration: 0,
            timeout_secs: 10,
        }
    }
}

impl WhatsAppConfig {
    /// 是否填写了任意字段（用于判断用户是否打算启用该渠道）
    pub fn is_configured(&self) -> bool {
        !self.api_url.is_empty()
            || !self.api_user.is_empty()
            || !self.api_password.is_empty()
            || !self.group_id.is_empty()
    }
}

/// 通用 Webhook 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: None,
            timeout_secs: 10,
        }
    }
}

/// 轮询配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub poll_interval_secs: u64,
    pub quota_cooldown_secs: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            quota_cooldown_secs: DEFAULT_QUOTA_COOLDOWN_SECS,
        }
    }
}

impl PollerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn quota_cooldown(&self) -> Duration {
        Duration::from_secs(self.quota_cooldown_secs)
    }
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 应用完整配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub cloud: CloudConfig,
    pub whatsapp: WhatsAppConfig,
    pub webhook: Option<WebhookConfig>,
    pub alerts: AlertMessages,
    pub poller: PollerConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// 默认配置文件路径 `~/.config/dsm/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/dsm/config.json"))
    }

    /// 按优先级加载配置
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        let dotenv = read_dotenv(Path::new(".env"));
        if !dotenv.is_empty() {
            debug!(count = dotenv.len(), "Loaded variables from .env");
        }

        config.apply_env(layered_env(|key| std::env::var(key).ok(), &dotenv))?;
        Ok(config)
    }

    /// 从 JSON 文件读取
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// 用环境变量覆盖配置，`get` 便于测试时注入
    pub fn apply_env<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("TUYA_ENDPOINT") {
            self.cloud.endpoint = v;
        }
        if let Some(v) = get("TUYA_ACCESS_ID") {
            self.cloud.access_id = v;
        }
        if let Some(v) = get("TUYA_ACCESS_TOKEN") {
            self.cloud.access_token = v;
        }
        if let Some(v) = get("DEVICE_ID") {
            self.cloud.device_id = v;
        }
        if let Some(v) = get("POLL_INTERVAL") {
            self.poller.poll_interval_secs = parse_number("POLL_INTERVAL", &v)?;
        }
        if let Some(v) = get("QUOTA_COOLDOWN_SECS") {
            self.poller.quota_cooldown_secs = parse_number("QUOTA_COOLDOWN_SECS", &v)?;
        }

        if let Some(v) = get("WA_API_URL") {
            self.whatsapp.api_url = v;
        }
        if let Some(v) = get("WA_API_USER") {
            self.whatsapp.api_user = v;
        }
        if let Some(v) = get("WA_API_PASSWORD") {
            self.whatsapp.api_password = v;
        }
        if let Some(v) = get("WA_GROUP_ID") {
            self.whatsapp.group_id = v;
        }
        if let Some(v) = get("WA_IS_FORWARDED") {
            self.whatsapp.is_forwarded = v.trim().eq_ignore_ascii_case("true");
        }
        if let Some(v) = get("WA_DURATION") {
            self.whatsapp.duration = parse_number("WA_DURATION", &v)?;
        }
        if let Some(v) = get("WA_MESSAGE_DOOR_OPENED") {
            self.alerts.opened = v;
        }
        if let Some(v) = get("WA_MESSAGE_DOOR_CLOSED") {
            self.alerts.closed = v;
        }
        if let Some(v) = get("WA_MESSAGE_SENSOR_INITIALIZED") {
            self.alerts.initialized = v;
        }

        if let Some(url) = get("WEBHOOK_URL") {
            let webhook = self.webhook.get_or_insert_with(WebhookConfig::default);
            webhook.url = url;
        }
        if let Some(token) = get("WEBHOOK_TOKEN") {
            if let Some(webhook) = self.webhook.as_mut() {
                webhook.token = Some(token);
            }
        }

        // FLASK_HOST / FLASK_PORT 为旧部署的键名
        if let Some(v) = get("SERVER_HOST").or_else(|| get("FLASK_HOST")) {
            self.server.host = v;
        }
        if let Some((key, v)) = get("SERVER_PORT")
            .map(|v| ("SERVER_PORT", v))
            .or_else(|| get("FLASK_PORT").map(|v| ("FLASK_PORT", v)))
        {
            self.server.port = parse_number(key, &v)?;
        }

        Ok(())
    }

    /// 校验必填项，一次性报告所有缺失字段
    ///
    /// `require_whatsapp` 为 false 时（控制台模式）不检查 WhatsApp 配置。
    pub fn validate(&self, require_whatsapp: bool) -> Result<()> {
        let mut problems = Vec::new();

        let cloud_missing = missing_keys(&[
            ("TUYA_ACCESS_ID", &self.cloud.access_id),
            ("TUYA_ACCESS_TOKEN", &self.cloud.access_token),
            ("TUYA_ENDPOINT", &self.cloud.endpoint),
            ("DEVICE_ID", &self.cloud.device_id),
        ]);
        if !cloud_missing.is_empty() {
            problems.push(format!(
                "Missing required Tuya configuration: {}",
                cloud_missing.join(", ")
            ));
        }

        if require_whatsapp {
            let wa_missing = missing_keys(&[
                ("WA_API_URL", &self.whatsapp.api_url),
                ("WA_API_USER", &self.whatsapp.api_user),
                ("WA_API_PASSWORD", &self.whatsapp.api_password),
                ("WA_GROUP_ID", &self.whatsapp.group_id),
            ]);
            if !wa_missing.is_empty() {
                problems.push(format!(
                    "Missing required WhatsApp configuration: {}",
                    wa_missing.join(", ")
                ));
            }
        }

        if self.poller.poll_interval_secs == 0 {
            problems.push("POLL_INTERVAL must be a positive number of seconds".to_string());
        }
        if self.poller.quota_cooldown_secs == 0 {
            problems.push("QUOTA_COOLDOWN_SECS must be a positive number of seconds".to_string());
        }

        if let Some(webhook) = &self.webhook {
            if webhook.url.trim().is_empty() {
                problems.push("Webhook configured without a url".to_string());
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            bail!(problems.join("; "))
        }
    }
}

fn missing_keys(fields: &[(&'static str, &String)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| *key)
        .collect()
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow!("{} must be a non-negative integer, got '{}'", key, value))
}

/// 解析 `.env` 文件为键值表，不修改进程环境；文件不存在时返回空表
///
/// 值可以包含空格，首尾成对的引号会被去掉。
pub fn read_dotenv(path: &Path) -> HashMap<String, String> {
    let Ok(content) = fs::read_to_string(path) else {
        return HashMap::new();
    };

    let mut vars = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim();
        let mut value = value.trim();
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }

        if !key.is_empty() {
            vars.insert(key.to_string(), value.to_string());
        }
    }
    vars
}

/// 环境变量优先，缺失时回退到 `.env` 中的值
pub fn layered_env<'a, F>(
    get: F,
    dotenv: &'a HashMap<String, String>,
) -> impl Fn(&str) -> Option<String> + 'a
where
    F: Fn(&str) -> Option<String> + 'a,
{
    move |key: &str| get(key).or_else(|| dotenv.get(key).cloned())
}

/// 遮蔽敏感值，只保留前 4 个字符
pub fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        return "NOT SET".to_string();
    }
    let visible: String = value.chars().take(4).collect();
    let hidden = value.chars().count().saturating_sub(4).max(4);
    if value.chars().count() > 4 {
        format!("{}{}", visible, "*".repeat(hidden))
    } else {
        "****".to_string()
    }
}
