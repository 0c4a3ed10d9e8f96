//! 通知分发器 - 并发投递到所有渠道并汇总结果

use super::channel::{NotificationChannel, NotificationMessage, SendResult};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// 一次分发的结果，按渠道注册顺序排列
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub results: Vec<(String, SendResult)>,
}

impl DispatchReport {
    /// 至少一个渠道发送成功（dry-run 跳过也算成功）
    pub fn is_delivered(&self) -> bool {
        self.results
            .iter()
            .any(|(_, r)| matches!(r, SendResult::Sent | SendResult::Skipped(_)))
    }

    /// 失败的渠道及原因
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.results.iter().filter_map(|(name, r)| match r {
            SendResult::Failed(reason) => Some((name.as_str(), reason.as_str())),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// 通知分发器，每个渠道在独立任务中发送
pub struct NotificationDispatcher {
    channels: Vec<Arc<dyn NotificationChannel>>,
    dry_run: bool,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
            dry_run: false,
        }
    }

    /// dry-run 模式下只记录日志，不调用任何渠道
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn register_channel(&mut self, channel: Arc<dyn NotificationChannel>) {
        info!(channel = channel.name(), "Registering notification channel");
        self.channels.push(channel);
    }

    /// 投递到所有渠道，等待全部完成
    pub async fn dispatch(&self, message: &NotificationMessage) -> DispatchReport {
        if self.dry_run {
            let results = self
                .channels
                .iter()
                .map(|channel| {
                    info!(channel = channel.name(), content = %message.content, "[DRY-RUN] Would send");
                    (channel.name().to_string(), SendResult::Skipped("dry-run".to_string()))
                })
                .collect();
            return DispatchReport { results };
        }

        let mut tasks = JoinSet::new();
        for (index, channel) in self.channels.iter().enumerate() {
            let channel = Arc::clone(channel);
            let message = message.clone();
            tasks.spawn(async move {
                let result = match channel.send(&message).await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(channel = channel.name(), error = %e, "Channel send failed");
                        SendResult::Failed(e.to_string())
                    }
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<SendResult>> = vec![None; self.channels.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => error!(error = %e, "Channel task panicked"),
            }
        }

        let results = self
            .channels
            .iter()
            .zip(slots)
            .map(|(channel, slot)| {
                let result =
                    slot.unwrap_or_else(|| SendResult::Failed("channel task aborted".to_string()));
                (channel.name().to_string(), result)
            })
            .collect();

        DispatchReport { results }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::alert::AlertKind;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Behavior {
        Succeed,
        Error,
        Reject,
        Panic,
        Slow(Duration),
    }

    struct MockChannel {
        name: &'static str,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl MockChannel {
        fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name,
                behavior,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NotificationChannel for MockChannel {
        fn name(&self) -> &str {
            self.name
        }

        async fn send(&self, _message: &NotificationMessage) -> Result<SendResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Succeed => Ok(SendResult::Sent),
                Behavior::Error => Err(anyhow!("connection reset")),
                Behavior::Reject => Ok(SendResult::Failed("HTTP 401".to_string())),
                Behavior::Panic => panic!("channel bug"),
                Behavior::Slow(delay) => {
                    tokio::time::sleep(*delay).await;
                    Ok(SendResult::Sent)
                }
            }
        }
    }

    fn message() -> NotificationMessage {
        NotificationMessage::new("DOOR OPENED", AlertKind::Opened)
    }

    fn dispatcher(channels: &[Arc<MockChannel>]) -> NotificationDispatcher {
        let mut dispatcher = NotificationDispatcher::new();
        for channel in channels {
            dispatcher.register_channel(channel.clone());
        }
        dispatcher
    }

    #[test]
    fn test_register_channel() {
        let mut dispatcher = NotificationDispatcher::new();
        assert_eq!(dispatcher.channel_count(), 0);

        dispatcher.register_channel(MockChannel::new("whatsapp", Behavior::Succeed));
        assert_eq!(dispatcher.channel_names(), vec!["whatsapp"]);
    }

    #[tokio::test]
    async fn test_dispatch_reports_in_registration_order() {
        let slow = MockChannel::new("slow", Behavior::Slow(Duration::from_millis(50)));
        let fast = MockChannel::new("fast", Behavior::Succeed);
        let report = dispatcher(&[slow, fast]).dispatch(&message()).await;

        let names: Vec<_> = report.results.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["slow", "fast"]);
        assert!(report.is_delivered());
    }

    #[tokio::test]
    async fn test_dry_run_skips_channels() {
        let channel = MockChannel::new("whatsapp", Behavior::Succeed);
        let report = dispatcher(&[channel.clone()])
            .with_dry_run(true)
            .dispatch(&message())
            .await;

        assert_eq!(report.results[0].1, SendResult::Skipped("dry-run".to_string()));
        assert!(report.is_delivered());
        assert_eq!(channel.calls(), 0);
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let broken = MockChannel::new("broken", Behavior::Error);
        let rejected = MockChannel::new("rejected", Behavior::Reject);
        let healthy = MockChannel::new("healthy", Behavior::Succeed);
        let report = dispatcher(&[broken.clone(), rejected, healthy.clone()])
            .dispatch(&message())
            .await;

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(
            failures,
            vec![("broken", "connection reset"), ("rejected", "HTTP 401")]
        );
        assert!(report.is_delivered());
        assert_eq!(broken.calls(), 1);
        assert_eq!(healthy.calls(), 1);
    }

    #[tokio::test]
    async fn test_panicking_channel_counts_as_failure() {
        let report = dispatcher(&[MockChannel::new("buggy", Behavior::Panic)])
            .dispatch(&message())
            .await;

        assert_eq!(report.results.len(), 1);
        assert!(matches!(report.results[0].1, SendResult::Failed(_)));
        assert!(!report.is_delivered());
    }

    #[tokio::test]
    async fn test_empty_dispatcher_is_not_delivered() {
        let report = NotificationDispatcher::new().dispatch(&message()).await;
        assert!(report.is_empty());
        assert!(!report.is_delivered());
    }
}
