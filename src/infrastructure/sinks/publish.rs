//! Pub/sub transport sink
//!
//! Publishes each encoded record on a named channel through a [`Publisher`]
//! supplied by the host. Delivery is best-effort: failures and timeouts are
//! reported to the router, never raised.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::warn;

use super::bounded;
use crate::domain::errors::SinkError;
use crate::domain::ports::{Publisher, Sink};

/// Default bound on one publish call.
pub const DEFAULT_TRANSPORT_TIMEOUT: Duration = Duration::from_secs(2);

/// Sink publishing records to a channel.
pub struct PublishSink {
    channel: String,
    publisher: Arc<dyn Publisher>,
    timeout: Duration,
}

impl PublishSink {
    /// Sink publishing to `channel` with the default timeout.
    pub fn new(channel: impl Into<String>, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            channel: channel.into(),
            publisher,
            timeout: DEFAULT_TRANSPORT_TIMEOUT,
        }
    }

    /// Override the per-call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Channel records are published to.
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

#[async_trait]
impl Sink for PublishSink {
    async fn write(&self, buf: &[u8]) -> Result<usize, SinkError> {
        match bounded(self.timeout, self.publisher.publish(&self.channel, buf)).await {
            Ok(_receivers) => Ok(buf.len()),
            Err(e) => {
                warn!(channel = %self.channel, error = %e, "log publish failed");
                Err(e)
            }
        }
    }

    async fn sync(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// In-process publisher backed by one tokio broadcast channel per topic.
pub struct BroadcastPublisher {
    capacity: usize,
    channels: Mutex<HashMap<String, broadcast::Sender<Vec<u8>>>>,
}

impl BroadcastPublisher {
    /// `capacity` is the per-channel backlog kept for slow subscribers.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Receive every payload published on `channel` from now on.
    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<Vec<u8>> {
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl Publisher for BroadcastPublisher {
    async fn publish(&self, channel: &str, payload: &[u8]) -> Result<u64, SinkError> {
        let sender = {
            let channels = self
                .channels
                .lock()
                .map_err(|e| SinkError::Poisoned(e.to_string()))?;
            channels.get(channel).cloned()
        };

        // Publishing to a channel nobody listens on reaches zero receivers.
        let receivers = sender
            .and_then(|sender| sender.send(payload.to_vec()).ok())
            .unwrap_or(0);
        Ok(receivers as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StalledPublisher;

    #[async_trait]
    impl Publisher for StalledPublisher {
        async fn publish(&self, _channel: &str, _payload: &[u8]) -> Result<u64, SinkError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(1)
        }
    }

    struct RefusingPublisher;

    #[async_trait]
    impl Publisher for RefusingPublisher {
        async fn publish(&self, _channel: &str, _payload: &[u8]) -> Result<u64, SinkError> {
            Err(SinkError::Transport("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let publisher = Arc::new(BroadcastPublisher::default());
        let mut rx = publisher.subscribe("logs");
        let sink = PublishSink::new("logs", publisher.clone());

        let written = sink.write(b"{\"msg\":\"hi\"}\n").await.unwrap();
        assert_eq!(written, 13);
        assert_eq!(rx.recv().await.unwrap(), b"{\"msg\":\"hi\"}\n".to_vec());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_not_an_error() {
        let publisher = BroadcastPublisher::default();
        assert_eq!(publisher.publish("nobody", b"x").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_publish_failure_is_returned() {
        let sink = PublishSink::new("logs", Arc::new(RefusingPublisher));
        let result = sink.write(b"x").await;
        assert!(matches!(result, Err(SinkError::Transport(_))));
    }

    #[tokio::test]
    async fn test_stalled_publisher_times_out() {
        let sink = PublishSink::new("logs", Arc::new(StalledPublisher))
            .with_timeout(Duration::from_millis(100));

        let result = sink.write(b"x").await;
        assert!(matches!(result, Err(SinkError::Timeout(d)) if d == Duration::from_millis(100)));
    }
}
