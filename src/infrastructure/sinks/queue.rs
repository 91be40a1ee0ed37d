//! Work-queue transport sink
//!
//! Appends each encoded record to the tail of a named list through a
//! [`QueueClient`] supplied by the host. Same best-effort rules as the
//! publish sink.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

use super::bounded;
use super::publish::DEFAULT_TRANSPORT_TIMEOUT;
use crate::domain::errors::SinkError;
use crate::domain::ports::{QueueClient, Sink};

/// Sink pushing records onto a list.
pub struct QueueSink {
    key: String,
    client: Arc<dyn QueueClient>,
    timeout: Duration,
}

impl QueueSink {
    /// Sink pushing onto the list at `key` with the default timeout.
    pub fn new(key: impl Into<String>, client: Arc<dyn QueueClient>) -> Self {
        Self {
            key: key.into(),
            client,
            timeout: DEFAULT_TRANSPORT_TIMEOUT,
        }
    }

    /// Override the per-call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Queue key records are pushed to.
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl Sink for QueueSink {
    async fn write(&self, buf: &[u8]) -> Result<usize, SinkError> {
        match bounded(self.timeout, self.client.push_back(&self.key, buf)).await {
            Ok(_len) => Ok(buf.len()),
            Err(e) => {
                warn!(key = %self.key, error = %e, "log queue push failed");
                Err(e)
            }
        }
    }

    async fn sync(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// In-memory lists keyed by name, optionally bounded.
#[derive(Debug, Default)]
pub struct LocalQueue {
    max_len: Option<usize>,
    lists: Mutex<HashMap<String, VecDeque<Vec<u8>>>>,
}

impl LocalQueue {
    /// Empty queue store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject pushes once a list holds `max_len` entries.
    pub fn bounded(max_len: usize) -> Self {
        Self {
            max_len: Some(max_len),
            lists: Mutex::new(HashMap::new()),
        }
    }

    /// Take the oldest entry of `key`.
    pub fn pop_front(&self, key: &str) -> Option<Vec<u8>> {
        self.lists
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get_mut(key)
            .and_then(VecDeque::pop_front)
    }

    /// Entries currently queued under `key`.
    pub fn len(&self, key: &str) -> usize {
        self.lists
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .map_or(0, VecDeque::len)
    }
}

#[async_trait]
impl QueueClient for LocalQueue {
    async fn push_back(&self, key: &str, payload: &[u8]) -> Result<u64, SinkError> {
        let mut lists = self
            .lists
            .lock()
            .map_err(|e| SinkError::Poisoned(e.to_string()))?;
        let list = lists.entry(key.to_string()).or_default();

        if self.max_len.is_some_and(|max| list.len() >= max) {
            return Err(SinkError::Transport(format!("queue {key} is full")));
        }

        list.push_back(payload.to_vec());
        Ok(list.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_push_appends_to_tail() {
        let queue = Arc::new(LocalQueue::new());
        let sink = QueueSink::new("logs:ingest", queue.clone());

        sink.write(b"first\n").await.unwrap();
        sink.write(b"second\n").await.unwrap();

        assert_eq!(queue.len("logs:ingest"), 2);
        assert_eq!(queue.pop_front("logs:ingest").unwrap(), b"first\n".to_vec());
        assert_eq!(queue.pop_front("logs:ingest").unwrap(), b"second\n".to_vec());
        assert!(queue.pop_front("logs:ingest").is_none());
    }

    #[tokio::test]
    async fn test_full_queue_reports_transport_error() {
        let queue = Arc::new(LocalQueue::bounded(1));
        let sink = QueueSink::new("logs", queue.clone());

        sink.write(b"kept").await.unwrap();
        let result = sink.write(b"dropped").await;

        assert!(matches!(result, Err(SinkError::Transport(_))));
        assert_eq!(queue.len("logs"), 1);
    }

    #[tokio::test]
    async fn test_sync_is_a_no_op() {
        let sink = QueueSink::new("logs", Arc::new(LocalQueue::new()));
        sink.sync().await.unwrap();
    }
}
