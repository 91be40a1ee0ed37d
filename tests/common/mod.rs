//! Common test utilities for integration tests
//!
//! Sink and rotator doubles shared by the engine test binaries.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use fanlog::{DayRotator, LogError, Publisher, Sink, SinkError};

/// Sink that keeps every buffer it receives.
#[derive(Default)]
pub struct RecordingSink {
    writes: Mutex<Vec<Vec<u8>>>,
    syncs: AtomicUsize,
}

impl RecordingSink {
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn sync_count(&self) -> usize {
        self.syncs.load(Ordering::SeqCst)
    }

    /// Every received buffer parsed as one JSON record.
    pub fn records(&self) -> Vec<serde_json::Value> {
        self.writes()
            .iter()
            .map(|buf| serde_json::from_slice(buf).expect("sink received invalid JSON"))
            .collect()
    }
}

#[async_trait]
impl Sink for RecordingSink {
    async fn write(&self, buf: &[u8]) -> Result<usize, SinkError> {
        self.writes.lock().unwrap().push(buf.to_vec());
        Ok(buf.len())
    }

    async fn sync(&self) -> Result<(), SinkError> {
        self.syncs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Sink whose writes always fail, like a network sink with a dead backend.
#[derive(Default)]
pub struct FailingSink {
    attempts: AtomicUsize,
}

impl FailingSink {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sink for FailingSink {
    async fn write(&self, _buf: &[u8]) -> Result<usize, SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SinkError::Transport("connection refused".to_string()))
    }

    async fn sync(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Publisher that never answers.
pub struct StalledPublisher;

#[async_trait]
impl Publisher for StalledPublisher {
    async fn publish(&self, _channel: &str, _payload: &[u8]) -> Result<u64, SinkError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(0)
    }
}

/// Day rotator that counts invocations and can be told to fail.
#[derive(Default)]
pub struct CountingRotator {
    count: AtomicUsize,
    failing: AtomicBool,
}

impl CountingRotator {
    pub fn failing() -> Self {
        Self {
            count: AtomicUsize::new(0),
            failing: AtomicBool::new(true),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl DayRotator for CountingRotator {
    fn rotate(&self) -> Result<(), LogError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(LogError::Rotation("disk unavailable".to_string()));
        }
        Ok(())
    }
}

/// Records of a JSON-lines log file.
pub fn read_records(path: &Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|line| serde_json::from_str(line).expect("log file holds invalid JSON"))
        .collect()
}
