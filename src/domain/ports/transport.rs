//! Backend ports for pub/sub and work-queue transports.

use async_trait::async_trait;

use crate::domain::errors::SinkError;

/// Pub/sub connection owned by the host application.
///
/// Backends such as Redis `PUBLISH` or NATS subjects implement this outside
/// the core; [`BroadcastPublisher`](crate::infrastructure::sinks::BroadcastPublisher)
/// is the in-process implementation.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `payload` on `channel`, returning how many subscribers received it.
    async fn publish(&self, channel: &str, payload: &[u8]) -> Result<u64, SinkError>;
}

/// Work-queue client owned by the host application (e.g. Redis `RPUSH`).
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Append `payload` to the tail of the list at `key`, returning its new length.
    async fn push_back(&self, key: &str, payload: &[u8]) -> Result<u64, SinkError>;
}
