//! Record destination port.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::errors::SinkError;

/// Destination for fully encoded records.
///
/// A sink accepts one encoded record per `write` call and may buffer it until
/// `sync`. Failures are returned, never raised: the fan-out router isolates
/// each sink, so one broken destination cannot suppress the others.
///
/// Implementations shipped with the crate:
/// - [`RollingFile`](crate::infrastructure::sinks::RollingFile): size-capped local file
/// - [`StdoutSink`](crate::infrastructure::sinks::StdoutSink): standard output
/// - [`PublishSink`](crate::infrastructure::sinks::PublishSink): pub/sub channel
/// - [`QueueSink`](crate::infrastructure::sinks::QueueSink): work-queue list
#[async_trait]
pub trait Sink: Send + Sync {
    /// Accept one encoded record, returning the number of bytes taken.
    async fn write(&self, buf: &[u8]) -> Result<usize, SinkError>;

    /// Flush anything buffered. Must not retry indefinitely.
    async fn sync(&self) -> Result<(), SinkError>;
}

/// Shared handle to a sink; sinks outlive any single emission.
pub type SharedSink = Arc<dyn Sink>;
