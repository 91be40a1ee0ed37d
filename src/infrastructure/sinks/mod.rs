//! Sink implementations: local rolling file, stdout and transports.

pub mod file;
pub mod publish;
pub mod queue;
pub mod stdout;

pub use file::{Generation, RollingFile};
pub use publish::{BroadcastPublisher, PublishSink, DEFAULT_TRANSPORT_TIMEOUT};
pub use queue::{LocalQueue, QueueSink};
pub use stdout::StdoutSink;

use std::future::Future;
use std::time::Duration;

use crate::domain::errors::SinkError;

/// Bound a transport call so a stalled backend cannot stall the caller.
async fn bounded<T>(
    timeout: Duration,
    op: impl Future<Output = Result<T, SinkError>>,
) -> Result<T, SinkError> {
    tokio::time::timeout(timeout, op)
        .await
        .map_err(|_| SinkError::Timeout(timeout))?
}
