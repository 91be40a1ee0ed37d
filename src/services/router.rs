//! Fan-out router
//!
//! Composes the primary sink and the auxiliary sinks into one logical sink.
//! Every buffer goes to every sink in registration order (primary first);
//! a failing sink never prevents delivery to the ones after it. Failures of
//! one pass come back as a single [`DispatchError`].

use std::io;

use crate::domain::errors::{DispatchError, SinkError, SinkFailure};
use crate::domain::ports::SharedSink;

/// Ordered set of sinks receiving the same record stream.
#[derive(Clone, Default)]
pub struct FanOut {
    sinks: Vec<SharedSink>,
}

impl FanOut {
    /// Router over `primary` (when present) followed by `auxiliary`.
    pub fn new(primary: Option<SharedSink>, auxiliary: impl IntoIterator<Item = SharedSink>) -> Self {
        Self {
            sinks: primary.into_iter().chain(auxiliary).collect(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Write `buf` to every sink, in order, collecting failures.
    pub async fn dispatch(&self, buf: &[u8]) -> Result<(), DispatchError> {
        let mut failures = Vec::new();

        for (index, sink) in self.sinks.iter().enumerate() {
            match sink.write(buf).await {
                Ok(written) if written < buf.len() => failures.push(SinkFailure {
                    index,
                    error: SinkError::Io(io::Error::new(
                        io::ErrorKind::WriteZero,
                        format!("short write: {written} of {} bytes", buf.len()),
                    )),
                }),
                Ok(_) => {}
                Err(error) => failures.push(SinkFailure { index, error }),
            }
        }

        self.outcome(failures)
    }

    /// Sync every sink once, collecting failures.
    pub async fn sync(&self) -> Result<(), DispatchError> {
        let mut failures = Vec::new();

        for (index, sink) in self.sinks.iter().enumerate() {
            if let Err(error) = sink.sync().await {
                failures.push(SinkFailure { index, error });
            }
        }

        self.outcome(failures)
    }

    fn outcome(&self, failures: Vec<SinkFailure>) -> Result<(), DispatchError> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError {
                total: self.sinks.len(),
                failures,
            })
        }
    }
}

impl std::fmt::Debug for FanOut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanOut")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
