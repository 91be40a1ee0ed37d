//! Standard output destination.

use async_trait::async_trait;
use std::io::{self, Write};

use crate::domain::errors::SinkError;
use crate::domain::ports::Sink;

/// Writes records to standard output.
///
/// Selected by the `stdout` pseudo-destination. Day rotation does not apply.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

#[async_trait]
impl Sink for StdoutSink {
    async fn write(&self, buf: &[u8]) -> Result<usize, SinkError> {
        let mut out = io::stdout().lock();
        out.write_all(buf)?;
        Ok(buf.len())
    }

    async fn sync(&self) -> Result<(), SinkError> {
        io::stdout().lock().flush()?;
        Ok(())
    }
}
