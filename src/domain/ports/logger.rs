//! Logging port for code that should not depend on the concrete engine.

use async_trait::async_trait;

use crate::domain::models::{Fields, Level};

/// Port trait for structured logging operations.
///
/// Application code that should not depend on a concrete engine takes a
/// `&dyn Logger` (or `Arc<dyn Logger>`). [`Engine`](crate::Engine) is the
/// production adapter; tests can substitute a capturing implementation.
///
/// # Structured Logging
///
/// `log` accepts ordered [`Fields`]; each field becomes a top-level key of
/// the encoded record, after the fixed keys.
///
/// # Examples
///
/// ```no_run
/// use fanlog::{fields, Level, Logger};
///
/// async fn process_task(logger: &dyn Logger, task_id: &str) {
///     logger.info(&format!("Starting task {task_id}")).await;
///
///     logger
///         .log(Level::Debug, "Validating task inputs", fields! { "task_id" => task_id, "step" => "validation" })
///         .await;
///
///     logger.warn("Task taking longer than expected").await;
/// }
/// ```
#[async_trait]
pub trait Logger: Send + Sync {
    /// Log a message with a specific level and structured fields
    async fn log(&self, level: Level, message: &str, fields: Fields);

    /// Log a debug-level message
    async fn debug(&self, message: &str) {
        self.log(Level::Debug, message, Fields::new()).await;
    }

    /// Log an info-level message
    async fn info(&self, message: &str) {
        self.log(Level::Info, message, Fields::new()).await;
    }

    /// Log a warning-level message
    async fn warn(&self, message: &str) {
        self.log(Level::Warn, message, Fields::new()).await;
    }

    /// Log an error-level message
    async fn error(&self, message: &str) {
        self.log(Level::Error, message, Fields::new()).await;
    }
}
