//! fanlog - structured multi-sink logging
//!
//! Every record is gated by a minimum level, encoded once as a single JSON
//! line and fanned out to a primary destination (a size-rolled local file or
//! stdout) plus any number of auxiliary sinks such as pub/sub channels and
//! work queues. The local file is additionally rolled when the calendar day
//! changes. A failing sink never affects the others or the caller.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): levels, records, configuration, errors and
//!   the port traits (`Sink`, `Publisher`, `QueueClient`, `DayRotator`, `Clock`, `Logger`)
//! - **Infrastructure Layer** (`infrastructure`): JSON encoder, sinks,
//!   rotation controller, configuration loading, clocks
//! - **Service Layer** (`services`): the engine, its fan-out router and the
//!   process-wide default engine
//! - **CLI Layer** (`cli`): the `fanlog` command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use fanlog::{fields, BroadcastPublisher, Engine, EngineConfig};
//!
//! # async fn run() -> Result<(), fanlog::LogError> {
//! let bus = Arc::new(BroadcastPublisher::default());
//! let engine = Engine::builder(EngineConfig::new("/var/log/api/normal.log", "info"))
//!     .service("api")
//!     .publish_to("logs", bus)
//!     .build()?;
//!
//! engine.info("listening").await;
//! engine.warnw("slow request", fields! { "path" => "/v1/users", "ms" => 812 }).await;
//! # Ok(())
//! # }
//! ```

#[macro_use]
mod macros;

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DispatchError, LogError, SinkError, SinkFailure};
pub use domain::models::{
    CallSite, EngineConfig, FieldValue, Fields, Level, Record, RollingPolicy, Values,
    STDOUT_PATH,
};
pub use domain::ports::{Clock, DayRotator, Logger, Publisher, QueueClient, SharedSink, Sink};
pub use infrastructure::clock::{ManualClock, SystemClock};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::encoder::JsonEncoder;
pub use infrastructure::sinks::{
    BroadcastPublisher, LocalQueue, PublishSink, QueueSink, RollingFile, StdoutSink,
};
pub use services::{default_engine, Engine, EngineBuilder, FanOut};
