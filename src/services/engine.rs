//! Logging engine
//!
//! Owns the level gate, the day-boundary rotation controller, the encoder and
//! the fan-out router. One emission runs, in order:
//!
//! 1. level gate (disabled levels return before any formatting or I/O)
//! 2. rotation check against the current calendar day
//! 3. record construction and encoding
//! 4. dispatch to every sink, failures reported through `tracing`
//! 5. optional sync of every sink
//!
//! Emission never fails from the caller's point of view.

use std::fmt;
use std::future::Future;
use std::panic::Location;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::errors::{DispatchError, LogError};
use crate::domain::models::{CallSite, EngineConfig, Fields, Level, Record};
use crate::domain::ports::{Clock, DayRotator, Logger, Publisher, QueueClient, SharedSink};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::encoder::JsonEncoder;
use crate::infrastructure::logging::{RotationController, RotationState};
use crate::infrastructure::sinks::{PublishSink, QueueSink, RollingFile, StdoutSink};
use crate::services::router::FanOut;

/// Multi-sink structured logging engine.
///
/// Cloning is cheap; clones share sinks, rotation state and configuration.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: EngineConfig,
    level: Level,
    encoder: JsonEncoder,
    router: FanOut,
    rotation: Option<RotationController>,
    clock: Arc<dyn Clock>,
}

/// Generates the plain, formatted and structured forms for one level.
macro_rules! level_methods {
    ($level:expr, $plain:ident, $formatted:ident, $structured:ident) => {
        #[doc = concat!("Emit a `", stringify!($plain), "` record whose message is `message`.")]
        #[track_caller]
        pub fn $plain(&self, message: impl fmt::Display) -> impl Future<Output = ()> + Send + '_ {
            let pending = self
                .enabled($level)
                .then(|| (message.to_string(), Fields::new()));
            self.submit($level, pending, Location::caller())
        }

        #[doc = concat!("Emit a `", stringify!($plain), "` record from `format_args!`.")]
        #[track_caller]
        pub fn $formatted(&self, args: fmt::Arguments<'_>) -> impl Future<Output = ()> + Send + '_ {
            let pending = self
                .enabled($level)
                .then(|| (fmt::format(args), Fields::new()));
            self.submit($level, pending, Location::caller())
        }

        #[doc = concat!("Emit a `", stringify!($plain), "` record with structured fields.")]
        #[track_caller]
        pub fn $structured(
            &self,
            message: impl fmt::Display,
            fields: Fields,
        ) -> impl Future<Output = ()> + Send + '_ {
            let pending = self.enabled($level).then(|| (message.to_string(), fields));
            self.submit($level, pending, Location::caller())
        }
    };
}

impl Engine {
    /// Engine with the configured file (or stdout) destination and no
    /// auxiliary sinks.
    pub fn new(config: EngineConfig) -> Result<Self, LogError> {
        Self::builder(config).build()
    }

    /// Builder for attaching auxiliary sinks and test doubles.
    pub fn builder(config: EngineConfig) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    /// Configuration the engine was built from.
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Minimum level admitted by the gate.
    pub fn level(&self) -> Level {
        self.inner.level
    }

    /// Whether a record at `level` would be emitted.
    pub fn enabled(&self, level: Level) -> bool {
        self.inner.level.admits(level)
    }

    /// Primary plus auxiliary sinks.
    pub fn sink_count(&self) -> usize {
        self.inner.router.len()
    }

    /// Rotation state, or `None` when day rotation is not armed.
    pub fn rotation_state(&self) -> Option<RotationState> {
        self.inner.rotation.as_ref().map(RotationController::state)
    }

    /// Wait for a background day rotation submitted by an earlier emission.
    pub async fn settle_rotation(&self) {
        if let Some(rotation) = &self.inner.rotation {
            rotation.settle().await;
        }
    }

    /// Rotate the local file now, regardless of the calendar day.
    pub fn rotate_file(&self) -> Result<(), LogError> {
        let rotation = self.inner.rotation.as_ref().ok_or_else(|| {
            LogError::InvalidConfig("no rotatable file destination is configured".to_string())
        })?;
        rotation.force(self.inner.clock.now().date_naive())
    }

    /// Sync every sink.
    pub async fn flush(&self) -> Result<(), DispatchError> {
        self.inner.router.sync().await
    }

    /// Emit a record at `level` with a displayable message and fields.
    #[track_caller]
    pub fn emit(
        &self,
        level: Level,
        message: impl fmt::Display,
        fields: Fields,
    ) -> impl Future<Output = ()> + Send + '_ {
        let pending = self.enabled(level).then(|| (message.to_string(), fields));
        self.submit(level, pending, Location::caller())
    }

    level_methods!(Level::Debug, debug, debugf, debugw);
    level_methods!(Level::Info, info, infof, infow);
    level_methods!(Level::Warn, warn, warnf, warnw);
    level_methods!(Level::Error, error, errorf, errorw);

    /// `pending` is `None` when the gate rejected the record; the message was
    /// already built on the caller's thread otherwise.
    async fn submit(
        &self,
        level: Level,
        pending: Option<(String, Fields)>,
        call_site: &'static Location<'static>,
    ) {
        if let Some((message, fields)) = pending {
            self.emit_from(level, message, fields, Some(call_site)).await;
        }
    }

    /// Emission path shared by every public form.
    pub(crate) async fn emit_from(
        &self,
        level: Level,
        message: String,
        fields: Fields,
        call_site: Option<&'static Location<'static>>,
    ) {
        let inner = &*self.inner;
        if !inner.level.admits(level) {
            return;
        }

        let now = inner.clock.now();
        if let Some(rotation) = &inner.rotation {
            if rotation.check(now.date_naive()) {
                debug!(day = %now.date_naive(), "day boundary crossed, rotation submitted");
            }
        }

        let caller = if inner.config.caller {
            call_site.map(CallSite::from)
        } else {
            None
        };
        let record = Record::new(now, level, message, fields, caller);
        let buf = inner.encoder.encode(&record);

        if let Err(e) = inner.router.dispatch(&buf).await {
            warn!(level = %level, error = %e, "log record was not delivered to every sink");
        }

        if inner.config.sync_on_emit {
            if let Err(e) = inner.router.sync().await {
                warn!(error = %e, "log sink sync failed");
            }
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("level", &self.inner.level)
            .field("router", &self.inner.router)
            .field("rotation", &self.inner.rotation)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Logger for Engine {
    async fn log(&self, level: Level, message: &str, fields: Fields) {
        if !self.enabled(level) {
            return;
        }
        self.emit_from(level, message.to_string(), fields, None).await;
    }
}

/// Builder for [`Engine`], the place where auxiliary sinks are attached.
#[must_use]
pub struct EngineBuilder {
    config: EngineConfig,
    primary: Option<SharedSink>,
    auxiliary: Vec<SharedSink>,
    clock: Option<Arc<dyn Clock>>,
    rotator: Option<Arc<dyn DayRotator>>,
}

impl EngineBuilder {
    /// Builder starting from `config`.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            primary: None,
            auxiliary: Vec::new(),
            clock: None,
            rotator: None,
        }
    }

    /// Service tag written into every record.
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.config.service = service.into();
        self
    }

    /// Namespace tag written into every record.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Attach an auxiliary sink; sinks receive records in attachment order.
    pub fn sink(mut self, sink: SharedSink) -> Self {
        self.auxiliary.push(sink);
        self
    }

    /// Attach several auxiliary sinks in order.
    pub fn sinks(mut self, sinks: impl IntoIterator<Item = SharedSink>) -> Self {
        self.auxiliary.extend(sinks);
        self
    }

    /// Attach a pub/sub sink bounded by the configured transport timeout.
    pub fn publish_to(self, channel: impl Into<String>, publisher: Arc<dyn Publisher>) -> Self {
        let timeout = self.config.transport_timeout();
        self.sink(Arc::new(PublishSink::new(channel, publisher).with_timeout(timeout)))
    }

    /// Attach a work-queue sink bounded by the configured transport timeout.
    pub fn queue_to(self, key: impl Into<String>, client: Arc<dyn QueueClient>) -> Self {
        let timeout = self.config.transport_timeout();
        self.sink(Arc::new(QueueSink::new(key, client).with_timeout(timeout)))
    }

    /// Replace the configured file destination with `sink`.
    ///
    /// Day rotation is then only armed when a rotator is supplied as well.
    pub fn primary(mut self, sink: SharedSink) -> Self {
        self.primary = Some(sink);
        self
    }

    /// Auxiliary sinks only.
    pub fn disable_file(mut self) -> Self {
        self.config.disable_file = true;
        self
    }

    /// Arm or disarm the day-boundary rotation.
    pub fn daily_rotation(mut self, enabled: bool) -> Self {
        self.config.daily_rotation = enabled;
        self
    }

    /// Time source for timestamps and the day check.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Action run when the calendar day changes, instead of rolling the file.
    pub fn rotator(mut self, rotator: Arc<dyn DayRotator>) -> Self {
        self.rotator = Some(rotator);
        self
    }

    /// Validate the configuration and assemble the engine.
    ///
    /// Fails on an unknown level, an unusable destination, or when no sink is left.
    pub fn build(self) -> Result<Engine, LogError> {
        let Self {
            config,
            primary,
            auxiliary,
            clock,
            mut rotator,
        } = self;

        let level: Level = config.level.parse()?;
        if config.transport_timeout_ms == 0 {
            return Err(LogError::InvalidConfig(
                "transport_timeout_ms must be at least 1".to_string(),
            ));
        }

        let primary: Option<SharedSink> = match primary {
            Some(sink) => Some(sink),
            None if config.disable_file => None,
            None if config.is_stdout() => Some(Arc::new(StdoutSink)),
            None => {
                let file = Arc::new(RollingFile::new(&config.path, config.file)?);
                if rotator.is_none() {
                    rotator = Some(file.clone());
                }
                Some(file)
            }
        };

        let router = FanOut::new(primary, auxiliary);
        if router.is_empty() {
            return Err(LogError::InvalidConfig(
                "file output is disabled and no auxiliary sinks are attached".to_string(),
            ));
        }

        let clock: Arc<dyn Clock> = clock.unwrap_or_else(|| Arc::new(SystemClock));
        let rotation = match rotator {
            Some(rotator) if config.daily_rotation => Some(RotationController::new(
                rotator,
                clock.now().date_naive(),
            )),
            _ => None,
        };

        debug!(
            level = %level,
            sinks = router.len(),
            daily_rotation = rotation.is_some(),
            "logging engine constructed"
        );

        Ok(Engine {
            inner: Arc::new(EngineInner {
                encoder: JsonEncoder::new(config.service.clone(), config.namespace.clone()),
                config,
                level,
                router,
                rotation,
                clock,
            }),
        })
    }
}
