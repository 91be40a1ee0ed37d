//! Process-wide default engine
//!
//! Code that does not carry an [`Engine`] handle logs through the free
//! functions here. They forward to the installed engine and do nothing when
//! none is installed.
//!
//! ```no_run
//! use fanlog::services::default_engine;
//!
//! # async fn run() {
//! default_engine::init_stdout().ok();
//! default_engine::info("service started").await;
//! default_engine::warnw("slow request", fanlog::fields! { "ms" => 812 }).await;
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::panic::Location;
use std::sync::{PoisonError, RwLock};

use tracing::error;

use crate::domain::errors::LogError;
use crate::domain::models::{EngineConfig, Fields, Level, STDOUT_PATH};
use crate::services::engine::Engine;

static DEFAULT: RwLock<Option<Engine>> = RwLock::new(None);

/// Make `engine` the default, returning the one it replaces.
pub fn install(engine: Engine) -> Option<Engine> {
    DEFAULT
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(engine)
}

/// Handle to the default engine, if one is installed.
pub fn current() -> Option<Engine> {
    DEFAULT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Remove the default engine; later free-function calls are no-ops.
pub fn uninstall() -> Option<Engine> {
    DEFAULT.write().unwrap_or_else(PoisonError::into_inner).take()
}

/// Install a debug-level engine writing to `path` (use `"stdout"` for
/// standard output). On failure the previous default stays installed.
pub fn init_file_logger(path: impl Into<String>) -> Result<(), LogError> {
    install_config(EngineConfig::new(path, Level::Debug.config_name()))
}

/// Install a debug-level engine writing to standard output.
pub fn init_stdout() -> Result<(), LogError> {
    init_file_logger(STDOUT_PATH)
}

/// Install an engine built from `config`. On failure the previous default
/// stays installed.
pub fn install_config(config: EngineConfig) -> Result<(), LogError> {
    let path = config.path.clone();
    match Engine::new(config) {
        Ok(engine) => {
            install(engine);
            Ok(())
        }
        Err(e) => {
            error!(path = %path, error = %e, "failed to initialize default logging engine");
            Err(e)
        }
    }
}

/// Generates the free-function forms for one level.
macro_rules! level_functions {
    ($level:expr, $plain:ident, $formatted:ident, $structured:ident) => {
        #[doc = concat!("Emit a `", stringify!($plain), "` record through the default engine.")]
        #[track_caller]
        pub fn $plain(message: impl fmt::Display) -> impl Future<Output = ()> + Send + 'static {
            let pending = admitting($level).map(|engine| (engine, message.to_string(), Fields::new()));
            submit($level, pending, Location::caller())
        }

        #[doc = concat!("Emit a `", stringify!($plain), "` record from `format_args!` through the default engine.")]
        #[track_caller]
        pub fn $formatted(args: fmt::Arguments<'_>) -> impl Future<Output = ()> + Send + 'static {
            let pending = admitting($level).map(|engine| (engine, fmt::format(args), Fields::new()));
            submit($level, pending, Location::caller())
        }

        #[doc = concat!("Emit a `", stringify!($plain), "` record with structured fields through the default engine.")]
        #[track_caller]
        pub fn $structured(
            message: impl fmt::Display,
            fields: Fields,
        ) -> impl Future<Output = ()> + Send + 'static {
            let pending = admitting($level).map(|engine| (engine, message.to_string(), fields));
            submit($level, pending, Location::caller())
        }
    };
}

level_functions!(Level::Debug, debug, debugf, debugw);
level_functions!(Level::Info, info, infof, infow);
level_functions!(Level::Warn, warn, warnf, warnw);
level_functions!(Level::Error, error, errorf, errorw);

/// The default engine, if installed and `level` passes its gate.
fn admitting(level: Level) -> Option<Engine> {
    current().filter(|engine| engine.enabled(level))
}

async fn submit(
    level: Level,
    pending: Option<(Engine, String, Fields)>,
    call_site: &'static Location<'static>,
) {
    if let Some((engine, message, fields)) = pending {
        engine.emit_from(level, message, fields, Some(call_site)).await;
    }
}
