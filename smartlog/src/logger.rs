//! Log sink setup and the logger handle carried by every record.
//!
//! Records are `tracing` events. [`init_logging`] installs a subscriber with a
//! JSON file sink (rotated by `tracing-appender`) and, optionally, a readable
//! console sink, each with its own threshold.
//!
//! [`Logger`] does not own a sink. It carries the `service`, `env` and, once a
//! request is known, `log_id` fields so every record emitted through it can be
//! tied back to a deployment and a request.

use std::sync::Arc;

use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{
    config::{Config, LogConfig},
    context::LogId,
    error::{Error, Result},
};

/// Cloneable handle holding the fields attached to every record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Logger {
    service: Arc<str>,
    env: Arc<str>,
    log_id: Option<Arc<str>>,
}

impl Logger {
    pub fn new(service: &str, env: &str) -> Self {
        Self {
            service: Arc::from(service),
            env: Arc::from(env),
            log_id: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.service_name, &config.env)
    }

    /// Derives a request-scoped logger whose records carry `log_id`.
    #[must_use]
    pub fn with_log_id(&self, log_id: &LogId) -> Self {
        Self {
            log_id: Some(Arc::from(log_id.as_str())),
            ..self.clone()
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn env(&self) -> &str {
        &self.env
    }

    pub fn log_id(&self) -> Option<&str> {
        self.log_id.as_deref()
    }
}

/// Emits a `tracing` event carrying the logger's fields.
///
/// `emit!(logger, INFO, { key = value, }, "message")`. Extra fields go inside
/// the braces, each followed by a comma.
macro_rules! emit {
    ($logger:expr, $level:ident, { $($fields:tt)* }, $($message:tt)+) => {{
        let logger: &$crate::logger::Logger = &$logger;
        ::tracing::event!(
            ::tracing::Level::$level,
            service = logger.service(),
            env = logger.env(),
            log_id = logger.log_id(),
            $($fields)*
            $($message)+
        )
    }};
}

pub(crate) use emit;

/// Keeps the file sink's background writer alive. Dropping it flushes pending records.
#[must_use = "dropping the guard stops the file sink"]
pub struct LoggingGuard {
    _file: WorkerGuard,
}

/// Installs the global subscriber described by `config.log`.
///
/// # Errors
///
/// Fails when the log directory cannot be created, a level name is invalid,
/// the appender cannot be built or a global subscriber is already installed.
pub fn init_logging(config: &Config) -> Result<LoggingGuard> {
    let log = &config.log;
    std::fs::create_dir_all(&log.directory)?;

    let (writer, guard) = tracing_appender::non_blocking(file_appender(log)?);
    let file_layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(level_filter(&log.level)?);

    let console_layer = if log.console {
        Some(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(level_filter(&log.console_level)?),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| Error::Logging {
            message: format!("Failed to install subscriber: {e}"),
        })?;

    Ok(LoggingGuard { _file: guard })
}

fn file_appender(log: &LogConfig) -> Result<RollingFileAppender> {
    let mut builder = RollingFileAppender::builder()
        .rotation(rotation(&log.rotation))
        .filename_prefix(log.file_name.as_str());
    if log.max_files > 0 {
        builder = builder.max_log_files(log.max_files);
    }
    builder.build(&log.directory).map_err(|e| Error::Logging {
        message: format!("Failed to open log file in '{}': {e}", log.directory.display()),
    })
}

fn rotation(name: &str) -> Rotation {
    match name {
        "minutely" => Rotation::MINUTELY,
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

fn level_filter(level: &str) -> Result<LevelFilter> {
    level.parse().map_err(|_| Error::Logging {
        message: format!("Invalid log level '{level}'"),
    })
}
