//! Database query logging.
//!
//! Two independent pieces, both driven by [`QueryConfig`]:
//!
//! - [`QueryLogger`] records each executed statement at a level picked from its
//!   outcome: ERROR on failure, WARN when slow, INFO otherwise.
//! - [`ResultLogger`] records what a query returned, truncated to the
//!   configured byte budget by [`BoundedSerializer`].
//!
//! Neither is tied to a driver or ORM; the integration calls them from its
//! own hooks with the statement text, timing and result value.

use std::{fmt, time::Duration};

use serde::Serialize;

use crate::{
    bounded::BoundedSerializer,
    config::QueryConfig,
    context::RequestContext,
    error::Result,
    http::millis,
    logger::{Logger, emit},
};

/// Statements slower than this are logged at WARN unless configured otherwise.
pub const DEFAULT_SLOW_QUERY_THRESHOLD: Duration = Duration::from_millis(200);

/// Verbosity of the query logger. Ordered from quietest to loudest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum QueryLogLevel {
    Silent,
    Error,
    Warn,
    #[default]
    Info,
}

impl QueryLogLevel {
    /// Maps a configured name. Unknown names select `Info`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "silent" => Self::Silent,
            "error" => Self::Error,
            "warn" => Self::Warn,
            _ => Self::Info,
        }
    }
}

/// A failed statement, as seen by [`QueryLogger::trace`].
pub trait QueryError: fmt::Display {
    /// Lookups that matched no row are not logged as failures.
    fn is_record_not_found(&self) -> bool {
        false
    }
}

/// Logs executed statements and driver messages.
#[derive(Clone, Debug)]
pub struct QueryLogger {
    logger: Logger,
    level: QueryLogLevel,
    slow_threshold: Duration,
}

impl QueryLogger {
    pub fn new(logger: Logger, config: &QueryConfig) -> Self {
        let slow_threshold = u64::try_from(config.slow_query_threshold_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map_or(DEFAULT_SLOW_QUERY_THRESHOLD, Duration::from_millis);
        Self {
            logger,
            level: QueryLogLevel::from_name(&config.level),
            slow_threshold,
        }
    }

    /// A copy of this logger at another level.
    #[must_use]
    pub fn with_level(&self, level: QueryLogLevel) -> Self {
        Self {
            level,
            ..self.clone()
        }
    }

    pub fn level(&self) -> QueryLogLevel {
        self.level
    }

    pub fn slow_threshold(&self) -> Duration {
        self.slow_threshold
    }

    fn logger_for<'a>(&'a self, context: Option<&'a RequestContext>) -> &'a Logger {
        context.map_or(&self.logger, RequestContext::logger)
    }

    pub fn info(&self, context: Option<&RequestContext>, message: &str, data: impl fmt::Debug) {
        if self.level >= QueryLogLevel::Info {
            emit!(self.logger_for(context), INFO, { data = ?data, }, "{}", message);
        }
    }

    pub fn warn(&self, context: Option<&RequestContext>, message: &str, data: impl fmt::Debug) {
        if self.level >= QueryLogLevel::Warn {
            emit!(self.logger_for(context), WARN, { data = ?data, }, "{}", message);
        }
    }

    pub fn error(&self, context: Option<&RequestContext>, message: &str, data: impl fmt::Debug) {
        if self.level >= QueryLogLevel::Error {
            emit!(self.logger_for(context), ERROR, { data = ?data, }, "{}", message);
        }
    }

    /// Records one executed statement.
    ///
    /// `statement` yields the SQL text and affected row count; it is not
    /// called when the logger is silent.
    pub fn trace<F>(
        &self,
        context: Option<&RequestContext>,
        elapsed: Duration,
        statement: F,
        error: Option<&dyn QueryError>,
    ) where
        F: FnOnce() -> (String, i64),
    {
        if self.level == QueryLogLevel::Silent {
            return;
        }
        let (sql, rows) = statement();
        let logger = self.logger_for(context);
        let latency_ms = millis(elapsed);

        match error.filter(|err| !err.is_record_not_found()) {
            Some(err) => emit!(logger, ERROR, {
                latency_ms = latency_ms,
                rows = rows,
                sql = %sql,
                error = %err,
            }, "Query trace"),
            None if elapsed > self.slow_threshold => emit!(logger, WARN, {
                latency_ms = latency_ms,
                rows = rows,
                sql = %sql,
            }, "Query trace (slow query)"),
            None => emit!(logger, INFO, {
                latency_ms = latency_ms,
                rows = rows,
                sql = %sql,
            }, "Query trace"),
        }
    }
}

/// Logs query results within a byte budget.
#[derive(Clone, Debug)]
pub struct ResultLogger {
    logger: Logger,
    enabled: bool,
    serializer: BoundedSerializer,
}

impl ResultLogger {
    pub fn new(logger: Logger, config: &QueryConfig) -> Self {
        Self {
            logger,
            enabled: config.log_query_result,
            serializer: BoundedSerializer::new(config.result_budget())
                .with_identity_field(config.identity_field.as_str())
                .with_non_object_policy(config.non_object_policy),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Serializes `result` as it would be logged.
    ///
    /// # Errors
    ///
    /// Fails when `result` cannot be serialized to JSON.
    pub fn render<T: Serialize + ?Sized>(&self, result: &T) -> Result<Vec<u8>> {
        self.serializer.serialize(result)
    }

    /// Records `result` at DEBUG. Does nothing when result logging is disabled.
    pub fn log_result<T: Serialize + ?Sized>(&self, context: Option<&RequestContext>, result: &T) {
        if !self.enabled {
            return;
        }
        let logger = context.map_or(&self.logger, RequestContext::logger);
        match self.render(result) {
            Ok(bytes) => emit!(logger, DEBUG, {
                result = %String::from_utf8_lossy(&bytes),
            }, "Query result"),
            Err(err) => emit!(logger, WARN, { error = %err, }, "Failed to serialize query result"),
        }
    }
}
