//! Correlation ids and the request-scoped context.
//!
//! A request's log id travels in the `X-Request-ID` header. The server logger
//! reuses an incoming id or generates one, and hands handlers a
//! [`RequestContext`] whose logger stamps that id on every record. Passing the
//! context to the client and query loggers keeps downstream records on the
//! same id.

use std::fmt;

use uuid::Uuid;

use crate::{logger::Logger, redaction::HeaderMap};

/// Header carrying the log id between services.
pub const HEADER_LOG_ID: &str = "X-Request-ID";

/// Correlation id of one request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LogId(String);

impl LogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random (v4 UUID) id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id from the `X-Request-ID` header, if present and non-empty.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(HEADER_LOG_ID)
            .filter(|id| !id.is_empty())
            .map(Self::new)
    }

    pub fn from_headers_or_generate(headers: &HeaderMap) -> Self {
        Self::from_headers(headers).unwrap_or_else(Self::generate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request-scoped state: the log id and a logger bound to it.
#[derive(Clone, Debug)]
pub struct RequestContext {
    log_id: LogId,
    logger: Logger,
}

impl RequestContext {
    pub fn new(base: &Logger, log_id: LogId) -> Self {
        Self {
            logger: base.with_log_id(&log_id),
            log_id,
        }
    }

    pub fn log_id(&self) -> &LogId {
        &self.log_id
    }

    /// Logger whose records carry this request's log id.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}
