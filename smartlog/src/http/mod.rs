//! Exchange logging for HTTP servers and clients.
//!
//! Framework glue captures a request or response into [`HttpRequest`] /
//! [`HttpResponse`] and calls the server or client logger. Headers and bodies
//! pass through the redaction engine before anything is recorded.
//!
//! - **`server`**: [`ServerLogging`], one record when a request arrives and one
//!   when its response leaves
//! - **`client`**: [`ClientLogging`], records around an outgoing call, with the
//!   log id propagated in `X-Request-ID`

mod client;
mod server;

use std::{borrow::Cow, fmt, time::Duration};

pub use client::ClientLogging;
pub use server::{ServerExchange, ServerLogging};

use crate::{
    config::RedactionFailure,
    logger::{Logger, emit},
    redaction::{HeaderMap, RedactKeys, redact_headers, redact_json_body},
};

/// A captured request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    /// Request target: a path with optional query for servers, a full URL for clients.
    pub target: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// The target without its query string or fragment.
    pub fn path(&self) -> &str {
        self.target
            .split(['?', '#'])
            .next()
            .unwrap_or(self.target.as_str())
    }
}

/// A captured response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new(200)
    }
}

/// A body as it appears in a record: redacted, passed through, or absent.
///
/// Displays as UTF-8 text (lossy for binary payloads), or nothing when absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggedBody<'a>(Option<Cow<'a, [u8]>>);

impl<'a> LoggedBody<'a> {
    pub fn absent() -> Self {
        Self(None)
    }

    pub fn new(bytes: Cow<'a, [u8]>) -> Self {
        Self(Some(bytes))
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.0.as_deref()
    }
}

impl fmt::Display for LoggedBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
            None => Ok(()),
        }
    }
}

/// Redaction settings shared by the server and client loggers.
#[derive(Clone, Debug, Default)]
struct ExchangeRedactor {
    keys: RedactKeys,
    on_failure: RedactionFailure,
}

impl ExchangeRedactor {
    fn headers(&self, headers: &HeaderMap) -> String {
        headers_json(&redact_headers(headers, &self.keys))
    }

    fn body<'a>(&self, logger: &Logger, body: &'a [u8]) -> LoggedBody<'a> {
        if body.is_empty() {
            return LoggedBody::absent();
        }
        match redact_json_body(body, &self.keys) {
            Ok(redacted) => LoggedBody::new(redacted),
            Err(err) => {
                emit!(logger, WARN, { error = %err, }, "Failed to re-encode redacted body");
                match self.on_failure {
                    RedactionFailure::PassThrough => LoggedBody::new(Cow::Borrowed(body)),
                    RedactionFailure::Omit => LoggedBody::absent(),
                }
            }
        }
    }
}

fn headers_json(headers: &HeaderMap) -> String {
    serde_json::to_string(headers)
        .unwrap_or_else(|err| format!("Failed to serialize headers: {err}"))
}

/// Whole milliseconds, saturating.
pub(crate) fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
