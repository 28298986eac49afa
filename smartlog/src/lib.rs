//! Structured HTTP and query logging with redaction built in.
//!
//! This crate separates:
//! - **The engine**: key-based redaction of JSON bodies and header maps, and a
//!   size-bounded serializer for large results.
//! - **The loggers**: server and client exchange logging, query tracing and
//!   query-result logging, all emitting `tracing` records that have already
//!   passed through the engine.
//!
//! What this crate does:
//! - replaces the values of configured keys with `"[REDACTED]"`, wherever they
//!   appear in a body or in headers
//! - keeps logged query results within a byte budget while staying valid JSON
//! - correlates records through the `X-Request-ID` log id
//! - builds the log sinks (rotating JSON file, console) from configuration
//!
//! What it does not do:
//! - detect sensitive values by content; keys are matched by name only
//! - hash or encrypt redacted values
//! - bind to a specific HTTP framework or database driver
//!
//! ```rust
//! use smartlog::{RedactKeys, redact_json_body};
//!
//! let keys = RedactKeys::new(["password"]);
//! let body = redact_json_body(br#"{"user":"jules","password":"hunter2"}"#, &keys).unwrap();
//! assert_eq!(&*body, br#"{"password":"[REDACTED]","user":"jules"}"#);
//! ```

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod bounded;
mod config;
mod context;
mod error;
mod http;
mod logger;
mod query;
mod redaction;
#[cfg(feature = "slog")]
pub mod slog;

pub use bounded::{
    BoundedSerializer, ByteBudget, DEFAULT_IDENTITY_FIELD, NonObjectPolicy, bounded_serialize,
};
pub use config::{Config, LogConfig, QueryConfig, RedactionFailure};
pub use context::{HEADER_LOG_ID, LogId, RequestContext};
pub use error::{Error, Result};
pub use http::{ClientLogging, HttpRequest, HttpResponse, LoggedBody, ServerExchange, ServerLogging};
pub use logger::{Logger, LoggingGuard, init_logging};
pub use query::{
    DEFAULT_SLOW_QUERY_THRESHOLD, QueryError, QueryLogLevel, QueryLogger, ResultLogger,
};
pub use redaction::{
    HeaderMap, REDACTED_PLACEHOLDER, RedactKeys, redact_document, redact_headers,
    redact_json_body, redact_object,
};
