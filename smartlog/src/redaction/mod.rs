//! Key-based redaction of bodies and headers.
//!
//! - **`keys`**: the normalized key set (`RedactKeys`) and the placeholder
//! - **`document`**: recursive walk over parsed JSON (`redact_document`) and raw
//!   bodies (`redact_json_body`)
//! - **`headers`**: the multi-valued `HeaderMap` and `redact_headers`
//!
//! Keys are matched by exact name, ignoring case. Values are replaced by the
//! constant placeholder; nothing inspects the values themselves.

mod document;
mod headers;
mod keys;

pub use document::{redact_document, redact_json_body, redact_object};
pub use headers::{HeaderMap, redact_headers};
pub use keys::{REDACTED_PLACEHOLDER, RedactKeys};
