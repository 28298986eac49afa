//! Configuration loaded from TOML.
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! service_name = "orders"
//! env = "production"
//! redact_keys = ["password", "authorization", "api_key"]
//! skip_paths = ["/healthz"]
//!
//! [log]
//! directory = "/var/log/orders"
//! rotation = "hourly"
//!
//! [query]
//! log_query_result = true
//! log_result_max_bytes = 2048
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    bounded::{ByteBudget, DEFAULT_IDENTITY_FIELD, NonObjectPolicy},
    error::{Error, Result},
    redaction::RedactKeys,
};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const VALID_ROTATIONS: &[&str] = &["minutely", "hourly", "daily", "never"];
const VALID_QUERY_LEVELS: &[&str] = &["silent", "error", "warn", "info"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Attached to every record as `service`.
    pub service_name: String,
    /// Attached to every record as `env`.
    pub env: String,
    pub log: LogConfig,
    /// Field and header names whose values are replaced before logging.
    pub redact_keys: Vec<String>,
    /// Request paths the server logger ignores (exact match).
    pub skip_paths: Vec<String>,
    /// What to log when a redacted body cannot be re-encoded.
    pub on_redaction_failure: RedactionFailure,
    pub query: QueryConfig,
}

/// Log sink configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub directory: PathBuf,
    pub file_name: String,
    /// Threshold for the JSON file sink.
    pub level: String,
    /// Threshold for the console sink.
    pub console_level: String,
    /// File rotation period: `minutely`, `hourly`, `daily` or `never`.
    pub rotation: String,
    /// Rotated files to keep. `0` keeps all of them.
    pub max_files: usize,
    /// Mirror records to stdout.
    pub console: bool,
}

/// Database query logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// `silent`, `error`, `warn` or `info`.
    pub level: String,
    /// Queries slower than this are logged at WARN. Non-positive values use 200ms.
    pub slow_query_threshold_ms: i64,
    pub log_query_result: bool,
    /// Byte limit for logged results. Non-positive means unbounded.
    pub log_result_max_bytes: i64,
    /// Field kept first, and always, when a result is truncated.
    pub identity_field: String,
    pub non_object_policy: NonObjectPolicy,
}

/// Behavior when a redacted body fails to re-encode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionFailure {
    /// Log the original bytes. Keeps the record but may expose secrets.
    #[default]
    PassThrough,
    /// Leave the body out of the record.
    Omit,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "app".to_string(),
            env: "development".to_string(),
            log: LogConfig::default(),
            redact_keys: Vec::new(),
            skip_paths: Vec::new(),
            on_redaction_failure: RedactionFailure::default(),
            query: QueryConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_name: "app.log".to_string(),
            level: "info".to_string(),
            console_level: "debug".to_string(),
            rotation: "daily".to_string(),
            max_files: 7,
            console: true,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            slow_query_threshold_ms: 200,
            log_query_result: false,
            log_result_max_bytes: 0,
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
            non_object_policy: NonObjectPolicy::default(),
        }
    }
}

impl Config {
    /// Loads and validates a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::parse(&content).map_err(|e| Error::Config {
            message: format!("Invalid config file '{}': {}", path.display(), e),
        })
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::parse(content).map_err(|message| Error::Config { message })
    }

    fn parse(content: &str) -> Result<Self, String> {
        let config: Config = toml::from_str(content).map_err(|e| e.to_string())?;
        config.check()?;
        Ok(config)
    }

    /// Checks level and rotation names.
    pub fn validate(&self) -> Result<()> {
        self.check().map_err(|message| Error::Config { message })
    }

    fn check(&self) -> Result<(), String> {
        check_name("log level", &self.log.level.to_lowercase(), VALID_LOG_LEVELS)?;
        check_name(
            "console log level",
            &self.log.console_level.to_lowercase(),
            VALID_LOG_LEVELS,
        )?;
        check_name("log rotation", &self.log.rotation, VALID_ROTATIONS)?;
        check_name("query log level", &self.query.level, VALID_QUERY_LEVELS)?;
        Ok(())
    }

    /// Normalized set of keys to redact.
    pub fn redact_keys(&self) -> RedactKeys {
        RedactKeys::new(&self.redact_keys)
    }

    /// Budget for logged query results.
    pub fn result_budget(&self) -> ByteBudget {
        self.query.result_budget()
    }
}

impl QueryConfig {
    pub fn result_budget(&self) -> ByteBudget {
        ByteBudget::from_limit(self.log_result_max_bytes)
    }
}

fn check_name(what: &str, value: &str, valid: &[&str]) -> Result<(), String> {
    if valid.contains(&value) {
        Ok(())
    } else {
        Err(format!("Invalid {what} '{value}'. Valid values: {valid:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.service_name, "app");
        assert_eq!(config.env, "development");
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.rotation, "daily");
        assert_eq!(config.query.slow_query_threshold_ms, 200);
        assert_eq!(config.query.identity_field, "ID");
        assert_eq!(config.on_redaction_failure, RedactionFailure::PassThrough);
        assert_eq!(config.result_budget(), ByteBudget::Unbounded);
        assert!(config.redact_keys().is_empty());
    }

    #[test]
    fn parses_nested_sections() {
        let config = Config::from_toml_str(
            r#"
            service_name = "orders"
            redact_keys = ["Password", "authorization"]
            on_redaction_failure = "omit"

            [query]
            level = "warn"
            log_result_max_bytes = 70
            non_object_policy = "sentinel"
            "#,
        )
        .unwrap();
        assert_eq!(config.service_name, "orders");
        assert!(config.redact_keys().matches("PASSWORD"));
        assert_eq!(config.on_redaction_failure, RedactionFailure::Omit);
        assert_eq!(config.query.level, "warn");
        assert_eq!(config.result_budget(), ByteBudget::Bytes(70));
        assert_eq!(config.query.non_object_policy, NonObjectPolicy::Sentinel);
    }

    #[test]
    fn rejects_unknown_levels() {
        let err = Config::from_toml_str("[log]\nlevel = \"loud\"").unwrap_err();
        assert!(err.to_string().contains("Invalid log level 'loud'"));

        let err = Config::from_toml_str("[query]\nlevel = \"debug\"").unwrap_err();
        assert!(err.to_string().contains("query log level"));
    }

    #[test]
    fn rejects_unknown_rotation() {
        assert!(Config::from_toml_str("[log]\nrotation = \"weekly\"").is_err());
    }
}
