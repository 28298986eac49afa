//! Integration tests for configuration files and sink setup.
//!
//! These tests verify that:
//! - a TOML file on disk loads into a validated `Config`
//! - missing or invalid files surface as configuration errors
//! - `init_logging` writes JSON records to the configured file sink

use std::fs;

use smartlog::{
    ByteBudget, Config, Error, Logger, NonObjectPolicy, QueryLogger, RedactionFailure,
    init_logging,
};
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
service_name = "orders"
env = "staging"
redact_keys = ["password", "Authorization"]
skip_paths = ["/healthz", "/metrics"]
on_redaction_failure = "omit"

[log]
directory = "/var/log/orders"
file_name = "orders.log"
level = "debug"
console_level = "warn"
rotation = "hourly"
max_files = 3
console = false

[query]
level = "error"
slow_query_threshold_ms = 500
log_query_result = true
log_result_max_bytes = 2048
identity_field = "uuid"
non_object_policy = "sentinel"
"#;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("smartlog.toml");
    fs::write(&path, content).unwrap();
    path
}

mod loading {
    use super::*;

    #[test]
    fn loads_every_section_from_disk() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(write_config(&dir, FULL_CONFIG)).unwrap();

        assert_eq!(config.service_name, "orders");
        assert_eq!(config.env, "staging");
        assert_eq!(config.skip_paths, ["/healthz", "/metrics"]);
        assert!(config.redact_keys().matches("authorization"));
        assert_eq!(config.on_redaction_failure, RedactionFailure::Omit);

        assert_eq!(config.log.directory.to_str(), Some("/var/log/orders"));
        assert_eq!(config.log.file_name, "orders.log");
        assert_eq!(config.log.rotation, "hourly");
        assert_eq!(config.log.max_files, 3);
        assert!(!config.log.console);

        assert_eq!(config.query.level, "error");
        assert_eq!(config.query.slow_query_threshold_ms, 500);
        assert!(config.query.log_query_result);
        assert_eq!(config.result_budget(), ByteBudget::Bytes(2048));
        assert_eq!(config.query.identity_field, "uuid");
        assert_eq!(config.query.non_object_policy, NonObjectPolicy::Sentinel);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "env = \"prod\"\n[log]\nlevel = \"warn\"");
        let config = Config::load(path).unwrap();
        assert_eq!(config.env, "prod");
        assert_eq!(config.service_name, "app");
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.log.file_name, "app.log");
        assert_eq!(config.query.level, "info");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "service_name = [");
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn unknown_policy_names_are_rejected() {
        assert!(Config::from_toml_str("on_redaction_failure = \"drop\"").is_err());
        assert!(Config::from_toml_str("[query]\nnon_object_policy = \"fold\"").is_err());
    }

    #[test]
    fn validate_checks_programmatic_configs() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        config.log.console_level = "chatty".to_string();
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }
}

mod sinks {
    use super::*;

    #[test]
    fn writes_json_records_to_the_file_sink() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::from_toml_str(concat!(
            "service_name = \"orders\"\n",
            "[log]\nrotation = \"never\"\nconsole = false\n",
        ))
        .unwrap();
        config.log.directory = dir.path().join("logs");

        let guard = init_logging(&config).unwrap();
        let query = QueryLogger::new(Logger::from_config(&config), &config.query);
        query.info(None, "connected", "primary");

        // The subscriber is global: a second install must fail.
        assert!(matches!(init_logging(&config), Err(Error::Logging { .. })));
        drop(guard);

        let written = fs::read_to_string(config.log.directory.join("app.log")).unwrap();
        let first = written.lines().next().unwrap();
        let record: serde_json::Value = serde_json::from_str(first).unwrap();
        assert_eq!(record["level"], "INFO");
        assert_eq!(record["fields"]["message"], "connected");
        assert_eq!(record["fields"]["service"], "orders");
        assert_eq!(record["fields"]["env"], "development");
    }
}
