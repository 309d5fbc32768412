//! Unit tests for client configuration loading
//!
//! Covers TOML parsing with defaults, file loading and validation failures.

use std::time::Duration;
use tempfile::TempDir;
use trust_common::config::{ClientConfig, DEFAULT_BASE_URL};
use trust_common::Error;

#[test]
fn test_minimal_toml_fills_defaults() {
    let config = ClientConfig::from_toml_str(r#"api_key = "abc""#).unwrap();

    assert_eq!(config.api_key, "abc");
    assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.retry_base_delay(), Duration::from_millis(1000));
    assert_eq!(config.timeout(), Duration::from_secs(30));
    assert_eq!(config.requests_per_second, 10);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_full_toml_overrides() {
    let content = r#"
        api_key = "abc"
        base_url = "http://127.0.0.1:9000/"
        max_retries = 1
        retry_base_delay_ms = 50
        timeout_ms = 2000
        requests_per_second = 2
        rate_limit_jitter_ms = 0

        [logging]
        level = "trust_client=debug"
    "#;

    let config = ClientConfig::from_toml_str(content).unwrap();
    assert_eq!(config.base_url(), "http://127.0.0.1:9000");
    assert_eq!(config.max_retries, 1);
    assert_eq!(config.retry_base_delay(), Duration::from_millis(50));
    assert_eq!(config.timeout(), Duration::from_secs(2));
    assert_eq!(config.requests_per_second, 2);
    assert_eq!(config.rate_limit_jitter(), Duration::ZERO);
    assert_eq!(config.logging.level, "trust_client=debug");
}

#[test]
fn test_missing_api_key_is_config_error() {
    let result = ClientConfig::from_toml_str("max_retries = 2");
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_blank_api_key_rejected() {
    let result = ClientConfig::from_toml_str(r#"api_key = "   ""#);
    assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("api_key")));
}

#[test]
fn test_load_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("trust.toml");
    std::fs::write(&path, "api_key = \"file-key\"\ntimeout_ms = 500\n").unwrap();

    let config = ClientConfig::load(&path).unwrap();
    assert_eq!(config.api_key, "file-key");
    assert_eq!(config.timeout(), Duration::from_millis(500));
}

#[test]
fn test_load_missing_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = ClientConfig::load(&temp_dir.path().join("absent.toml"));
    assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("Read TOML failed")));
}
