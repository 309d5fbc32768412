//! Test Helper Utilities
//!
//! Shared utilities for testing trust-client

#![allow(dead_code)]

pub mod mock_server;
pub mod observer;

pub use mock_server::{unused_base_url, MockReply, MockServer};
pub use observer::RecordingObserver;

use std::time::Duration;
use trust_client::ClientConfig;

/// Initialize a test subscriber (ignored if another test already did)
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trust_client=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Config pointed at `base_url` with short delays suitable for tests
pub fn test_config(base_url: &str) -> ClientConfig {
    ClientConfig::new("test-api-key")
        .with_base_url(base_url)
        .with_retry_base_delay(Duration::from_millis(50))
        .with_timeout(Duration::from_secs(5))
        .with_rate_limit_jitter(Duration::ZERO)
}
