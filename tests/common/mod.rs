//! Common test utilities and helpers
//!
//! Shared settings and fixtures for the integration tests.

#![allow(dead_code)]

use drainq::pipeline::PipelineSettings;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Settings that finish in well under a second for small counts
pub fn fast_settings(message_count: usize) -> PipelineSettings {
    PipelineSettings {
        message_count,
        produce_interval: Duration::from_millis(1),
        process_delay: Duration::ZERO,
        drain_timeout: Duration::from_millis(200),
        join_timeout: Duration::from_secs(5),
        poll_interval: Duration::from_millis(10),
        ..Default::default()
    }
}

/// `"Request 1"`, `"Request 2"`, ... for the given range
pub fn requests(range: std::ops::RangeInclusive<usize>) -> Vec<String> {
    range.map(|n| format!("Request {}", n)).collect()
}

/// A config file with the given contents, deleted on drop
pub fn config_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp config file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp config file");
    file
}
