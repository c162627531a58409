//! DOAJ export run configuration

use std::path::PathBuf;

use exporter_core::RetryPolicy;

/// Runtime configuration for one export run
#[derive(Debug, Clone)]
pub struct Config {
    /// Collection acronym the PIDs belong to (e.g. "scl")
    pub collection: String,
    /// Article PIDs to export
    pub pids: Vec<String>,
    /// Root directory for bibjson files
    pub output_dir: PathBuf,
    /// Concurrent fetches
    pub workers: usize,
    /// Retry budget for transient source failures
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection: String::new(),
            pids: Vec::new(),
            output_dir: PathBuf::from("data"),
            workers: 4,
            retry: RetryPolicy::default(),
        }
    }
}
