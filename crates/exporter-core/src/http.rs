//! Shared async runtime and HTTP client construction.
//!
//! Workers are plain OS threads; HTTP calls run on a small shared tokio
//! runtime and are bridged back with `block_on`.

use std::sync::LazyLock;
use std::time::Duration;

/// Connect and whole-request timeouts for HTTP clients
#[derive(Debug, Clone, Copy)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("exporter-http")
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Build a pooled async client with the given timeouts.
///
/// A request timeout bounds how long a hung fetch can hold a worker slot.
pub fn http_client(settings: &HttpSettings) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .pool_max_idle_per_host(8)
        .build()
}
