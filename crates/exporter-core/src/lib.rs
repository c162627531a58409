//! Exporter Core - Common infrastructure for document export runs
//!
//! This crate provides the bounded job executor and the pieces around it:
//! cooperative cancellation, interrupt handling, retries, progress bars,
//! logging, the shared HTTP runtime and the JSON output sink.

pub mod cancel;
pub mod executor;
pub mod http;
pub mod logging;
pub mod pids;
pub mod progress;
pub mod retry;
pub mod shutdown;
pub mod sink;
pub mod work_queue;

// Re-exports for convenience
pub use cancel::CancellationToken;
pub use executor::{JobExecutor, RunError, RunStats};
pub use http::{HttpSettings, SHARED_RUNTIME, http_client};
pub use logging::{IndicatifLogger, init_logging};
pub use pids::load_pids;
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use retry::{RetryPolicy, Retryable, retry_with_backoff};
pub use shutdown::{InterruptFlag, install_interrupt_handler, interrupt_flag, is_interrupted};
pub use sink::{JsonSink, cleanup_tmp_files};
pub use work_queue::WorkQueue;
