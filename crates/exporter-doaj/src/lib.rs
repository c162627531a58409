//! Exporter DOAJ - SciELO articles to DOAJ bibjson
//!
//! Fetches each requested article from ArticleMeta, maps it to a DOAJ
//! bibjson document and writes it to `<output>/<collection>/<pid>.json`.
//!
//! # Example
//!
//! ```ignore
//! use exporter_doaj::{Config, run};
//!
//! let config = Config {
//!     collection: "scl".into(),
//!     pids: vec!["S0100-19651998000200002".into()],
//!     ..Default::default()
//! };
//!
//! let summary = run(&config, &client, &progress, None)?;
//! println!("Exported {} documents", summary.exported);
//! ```

pub mod bibjson;
pub mod config;
pub mod runner;
pub mod worker;

// Re-exports
pub use bibjson::{BibjsonError, DoajDocument};
pub use config::Config;
pub use runner::{Summary, run};
pub use worker::{ExportError, ExportJob, export_document};
