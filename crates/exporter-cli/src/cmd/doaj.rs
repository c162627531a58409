//! DOAJ subcommand - export articles as DOAJ bibjson

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use exporter_articlemeta::{AmClient, Connection};
use exporter_core::{SharedProgress, install_interrupt_handler, load_pids};

use crate::config::Config;

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("input").required(true).args(["pid", "pids"])))]
pub struct DoajArgs {
    /// Collection the documents are published in (e.g. scl)
    #[arg(long)]
    pub collection: String,

    /// PID of a single document
    #[arg(long)]
    pub pid: Option<String>,

    /// File with one document PID per line
    #[arg(long, value_name = "FILE")]
    pub pids: Option<PathBuf>,

    /// ArticleMeta transport (restful or thrift)
    #[arg(long)]
    pub connection: Option<Connection>,

    /// ArticleMeta endpoint (URL for restful, host[:port] for thrift)
    #[arg(long)]
    pub domain: Option<String>,

    /// Number of parallel workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl DoajArgs {
    fn pid_list(&self) -> Result<Vec<String>> {
        match (&self.pid, &self.pids) {
            (Some(pid), _) => Ok(vec![pid.trim().to_string()]),
            (None, Some(path)) => load_pids(path),
            (None, None) => anyhow::bail!("either --pid or --pids is required"),
        }
    }
}

pub fn run(args: DoajArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let pids = args.pid_list()?;
    if pids.is_empty() {
        log::warn!("No PIDs to export");
    }

    let connection = args.connection.unwrap_or(config.articlemeta.connection);
    let domain = args.domain.as_deref().or(config.articlemeta.domain.as_deref());
    let client = AmClient::new(connection, domain, &config.http.settings())
        .context("Failed to create ArticleMeta client")?;
    log::info!(
        "ArticleMeta: {} ({})",
        client.endpoint(),
        client.connection().name()
    );

    let doaj_config = exporter_doaj::Config {
        collection: args.collection,
        pids,
        output_dir: args
            .output
            .unwrap_or_else(|| config.output.default_dir.clone()),
        workers: args.workers.unwrap_or(config.export.workers),
        retry: config.export.retry_policy(),
    };

    let interrupt = install_interrupt_handler().context("Failed to install signal handlers")?;
    exporter_doaj::run(&doaj_config, &client, progress, Some(interrupt))?;
    Ok(())
}
