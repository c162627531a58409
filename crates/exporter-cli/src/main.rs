//! exporter - Export SciELO documents to indexing databases
//!
//! Fetches articles from ArticleMeta and writes them in the format expected
//! by the target index (currently DOAJ bibjson).

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use exporter_core::RunError;

mod cmd;
mod config;

use config::Config;

/// Conventional exit status after SIGINT
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "exporter")]
#[command(about = "Export SciELO documents to indexing databases")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    loglevel: log::LevelFilter,

    /// Config file path (default: ./exporter.toml or ~/.config/exporter/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Export documents to DOAJ
    Doaj(cmd::doaj::DoajArgs),
    /// Show current configuration
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(exporter_core::ProgressContext::new());
    let multi = progress.is_tty().then(|| progress.multi());
    if let Err(e) = exporter_core::init_logging(cli.loglevel, multi) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(cli, &progress) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if matches!(e.downcast_ref::<RunError>(), Some(RunError::Interrupted)) => {
            log::warn!("Export interrupted");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, progress: &exporter_core::SharedProgress) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Doaj(args) => cmd::doaj::run(args, &config, progress),
        Command::Config => {
            print_config(&config);
            Ok(())
        }
    }
}

fn print_config(config: &Config) {
    use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec![
        "Output directory",
        &config.output.default_dir.display().to_string(),
    ]);
    table.add_row(vec![
        "ArticleMeta connection",
        config.articlemeta.connection.name(),
    ]);
    table.add_row(vec![
        "ArticleMeta domain",
        config.articlemeta.domain.as_deref().unwrap_or("default"),
    ]);
    table.add_row(vec![
        "Timeouts",
        &format!(
            "connect {}s, request {}s",
            config.http.connect_timeout, config.http.request_timeout
        ),
    ]);
    table.add_row(vec!["Workers", &config.export.workers.to_string()]);
    table.add_row(vec![
        "Max retries",
        &format!(
            "{} (base delay {}ms)",
            config.export.max_retries, config.export.retry_base_ms
        ),
    ]);

    eprintln!("\n{table}");
}
