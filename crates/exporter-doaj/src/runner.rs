//! Main runner for a DOAJ export

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use exporter_articlemeta::DocumentSource;
use exporter_core::{
    InterruptFlag, JobExecutor, JsonSink, ProgressContext, cleanup_tmp_files, fmt_num,
};

use crate::config::Config;
use crate::worker::{ExportJob, export_document};

/// Export run summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub exported: usize,
    pub failed: usize,
    pub failed_pids: Vec<String>,
    pub elapsed: Duration,
}

impl Summary {
    pub fn log(&self) {
        log::info!("=== DOAJ Export Summary ===");
        log::info!(
            "Documents: {}/{} exported ({} failed)",
            self.exported,
            self.total,
            self.failed
        );
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
        if !self.failed_pids.is_empty() {
            log::info!("Failed PIDs: {}", self.failed_pids.join(", "));
        }
    }

    /// Format summary table as a string.
    pub fn format_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("DOAJ Export")
                    .fg(Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Value").fg(Color::Cyan),
            ]);
        table.add_row(vec![Cell::new("Documents"), Cell::new(fmt_num(self.total))]);
        table.add_row(vec![
            Cell::new("Exported"),
            Cell::new(fmt_num(self.exported)).fg(Color::Green),
        ]);
        let failed = Cell::new(fmt_num(self.failed));
        table.add_row(vec![
            Cell::new("Failed"),
            if self.failed > 0 { failed.fg(Color::Red) } else { failed },
        ]);
        table.add_row(vec![
            Cell::new("Elapsed"),
            Cell::new(format!("{:.1}s", self.elapsed.as_secs_f64())),
        ]);
        table.to_string()
    }
}

/// Export every PID in `config` from `source` to DOAJ bibjson files.
///
/// Per-document failures are logged and counted; the run only errors out on
/// setup failures, an interrupt, or a defect in the run itself (the latter two
/// carry an [`exporter_core::RunError`]).
pub fn run(
    config: &Config,
    source: &dyn DocumentSource,
    progress: &ProgressContext,
    interrupt: Option<InterruptFlag>,
) -> Result<Summary> {
    let start = Instant::now();

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;
    let removed = cleanup_tmp_files(&config.output_dir)
        .context("Failed to clean up stale temporary files")?;
    if removed > 0 {
        log::info!("Removed {removed} stale .tmp files");
    }

    let sink = JsonSink::new(&config.output_dir);
    let jobs: Vec<ExportJob> = config
        .pids
        .iter()
        .map(|pid| ExportJob::new(&config.collection, pid))
        .collect();
    let total = jobs.len();
    let workers = config.workers.max(1);
    log::info!(
        "Exporting {} documents from {} with {} workers",
        fmt_num(total),
        config.collection,
        workers
    );

    let pb = progress.batch_bar("doaj", total);
    let mut exported = 0;
    let mut failed_pids = Vec::new();

    let mut executor = JobExecutor::new(|job: &ExportJob, token| {
        export_document(source, &sink, job, token, &config.retry)
    })
    .max_workers(workers)
    .on_success(|written| {
        if written.is_some() {
            exported += 1;
        }
        Ok(())
    })
    .on_failure(|e, job| {
        log::error!("Could not export document '{}' ({}): {e}", job.pid, e.kind());
        failed_pids.push(job.pid.clone());
        Ok(())
    })
    .on_progress(|| pb.inc(1));
    if let Some(flag) = interrupt {
        executor = executor.interrupt_flag(flag);
    }

    let outcome = executor.run(jobs);
    drop(executor);
    if let Err(e) = outcome {
        pb.abandon();
        return Err(e.into());
    }
    pb.finish_and_clear();

    let summary = Summary {
        total,
        exported,
        failed: failed_pids.len(),
        failed_pids,
        elapsed: start.elapsed(),
    };
    summary.log();
    if progress.is_tty() {
        progress.println(summary.format_table());
    }
    Ok(summary)
}
