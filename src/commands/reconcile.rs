use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::commands::{CommandReport, require_dir};
use crate::store::config::{check_block_size, load_config};
use crate::store::reconcile::{ReconcileOptions, Reconciler, RunSummary};
use crate::store::report::TracingReporter;

#[derive(Debug, Clone, Default)]
pub struct ReconcileArgs {
    pub working_dir: Option<PathBuf>,
    pub archive_dir: Option<PathBuf>,
    pub dry_run: bool,
    pub block_size: Option<usize>,
}

fn summarize(report: &mut CommandReport, summary: &RunSummary) {
    report.detail(format!("dry_run={}", summary.dry_run));
    report.detail(format!("datasets={}", summary.datasets));
    report.detail(format!("datasets_skipped={}", summary.datasets_skipped));
    report.detail(format!("relinked={}", summary.relinked));
    report.detail(format!("deduplicated={}", summary.deduplicated));
    report.detail(format!("already_linked={}", summary.already_linked));
    report.detail(format!("diverged={}", summary.diverged));
    report.detail(format!("awaiting_ingestion={}", summary.awaiting_ingestion));
    report.detail(format!("failed={}", summary.failed));
    report.detail(format!("unreadable_dirs={}", summary.unreadable_dirs));
    report.detail(format!("mutations={}", summary.mutations()));

    if summary.datasets == 0 {
        report.issue("no dataset directories found in working tree");
    }
    if summary.datasets_skipped > 0 {
        report.issue(format!(
            "{} dataset(s) skipped: archive state missing or invalid",
            summary.datasets_skipped
        ));
    }
    if summary.unreadable_dirs > 0 {
        report.issue(format!(
            "{} director(ies) in the working tree could not be read",
            summary.unreadable_dirs
        ));
    }
    if summary.failed > 0 {
        report.issue(format!(
            "{} version(s) failed; inspect the log before re-running",
            summary.failed
        ));
    }
}

pub fn run(args: &ReconcileArgs) -> Result<CommandReport> {
    let cfg = load_config()?;
    let working_dir = require_dir(
        args.working_dir.clone(),
        cfg.paths.working_dir,
        "working tree",
        "ARCHLINK_WORKING_DIR",
    )?;
    let archive_dir = require_dir(
        args.archive_dir.clone(),
        cfg.paths.archive_dir,
        "archive tree",
        "ARCHLINK_ARCHIVE_DIR",
    )?;

    let block_size = args.block_size.unwrap_or(cfg.verify.block_size);
    check_block_size(block_size).context("invalid --block-size")?;
    let options = ReconcileOptions {
        block_size,
        dry_run: args.dry_run || cfg.reconcile.dry_run,
    };

    let mut report = CommandReport::new("reconcile");
    let reporter = TracingReporter;
    let reconciler = Reconciler::new(&working_dir, &archive_dir, options, &reporter)
        .context("cannot start reconciliation")?;

    report.detail(format!("working_dir={}", reconciler.working_base().display()));
    report.detail(format!("archive_dir={}", reconciler.archive_base().display()));

    let span = tracing::info_span!("reconcile", dry_run = options.dry_run);
    let summary = span.in_scope(|| reconciler.run()).with_context(|| {
        format!(
            "failed to scan working tree {}",
            reconciler.working_base().display()
        )
    })?;

    summarize(&mut report, &summary);
    Ok(report)
}
