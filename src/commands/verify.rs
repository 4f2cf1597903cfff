use crate::HashcheckContext;
use crate::error::EXIT_CHANGES_FOUND;
use crate::output;
use crate::reconcile::{ReconciliationReport, Reconciler};
use crate::scanner::probe::format_modified;
use crate::scanner::{ScanMode, Scanner};
use crate::storage::ChangeKind;
use crate::storage::manifest;
use crate::utils::format_size;
use crate::utils::hash::hash_file_streaming;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use tracing::{Level, span};

/// Flags for the `verify` command. Each switch is combined with the matching
/// configuration value; either one enables it.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyOptions {
    /// Digest every file instead of trusting matching metadata
    pub full: bool,
    /// Abort on the first unreadable file
    pub strict: bool,
    /// One status letter and path per line
    pub short: bool,
    /// Report changes through the exit status
    pub fail_on_change: bool,
    /// Worker count override
    pub jobs: Option<usize>,
}

/// What `verify` found.
#[derive(Debug)]
pub struct VerifyOutcome {
    /// Classification of every path
    pub report: ReconciliationReport,
    /// Entries that could not be read during the scan
    pub unreadable: usize,
    /// Whether changes should fail the command
    pub fail_on_change: bool,
}

impl VerifyOutcome {
    /// Process exit status for this outcome.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.fail_on_change && !self.report.is_clean() {
            EXIT_CHANGES_FOUND
        } else {
            0
        }
    }
}

/// Compares `root` against the manifest at `manifest_path` and prints the
/// classification of every changed path.
///
/// The manifest is loaded before anything is scanned, so an unsupported
/// version fails without touching the tree.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded, the root cannot be read,
/// a strict scan hits an unreadable file, or an on-demand digest fails.
pub fn execute(
    ctx: &HashcheckContext,
    root: &Path,
    manifest_path: &Path,
    opts: VerifyOptions,
) -> Result<VerifyOutcome> {
    let baseline = manifest::load(manifest_path)?;
    if let Some(warning) = baseline.compatibility_warning() {
        output::warning(&warning.to_string());
    }

    let mode = if opts.full || ctx.config.verify.full {
        ScanMode::Full
    } else {
        ScanMode::Quick
    };
    let span = span!(Level::INFO, "verify", root = %root.display(), mode = %mode);
    let _guard = span.enter();

    let options = super::scan_options(ctx, opts.strict, opts.jobs)?;
    let chunk_size = options.chunk_size;
    let title = match mode {
        ScanMode::Full => "Hashing files",
        ScanMode::Quick => "Checking files",
    };

    let mut progress = None;
    let scan = Scanner::new(options)
        .scan_with_progress(root, mode, |done, total, bytes| {
            super::track_progress(&mut progress, title, done, total, bytes);
        })
        .with_context(|| format!("Verification of {} failed", root.display()))?;
    if let Some(bar) = progress {
        bar.finish();
    }

    let report = Reconciler::new(chunk_size).reconcile_with(&scan.snapshot, &baseline, |record| {
        output::verbose(&format!(
            "Hashing file of size: {} ({}, modified {})",
            format_size(record.size.unwrap_or(0)),
            record.path.display(),
            record.modified.map_or_else(|| "unknown".to_string(), format_modified)
        ));
        hash_file_streaming(&record.path, chunk_size)
    })?;

    // Unreadable paths are absent from the snapshot and stay reported as deleted.
    for failure in &scan.failures {
        output::warning(&failure.to_string());
    }
    if report.metadata_only() > 0 {
        output::warning(&format!(
            "{} files were compared by size and modification time only; the manifest has no digests for them",
            report.metadata_only()
        ));
    }

    print_report(&report, opts.short);

    Ok(VerifyOutcome {
        report,
        unreadable: scan.failures.len(),
        fail_on_change: opts.fail_on_change || ctx.config.verify.fail_on_change,
    })
}

fn print_report(report: &ReconciliationReport, short: bool) {
    if short {
        for (path, kind) in report.changes() {
            output::change(kind, path, true);
        }
        return;
    }

    print_group(report, ChangeKind::Modified, "Modified files:");
    print_group(report, ChangeKind::New, "New files:");
    print_group(report, ChangeKind::Deleted, "Deleted files:");

    println!("{} files unchanged", report.unchanged_count());
    if report.is_clean() {
        output::success("No changes detected");
    } else if report.rehashed() > 0 {
        output::info(&format!(
            "{} files were digested to confirm a metadata change",
            report.rehashed()
        ));
    }
}

fn print_group(report: &ReconciliationReport, kind: ChangeKind, heading: &str) {
    let paths: Vec<&Path> = report
        .entries()
        .filter(|(_, k)| *k == kind)
        .map(|(path, _)| path)
        .collect();
    if paths.is_empty() {
        return;
    }

    println!("{}", heading.bold());
    for path in paths {
        output::change(kind, path, false);
    }
    println!();
}
