//! Command implementations.
//!
//! Each command takes a [`HashcheckContext`] plus its own options and returns
//! `anyhow::Result`; library errors keep their [`crate::error::HashcheckError`]
//! type underneath the added context so the binary can pick an exit status.

/// `capture`: scan a tree and write its manifest
pub mod capture;
/// `verify`: rescan a tree and classify it against a manifest
pub mod verify;

use crate::HashcheckContext;
use crate::output::{self, Progress};
use crate::scanner::{ErrorPolicy, ScanOptions};
use crate::utils::thread_pool;
use anyhow::Result;

/// Scanner options from the configuration, overridden by command-line flags.
///
/// `jobs` of zero means one worker per available CPU.
///
/// # Errors
///
/// Returns an error if a configured ignore pattern is invalid.
pub fn scan_options(ctx: &HashcheckContext, strict: bool, jobs: Option<usize>) -> Result<ScanOptions> {
    let mut options = ctx.config.scan_options()?;
    if strict {
        options.policy = ErrorPolicy::Abort;
    }
    if let Some(jobs) = jobs {
        options.jobs = if jobs == 0 {
            thread_pool::available_threads()
        } else {
            jobs
        };
    }
    Ok(options)
}

/// Feeds scanner progress callbacks into a progress line created on first use,
/// once the file count is known.
pub(crate) fn track_progress(
    progress: &mut Option<Progress>,
    title: &str,
    done: usize,
    total: usize,
    bytes: u64,
) {
    let bar = progress.get_or_insert_with(|| output::start_progress(title, total));
    bar.add_bytes(bytes);
    bar.update(done);
}
