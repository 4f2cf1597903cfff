use crate::HashcheckContext;
use crate::output;
use crate::scanner::{ScanMode, ScanReport, Scanner};
use crate::storage::manifest;
use crate::utils::format_size;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{Level, span};

/// Flags for the `capture` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureOptions {
    /// Full records digests; quick records metadata only
    pub mode: ScanMode,
    /// Abort on the first unreadable file
    pub strict: bool,
    /// Worker count override
    pub jobs: Option<usize>,
}

/// Scans `root` and writes its manifest to `manifest_path`.
///
/// Unreadable files are reported as warnings and left out of the manifest
/// unless `strict` is set, in which case nothing is written.
///
/// # Errors
///
/// Returns an error if the root cannot be read, a strict scan hits an
/// unreadable file, or the manifest cannot be written.
pub fn execute(
    ctx: &HashcheckContext,
    root: &Path,
    manifest_path: &Path,
    opts: CaptureOptions,
) -> Result<ScanReport> {
    let span = span!(Level::INFO, "capture", root = %root.display(), mode = %opts.mode);
    let _guard = span.enter();

    let scanner = Scanner::new(super::scan_options(ctx, opts.strict, opts.jobs)?);
    let title = match opts.mode {
        ScanMode::Full => "Hashing files",
        ScanMode::Quick => "Reading metadata",
    };

    let mut progress = None;
    let report = scanner
        .scan_with_progress(root, opts.mode, |done, total, bytes| {
            super::track_progress(&mut progress, title, done, total, bytes);
        })
        .with_context(|| format!("Capture of {} failed", root.display()))?;
    if let Some(bar) = progress {
        bar.finish();
    }

    for failure in &report.failures {
        output::warning(&failure.to_string());
    }

    manifest::save(&report.snapshot, manifest_path)?;

    output::success(&format!(
        "Captured {} files ({}) in {}",
        report.snapshot.len(),
        format_size(report.snapshot.total_size()),
        humantime::format_duration(round_to_millis(report.elapsed))
    ));
    if !report.is_complete() {
        output::warning(&format!(
            "{} entries could not be read and were left out of {}",
            report.failures.len(),
            manifest_path.display()
        ));
    }
    output::info(&format!("Manifest written to {}", manifest_path.display()));

    Ok(report)
}

fn round_to_millis(elapsed: Duration) -> Duration {
    Duration::from_millis(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HashcheckError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_capture_writes_manifest() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("data");
        fs::create_dir(&root)?;
        fs::write(root.join("a.txt"), "hello")?;
        fs::write(root.join("b.txt"), "world")?;
        let manifest_path = dir.path().join("data.manifest");

        let report = execute(
            &HashcheckContext::default(),
            &root,
            &manifest_path,
            CaptureOptions::default(),
        )?;

        assert_eq!(report.snapshot.len(), 2);
        let loaded = manifest::load(&manifest_path)?;
        assert_eq!(loaded.len(), 2);
        assert!(loaded.records().all(|r| r.digest.is_some()));
        Ok(())
    }

    #[test]
    fn test_quick_capture_has_no_digests() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("a.txt"), "hello")?;
        let manifest_path = dir.path().join("out/quick.manifest");

        let opts = CaptureOptions {
            mode: ScanMode::Quick,
            ..CaptureOptions::default()
        };
        execute(&HashcheckContext::default(), dir.path(), &manifest_path, opts)?;

        let loaded = manifest::load(&manifest_path)?;
        assert_eq!(loaded.len(), 1);
        assert!(loaded.records().all(|r| r.digest.is_none() && r.size == Some(5)));
        Ok(())
    }

    #[test]
    fn test_missing_root_keeps_error_type() -> Result<()> {
        let dir = tempdir()?;
        let manifest_path = dir.path().join("m");

        let err = execute(
            &HashcheckContext::default(),
            &dir.path().join("missing"),
            &manifest_path,
            CaptureOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<HashcheckError>(),
            Some(HashcheckError::FileUnreadable { .. })
        ));
        assert!(!manifest_path.exists());
        Ok(())
    }

    #[test]
    fn test_round_to_millis() {
        assert_eq!(
            round_to_millis(Duration::from_micros(1_234_567)),
            Duration::from_millis(1_234)
        );
    }
}
