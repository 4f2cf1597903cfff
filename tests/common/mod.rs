#![allow(dead_code)]

use anyhow::Result;
use filetime::FileTime;
use hashcheck::reconcile::{ReconciliationReport, Reconciler};
use hashcheck::scanner::{ScanMode, ScanOptions, Scanner};
use hashcheck::storage::manifest;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory holding a scanned tree and, beside it, its manifest.
pub struct TestTree {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub manifest: PathBuf,
}

impl TestTree {
    /// Create an empty tree under a fresh temporary directory
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("data");
        fs::create_dir(&root)?;
        let manifest = temp_dir.path().join("data.manifest");
        Ok(Self {
            temp_dir,
            root,
            manifest,
        })
    }

    /// Path of `name` inside the tree
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Write a file, creating parent directories
    pub fn write(&self, name: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        fs::remove_file(self.path(name))?;
        Ok(())
    }

    /// Pin a file's modification time (seconds since the epoch)
    pub fn set_mtime(&self, name: &str, seconds: i64) -> Result<()> {
        filetime::set_file_mtime(self.path(name), FileTime::from_unix_time(seconds, 0))?;
        Ok(())
    }

    /// Scan the tree in `mode` and save the manifest
    pub fn capture(&self, mode: ScanMode) -> Result<()> {
        let report = Scanner::new(ScanOptions::default()).scan(&self.root, mode)?;
        manifest::save(&report.snapshot, &self.manifest)?;
        Ok(())
    }

    /// Load the manifest, rescan in `mode` and reconcile
    pub fn verify(&self, mode: ScanMode) -> Result<ReconciliationReport> {
        let baseline = manifest::load(&self.manifest)?;
        let fresh = Scanner::new(ScanOptions::default()).scan(&self.root, mode)?;
        Ok(Reconciler::default().reconcile(&fresh.snapshot, &baseline)?)
    }
}

pub fn assert_exists(path: &Path) {
    assert!(path.exists(), "expected {} to exist", path.display());
}
