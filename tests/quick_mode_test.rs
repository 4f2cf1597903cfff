mod common;

use anyhow::Result;
use common::TestTree;
use hashcheck::scanner::ScanMode;
use hashcheck::storage::ChangeKind;

const PINNED: i64 = 1_600_000_000;

#[test]
fn test_quick_and_full_agree_when_metadata_unchanged() -> Result<()> {
    let tree = TestTree::new()?;
    tree.write("a.txt", "alpha")?;
    tree.write("b.txt", "beta")?;
    tree.capture(ScanMode::Full)?;

    let quick = tree.verify(ScanMode::Quick)?;
    let full = tree.verify(ScanMode::Full)?;
    assert_eq!(
        quick.entries().collect::<Vec<_>>(),
        full.entries().collect::<Vec<_>>()
    );
    assert_eq!(quick.rehashed(), 0);
    Ok(())
}

#[test]
fn test_touched_but_identical_file_is_unchanged() -> Result<()> {
    let tree = TestTree::new()?;
    tree.write("a.txt", "alpha")?;
    tree.set_mtime("a.txt", PINNED)?;
    tree.capture(ScanMode::Full)?;

    tree.set_mtime("a.txt", PINNED + 3600)?;

    let report = tree.verify(ScanMode::Quick)?;
    assert_eq!(report.classification(&tree.path("a.txt")), Some(ChangeKind::Unchanged));
    assert_eq!(report.rehashed(), 1);
    Ok(())
}

#[test]
fn test_size_change_with_restored_mtime_is_modified() -> Result<()> {
    let tree = TestTree::new()?;
    tree.write("a.txt", "alpha")?;
    tree.set_mtime("a.txt", PINNED)?;
    tree.capture(ScanMode::Full)?;

    tree.write("a.txt", "alpha, longer")?;
    tree.set_mtime("a.txt", PINNED)?;

    let report = tree.verify(ScanMode::Quick)?;
    assert_eq!(report.classification(&tree.path("a.txt")), Some(ChangeKind::Modified));
    assert_eq!(report.rehashed(), 1);
    Ok(())
}

#[test]
fn test_same_size_same_mtime_edit_is_invisible_to_quick_mode() -> Result<()> {
    let tree = TestTree::new()?;
    tree.write("a.txt", "alpha")?;
    tree.set_mtime("a.txt", PINNED)?;
    tree.capture(ScanMode::Full)?;

    tree.write("a.txt", "omega")?;
    tree.set_mtime("a.txt", PINNED)?;

    let quick = tree.verify(ScanMode::Quick)?;
    assert_eq!(quick.classification(&tree.path("a.txt")), Some(ChangeKind::Unchanged));

    let full = tree.verify(ScanMode::Full)?;
    assert_eq!(full.classification(&tree.path("a.txt")), Some(ChangeKind::Modified));
    Ok(())
}

#[test]
fn test_quick_baseline_is_judged_on_metadata() -> Result<()> {
    let tree = TestTree::new()?;
    tree.write("a.txt", "alpha")?;
    tree.write("b.txt", "beta")?;
    tree.set_mtime("a.txt", PINNED)?;
    tree.set_mtime("b.txt", PINNED)?;
    tree.capture(ScanMode::Quick)?;

    tree.set_mtime("b.txt", PINNED + 1)?;

    let report = tree.verify(ScanMode::Full)?;
    assert_eq!(report.classification(&tree.path("a.txt")), Some(ChangeKind::Unchanged));
    assert_eq!(report.classification(&tree.path("b.txt")), Some(ChangeKind::Modified));
    assert_eq!(report.rehashed(), 0);
    Ok(())
}
