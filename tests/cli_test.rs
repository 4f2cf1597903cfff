mod common;

use anyhow::Result;
use assert_cmd::Command;
use common::TestTree;
use predicates::prelude::*;
use std::fs;

fn hashcheck(tree: &TestTree) -> Result<Command> {
    let mut cmd = Command::cargo_bin("hashcheck")?;
    cmd.env("HASHCHECK_CONFIG_PATH", tree.temp_dir.path().join("config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("HASHCHECK_LOG");
    Ok(cmd)
}

#[test]
fn test_capture_then_clean_verify() -> Result<()> {
    let tree = TestTree::new()?;
    tree.write("a.txt", "hello")?;
    tree.write("b.txt", "world")?;

    hashcheck(&tree)?
        .arg("capture")
        .arg(&tree.root)
        .arg(&tree.manifest)
        .assert()
        .success()
        .stderr(predicate::str::contains("Captured 2 files"));
    common::assert_exists(&tree.manifest);

    hashcheck(&tree)?
        .arg("verify")
        .arg(&tree.root)
        .arg(&tree.manifest)
        .arg("--fail-on-change")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("2 files unchanged"));
    Ok(())
}

#[test]
fn test_verify_lists_changes() -> Result<()> {
    let tree = TestTree::new()?;
    tree.write("a.txt", "hello")?;
    tree.write("b.txt", "world")?;
    hashcheck(&tree)?
        .arg("capture")
        .arg(&tree.root)
        .arg(&tree.manifest)
        .assert()
        .success();

    tree.write("b.txt", "world!")?;
    tree.write("c.txt", "new")?;
    tree.remove("a.txt")?;

    hashcheck(&tree)?
        .arg("verify")
        .arg(&tree.root)
        .arg(&tree.manifest)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("deleted:")
                .and(predicate::str::contains("modified:"))
                .and(predicate::str::contains("new file:"))
                .and(predicate::str::contains("0 files unchanged")),
        );

    hashcheck(&tree)?
        .arg("verify")
        .arg(&tree.root)
        .arg(&tree.manifest)
        .args(["--short", "--fail-on-change"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains(format!(
            "M {}",
            tree.path("b.txt").display()
        )));
    Ok(())
}

#[test]
fn test_unsupported_manifest_exit_code() -> Result<()> {
    let tree = TestTree::new()?;
    fs::write(&tree.manifest, "9.0\n")?;

    hashcheck(&tree)?
        .arg("verify")
        .arg(&tree.root)
        .arg(&tree.manifest)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unsupported manifest version: 9.0"));
    Ok(())
}

#[test]
fn test_legacy_manifest_warns() -> Result<()> {
    let tree = TestTree::new()?;
    fs::write(&tree.manifest, "0.1\n")?;

    hashcheck(&tree)?
        .arg("verify")
        .arg(&tree.root)
        .arg(&tree.manifest)
        .assert()
        .success()
        .stderr(
            predicate::str::contains("warning:")
                .and(predicate::str::contains("0.1"))
                .and(predicate::function(|err: &str| {
                    err.matches("not the current version").count() == 1
                })),
        );
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_reported_deleted() -> Result<()> {
    let tree = TestTree::new()?;
    tree.write("a.txt", "hello")?;
    let looped = tree.write("b.txt", "world")?;
    hashcheck(&tree)?
        .arg("capture")
        .arg(&tree.root)
        .arg(&tree.manifest)
        .assert()
        .success();

    tree.remove("b.txt")?;
    std::os::unix::fs::symlink(&looped, &looped)?;
    fs::write(
        tree.temp_dir.path().join("config.toml"),
        "[scan]\nfollow_symlinks = true\n",
    )?;

    hashcheck(&tree)?
        .arg("verify")
        .arg(&tree.root)
        .arg(&tree.manifest)
        .args(["--short", "--fail-on-change"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains(format!("D {}", looped.display())))
        .stderr(predicate::str::contains("warning:"));
    Ok(())
}

#[test]
fn test_missing_manifest_is_generic_failure() -> Result<()> {
    let tree = TestTree::new()?;

    hashcheck(&tree)?
        .arg("verify")
        .arg(&tree.root)
        .arg(&tree.manifest)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error:"));
    Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> Result<()> {
    let tree = TestTree::new()?;
    fs::write(tree.temp_dir.path().join("config.toml"), "[scan]\njobs = 0\n")?;

    hashcheck(&tree)?
        .arg("capture")
        .arg(&tree.root)
        .arg(&tree.manifest)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("scan.jobs"));
    Ok(())
}

#[test]
fn test_completion_generates_script() -> Result<()> {
    let tree = TestTree::new()?;

    hashcheck(&tree)?
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hashcheck"));
    Ok(())
}

#[test]
fn test_config_ignore_patterns_and_jobs() -> Result<()> {
    let tree = TestTree::new()?;
    tree.write("keep.txt", "keep")?;
    tree.write("scratch.tmp", "skip")?;
    tree.write("cache/blob", "skip")?;
    fs::write(
        tree.temp_dir.path().join("config.toml"),
        "[scan]\nignore_patterns = [\"*.tmp\", \"cache\"]\njobs = 2\n",
    )?;

    hashcheck(&tree)?
        .arg("capture")
        .arg(&tree.root)
        .arg(&tree.manifest)
        .assert()
        .success()
        .stderr(predicate::str::contains("Captured 1 files"));

    let content = fs::read_to_string(&tree.manifest)?;
    assert!(content.contains("keep.txt"));
    assert!(!content.contains("scratch.tmp"));
    assert!(!content.contains("blob"));
    Ok(())
}
