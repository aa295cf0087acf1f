//! End-to-end tests of the chainseal binary

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    fn cmd(&self) -> Result<Command> {
        let mut cmd = Command::cargo_bin("chainseal")?;
        cmd.env_remove("CHAINSEAL_JOURNAL")
            .env("RUST_LOG", "warn")
            .arg("--journal")
            .arg(self.path("chain.journal"))
            .arg("--config")
            .arg(self.path("missing.toml"))
            .arg("--batch-size")
            .arg("2");
        Ok(cmd)
    }

    fn append(&self, content: &str) -> Result<()> {
        self.cmd()?
            .args(["--quiet", "append", content])
            .assert()
            .success();
        Ok(())
    }
}

fn read(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

#[test]
fn test_append_and_report() -> Result<()> {
    let ws = Workspace::new()?;
    for content in ["a", "b", "c"] {
        ws.append(content)?;
    }

    ws.cmd()?
        .args(["report", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"valid\": true"))
        .stdout(predicate::str::contains("\"checked_entries\": 3"))
        .stdout(predicate::str::contains("\"pending_entries\": 1"))
        .stdout(predicate::str::contains("INF:1:"));
    Ok(())
}

#[test]
fn test_report_fails_on_wrong_expected_digest() -> Result<()> {
    let ws = Workspace::new()?;
    ws.append("a")?;
    ws.append("b")?;

    let forged = format!("INF:1:{}", "0".repeat(64));
    ws.cmd()?
        .args(["report", "--expect", &forged])
        .assert()
        .failure()
        .stdout(predicate::str::contains("INVALID"));
    Ok(())
}

#[test]
fn test_pr_prints_infinity_digest() -> Result<()> {
    let ws = Workspace::new()?;
    ws.cmd()?
        .args([
            "--quiet",
            "pr",
            "--number",
            "42",
            "--title",
            "feat: board",
            "--branch",
            "feature/board",
            "--status",
            "open",
            "--file",
            "src/board.rs",
            "--commit",
            "abc123",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("INF:0:"));
    Ok(())
}

#[test]
fn test_prove_and_verify_proof() -> Result<()> {
    let ws = Workspace::new()?;
    for content in ["a", "b", "c", "d"] {
        ws.append(content)?;
    }

    let proof_path = ws.path("proof.json");
    ws.cmd()?
        .args(["prove", "3", "--output"])
        .arg(&proof_path)
        .assert()
        .success();
    assert!(read(&proof_path)?.contains("\"index\": 3"));

    ws.cmd()?
        .arg("verify-proof")
        .arg(&proof_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("entry 3 is included"));

    ws.cmd()?
        .arg("verify-proof")
        .arg(&proof_path)
        .args(["--root", &"ab".repeat(32)])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn test_export_writes_entries() -> Result<()> {
    let ws = Workspace::new()?;
    ws.append("only")?;

    let export_path = ws.path("export.json");
    ws.cmd()?
        .arg("export")
        .arg("--output")
        .arg(&export_path)
        .assert()
        .success();

    let export: serde_json::Value = serde_json::from_str(&read(&export_path)?)?;
    assert_eq!(export["chain_length"], 1);
    assert_eq!(export["entries"][0]["index"], 0);
    Ok(())
}

#[test]
fn test_zero_batch_size_is_an_error() -> Result<()> {
    let ws = Workspace::new()?;
    let mut cmd = Command::cargo_bin("chainseal")?;
    cmd.arg("--journal")
        .arg(ws.path("chain.journal"))
        .arg("--config")
        .arg(ws.path("missing.toml"))
        .args(["--batch-size", "0", "report"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("batch size"));
    Ok(())
}
