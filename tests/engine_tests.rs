//! Integrity engine workflows: events, reports, export and configuration

mod common;

use anyhow::Result;
use chainseal::core::sync_tag::{sync_tag, verify_sync_tag};
use chainseal::report::{CardEvent, LedgerEvent, PullRequestEvent};
use chainseal::{ChainExport, ChainsealError, EngineConfig, InfinityDigest, IntegrityEngine};
use common::{engine, engine_with, ts};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn pr_digest(status: &str) -> Result<InfinityDigest> {
    let engine = engine(1);
    let digest = engine.hash_pr(
        42,
        "feat: Add kanban endpoints",
        "feature/kanban",
        status,
        &["config/endpoints.yaml".to_string()],
        &["abc123".to_string(), "def456".to_string()],
    )?;
    Ok(digest)
}

#[test]
fn test_hash_pr_digest_format() -> Result<()> {
    let digest = pr_digest("open")?;
    let text = digest.to_string();
    assert!(text.starts_with("INF:1:"));
    assert_eq!(text.len(), "INF:1:".len() + 64);
    assert_eq!(text.parse::<InfinityDigest>()?, digest);
    Ok(())
}

#[test]
fn test_hash_pr_status_change_changes_digest() -> Result<()> {
    assert_ne!(pr_digest("open")?, pr_digest("merged")?);
    Ok(())
}

#[test]
fn test_card_lifecycle_is_recorded_in_order() -> Result<()> {
    let engine = engine(2);
    engine.hash_card(
        "CARD-001",
        "Set up sync",
        "backlog",
        None,
        Some("high"),
        &[("labels", "sync")],
    )?;
    engine.hash_card_transition("CARD-001", "backlog", "in_progress")?;
    engine.hash_endpoint_state("/api/board", "healthy", 200, "9f86d081")?;

    assert_eq!(engine.chain().len(), 3);
    assert_eq!(engine.infinity_digest().depth, 1);
    assert_eq!(engine.pending_entries(), 1);
    assert!(engine.get_integrity_report().valid);
    Ok(())
}

#[test]
fn test_event_receipt_tracks_chain() -> Result<()> {
    let engine = engine(256);
    let event = LedgerEvent::Card(CardEvent {
        card_id: "CARD-002".to_string(),
        title: "Write docs".to_string(),
        status: "todo".to_string(),
        assignee: Some("sam".to_string()),
        priority: None,
        extra_fields: Default::default(),
    });

    let receipt = engine.append_event(&event, ts(10))?;
    assert_eq!(receipt.index, 0);
    assert_eq!(Some(receipt.entry_digest), engine.chain().tail_digest());
    assert_eq!(receipt.infinity_digest.depth, 0);
    Ok(())
}

#[test]
fn test_report_json_shape() -> Result<()> {
    let engine = engine_with(2, 3);
    let report = engine.get_integrity_report();
    let value: serde_json::Value = serde_json::from_str(&report.to_json()?)?;

    assert_eq!(value["valid"], true);
    assert_eq!(value["errors"], json!([]));
    assert_eq!(value["checked_entries"], 3);
    assert_eq!(value["pending_entries"], 1);
    assert_eq!(
        value["infinity_digest"],
        engine.infinity_digest().to_string()
    );
    Ok(())
}

#[test]
fn test_export_file_roundtrip() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("export.json");

    let engine = engine_with(3, 7);
    std::fs::write(&path, engine.export().to_json()?)?;

    let export = ChainExport::from_json(&std::fs::read_to_string(&path)?)?;
    assert_eq!(export.chain_length, 7);
    let imported = IntegrityEngine::import(engine.config().clone(), export)?;
    assert_eq!(imported.infinity_digest(), engine.infinity_digest());
    assert!(imported.get_integrity_report().valid);
    Ok(())
}

#[test]
fn test_import_with_claimed_digest_mismatch() -> Result<()> {
    let engine = engine_with(2, 6);
    let mut export = engine.export();
    export.infinity_digest = InfinityDigest::new(3, chainseal::core::hash::hash_bytes(b"x"));

    let imported = IntegrityEngine::import(engine.config().clone(), export)?;
    let report = imported.get_integrity_report();
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("does not match"));
    Ok(())
}

#[test]
fn test_config_file_drives_engine() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        "batch_size = 3\ngenesis_seed = \"team-board\"\ndepth_display_width = 4\n",
    )?;

    let config = EngineConfig::load_from(&config_path)?;
    assert_eq!(config.batch_size, 3);
    assert_eq!(config.journal_path, None);

    let engine = IntegrityEngine::new(config)?;
    for i in 0..3 {
        engine.append(vec![i], ts(i as i64))?;
    }
    let digest = engine.infinity_digest();
    assert!(engine.display_digest(&digest).starts_with("INF:0001:"));
    Ok(())
}

#[test]
fn test_config_rejects_zero_batch_size() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "batch_size = 0\n")?;

    let err = EngineConfig::load_from(&config_path).unwrap_err();
    assert!(matches!(err, ChainsealError::InvalidBatchSize { size: 0 }));
    Ok(())
}

#[test]
fn test_sync_tag_ignores_key_order() {
    let a = json!({ "card_id": "CARD-001", "status": "done" });
    let b = json!({ "status": "done", "card_id": "CARD-001" });

    let tag = sync_tag(&a, "github");
    assert!(tag.starts_with("github:"));
    assert_eq!(tag, sync_tag(&b, "github"));
    assert!(verify_sync_tag(&b, &tag));
    assert!(!verify_sync_tag(&json!({ "card_id": "CARD-001", "status": "todo" }), &tag));
}

#[test]
fn test_replicas_agree_regardless_of_file_order() -> Result<()> {
    let record = |files: &[&str]| -> Result<InfinityDigest> {
        let engine = engine(1);
        let files: Vec<String> = files.iter().map(|f| f.to_string()).collect();
        let receipt = engine.append_event(
            &LedgerEvent::PullRequest(PullRequestEvent {
                pr_number: 7,
                title: "fix: sync".to_string(),
                branch: "fix/sync".to_string(),
                status: "open".to_string(),
                files_changed: files,
                commits: vec!["abc123".to_string(), "def456".to_string()],
            }),
            ts(1_700_000_000),
        )?;
        Ok(receipt.infinity_digest)
    };

    assert_eq!(
        record(&["src/a.rs", "src/b.rs", "docs/c.md"])?,
        record(&["docs/c.md", "src/a.rs", "src/b.rs"])?
    );
    Ok(())
}
