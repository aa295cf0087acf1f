use crate::infinity::InfinityDigest;
use crate::report::{IntegrityEngine, IntegrityReport};
use anyhow::Result;
use colored::Colorize;

/// Execute the report command, returning whether the history is valid
pub fn execute(engine: &IntegrityEngine, json: bool, expect: Option<String>) -> Result<bool> {
    if let Some(expected) = expect {
        let digest: InfinityDigest = expected.parse()?;
        engine.set_published(digest);
    }

    let report = engine.get_integrity_report();
    if json {
        println!("{}", report.to_json()?);
    } else {
        show_report_human(engine, &report);
    }
    Ok(report.valid)
}

fn show_report_human(engine: &IntegrityEngine, report: &IntegrityReport) {
    println!("{}", "Integrity Report".green().bold());
    println!("{}", "═".repeat(50).green());

    let verdict = if report.valid {
        "VALID".green().bold()
    } else {
        "INVALID".red().bold()
    };
    println!("{}: {}", "Status".bold(), verdict);
    println!("{}: {}", "Checked Entries".bold(), report.checked_entries);
    println!("{}: {}", "Pending Entries".bold(), report.pending_entries);
    println!("{}: {}", "Merkle Root".bold(), report.merkle_root.to_hex().cyan());
    println!(
        "{}: {}",
        "Infinity Digest".bold(),
        engine.display_digest(&report.infinity_digest).cyan()
    );

    if !report.errors.is_empty() {
        println!();
        println!("{}", "Errors".red().bold());
        for error in &report.errors {
            println!("  {} {}", "✗".red(), error);
        }
    }
}
