use crate::core::types::Hash;
use crate::proofs::Proof;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

/// Execute the verify-proof command, returning whether the proof holds
pub fn execute(proof_path: PathBuf, root: Option<String>) -> Result<bool> {
    let content = std::fs::read_to_string(&proof_path)?;
    let proof = Proof::from_json(&content)?;

    let valid = match root {
        Some(root) => proof.verify_against(Hash::from_hex(&root)?),
        None => proof.verify(),
    };

    if valid {
        println!(
            "{} entry {} is included under root {}",
            "✓".green(),
            proof.target.index,
            proof.root.to_hex().cyan()
        );
    } else {
        println!("{} proof does not verify", "✗".red());
    }
    Ok(valid)
}
