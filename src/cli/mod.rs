//! Command-line interface for Chainseal

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
pub mod context;

/// Chainseal - tamper-evident event history
#[derive(Parser)]
#[command(
    name = "chainseal",
    version,
    about = "Tamper-evident hash chain with folded Merkle snapshots",
    long_about = "Chainseal records events in an append-only hash chain, folds completed batches into a constant-size INF digest and reports on the integrity of the whole history."
)]
pub struct Cli {
    /// Journal file backing the chain (overrides the config file)
    #[arg(long, global = true, env = "CHAINSEAL_JOURNAL")]
    pub journal: Option<PathBuf>,

    /// Configuration file (default: ~/.chainseal/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Entries per folded batch (overrides the config file)
    #[arg(long, global = true)]
    pub batch_size: Option<usize>,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Append raw content as a new entry
    Append {
        /// Content to append
        content: String,
    },

    /// Record a pull request state
    Pr {
        /// Pull request number
        #[arg(long)]
        number: u64,

        /// Pull request title
        #[arg(long)]
        title: String,

        /// Source branch
        #[arg(long)]
        branch: String,

        /// Status (open, merged, closed, ...)
        #[arg(long)]
        status: String,

        /// Changed file (repeatable)
        #[arg(long = "file")]
        files: Vec<String>,

        /// Commit id (repeatable)
        #[arg(long = "commit")]
        commits: Vec<String>,
    },

    /// Verify the whole history; exits non-zero when invalid
    Report {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Previously published digest the history must still match
        #[arg(long)]
        expect: Option<String>,
    },

    /// Print an inclusion proof for an entry
    Prove {
        /// Entry index
        index: u64,

        /// Write the proof to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify an inclusion proof file
    VerifyProof {
        /// Proof file (JSON)
        proof: PathBuf,

        /// Root the proof must lead to
        #[arg(long)]
        root: Option<String>,
    },

    /// Export the chain as JSON
    Export {
        /// Write the export to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
