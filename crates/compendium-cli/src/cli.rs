//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Compendium - Synchronize authored content into compendium packages
#[derive(Parser, Debug)]
#[command(name = "compendium")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Workspace root holding module.json (defaults to the current directory)
    #[arg(long, global = true, env = "COMPENDIUM_ROOT")]
    pub root: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Merge spell overrides and link spells to their tables and journals
    ///
    /// Reads metadata/spells/<package>/<slug>.yaml for every spell package,
    /// refreshes roll-table descriptions and creates missing spell journals.
    ///
    /// Examples:
    ///   compendium import-spells             # Import and write
    ///   compendium import-spells --dry-run   # Log the diff only
    ImportSpells {
        /// Preview changes without writing package files
        #[arg(long)]
        dry_run: bool,
    },

    /// Create or update journal entries from authored HTML text
    ImportJournals {
        /// Preview changes without writing package files
        #[arg(long)]
        dry_run: bool,
    },

    /// Apply prototype token defaults to every actor
    UpdateTokens {
        /// Preview changes without writing package files
        #[arg(long)]
        dry_run: bool,
    },

    /// Check that every scene note references an existing journal
    ///
    /// Exits with code 127 if any note fails.
    ValidateNotes,

    /// Rewrite every package log to its minimal snapshot
    Compact {
        /// Report the packages without rewriting them
        #[arg(long)]
        dry_run: bool,
    },
}

impl Commands {
    /// Whether this command only simulates its writes.
    pub fn dry_run(&self) -> bool {
        match self {
            Self::ImportSpells { dry_run }
            | Self::ImportJournals { dry_run }
            | Self::UpdateTokens { dry_run }
            | Self::Compact { dry_run } => *dry_run,
            Self::ValidateNotes => false,
        }
    }
}
