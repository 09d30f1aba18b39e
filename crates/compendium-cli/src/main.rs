//! Compendium CLI
//!
//! The command-line interface running one pipeline stage per invocation.

mod cli;
mod commands;
mod error;
mod logging;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: failed to initialise logging: {}", "warning".yellow().bold(), e);
    }

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let Some(command) = cli.command else {
        println!("{} Compendium pack synchronizer", "compendium".green().bold());
        println!();
        println!("Run {} for available commands.", "compendium --help".cyan());
        return Ok(0);
    };

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    if !root.is_dir() {
        return Err(CliError::user(format!(
            "Workspace root {} is not a directory",
            root.display()
        )));
    }
    tracing::debug!(root = %root.display(), ?command, "Running command");

    // Stages await each store operation in turn; one thread is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(execute_command(root, command))
}

async fn execute_command(root: PathBuf, command: Commands) -> Result<i32> {
    match command {
        Commands::ImportSpells { dry_run } => commands::run_import_spells(&root, dry_run).await,
        Commands::ImportJournals { dry_run } => {
            commands::run_import_journals(&root, dry_run).await
        }
        Commands::UpdateTokens { dry_run } => commands::run_update_tokens(&root, dry_run).await,
        Commands::ValidateNotes => commands::run_validate_notes(&root).await,
        Commands::Compact { dry_run } => commands::run_compact(&root, dry_run).await,
    }
}
