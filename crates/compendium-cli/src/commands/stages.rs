//! Write stage command implementations
//!
//! Each stage loads the workspace, runs one pipeline stage and prints a
//! summary of its report. The detailed log goes to stderr as it happens.

use std::path::Path;

use colored::Colorize;

use compendium_core::{
    SyncAction, SyncOptions, SyncReport, Workspace, compact_all, import_journals, import_spells,
    update_tokens,
};

use crate::error::Result;

/// Exit code when some documents failed but the stage ran to completion.
pub const DOCUMENT_FAILURE_EXIT_CODE: i32 = 1;

/// Run the import-spells command
pub async fn run_import_spells(root: &Path, dry_run: bool) -> Result<i32> {
    announce("Importing spells", dry_run);
    let workspace = Workspace::load(root)?;
    let report = import_spells(&workspace, SyncOptions { dry_run }).await?;
    Ok(summarize(&report))
}

/// Run the import-journals command
pub async fn run_import_journals(root: &Path, dry_run: bool) -> Result<i32> {
    announce("Importing journal text", dry_run);
    let workspace = Workspace::load(root)?;
    let report = import_journals(&workspace, SyncOptions { dry_run }).await?;
    Ok(summarize(&report))
}

/// Run the update-tokens command
pub async fn run_update_tokens(root: &Path, dry_run: bool) -> Result<i32> {
    announce("Updating actor tokens", dry_run);
    let workspace = Workspace::load(root)?;
    let report = update_tokens(&workspace, SyncOptions { dry_run }).await?;
    Ok(summarize(&report))
}

/// Run the compact command
pub async fn run_compact(root: &Path, dry_run: bool) -> Result<i32> {
    announce("Compacting packages", dry_run);
    let workspace = Workspace::load(root)?;
    let report = compact_all(&workspace, SyncOptions { dry_run }).await?;
    Ok(summarize(&report))
}

fn announce(stage: &str, dry_run: bool) {
    let suffix = if dry_run { " (dry run)" } else { "" };
    println!("{} {}{}...", "=>".blue().bold(), stage, suffix);
}

/// Print the report and return the process exit code.
fn summarize(report: &SyncReport) -> i32 {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };

    if report.writes() == 0 {
        println!(
            "{} {}Up to date. {} document(s) checked, no changes needed.",
            "OK".green().bold(),
            prefix,
            report.processed
        );
    } else {
        println!(
            "{} {}{} change(s) across {} document(s):",
            "OK".green().bold(),
            prefix,
            report.writes(),
            report.processed
        );
    }

    for action in &report.actions {
        let marker = match action {
            SyncAction::Created { .. } => "+".green(),
            SyncAction::Updated { .. } => "~".yellow(),
            SyncAction::Removed { .. } => "-".red(),
            SyncAction::Compacted { .. } => "*".dimmed(),
        };
        println!("   {} {}{}", marker, prefix, action);
    }

    if report.success() {
        return 0;
    }

    println!();
    println!(
        "{} {} document(s) failed:",
        "FAILED".red().bold(),
        report.errors.len()
    );
    for error in &report.errors {
        println!("   {} {}", "!".red(), error);
    }
    DOCUMENT_FAILURE_EXIT_CODE
}
