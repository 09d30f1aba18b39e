//! Validate-notes command implementation

use std::path::Path;

use colored::Colorize;

use compendium_core::{Workspace, validate_notes};

use crate::error::Result;

/// Run the validate-notes command
///
/// Returns 127 when any note fails; the individual failures have already
/// been logged by the validator.
pub async fn run_validate_notes(root: &Path) -> Result<i32> {
    println!("{} Validating scene notes...", "=>".blue().bold());

    let workspace = Workspace::load(root)?;
    let report = validate_notes(&workspace).await?;

    if report.passed() {
        println!(
            "{} All {} note(s) in {} scene(s) reference a journal.",
            "OK".green().bold(),
            report.notes,
            report.scenes
        );
    } else {
        println!(
            "{} {} note(s) failed validation:",
            "FAILED".red().bold(),
            report.failures.len()
        );
        for failure in &report.failures {
            println!("   {} {}", "!".red(), failure);
        }
        for error in &report.errors {
            println!("   {} unreadable scene {}", "!".red(), error);
        }
    }

    Ok(report.exit_code())
}
