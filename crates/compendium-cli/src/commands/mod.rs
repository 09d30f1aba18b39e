//! Command implementations for compendium-cli

pub mod stages;
pub mod validate;

pub use stages::{run_compact, run_import_journals, run_import_spells, run_update_tokens};
pub use validate::run_validate_notes;
