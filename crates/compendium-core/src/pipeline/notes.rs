//! Scene note validation stage

use crate::config::{EntityType, Workspace};
use crate::registry::Registry;
use crate::sync::{SyncEngine, SyncOptions};
use crate::validate::{NoteValidator, ValidationReport};
use crate::Result;

/// Check every scene note against the journals of the whole manifest.
///
/// The run never writes: stores are opened in dry-run mode so even absent
/// package files are left uncreated.
pub async fn validate_notes(workspace: &Workspace) -> Result<ValidationReport> {
    let manifest = workspace.manifest();
    let mut engine = SyncEngine::new(workspace.root(), SyncOptions { dry_run: true });
    let journals = Registry::build(&mut engine, manifest, EntityType::JournalEntry).await?;

    let mut validator = NoteValidator::new(&journals, &workspace.settings().validation.flag_scope);
    let mut errors = Vec::new();
    for pack in manifest.packages(EntityType::Scene) {
        let pass = engine.process_documents(pack, &mut validator).await?;
        errors.extend(pass.errors);
    }

    Ok(validator.finish(errors))
}
