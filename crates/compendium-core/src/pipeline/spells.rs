//! Spell import stage

use std::path::Path;

use crate::config::{EntityType, PackDescriptor, SETTINGS_FILE, Workspace};
use crate::link::{Formatter, SpellLinker};
use crate::registry::Registry;
use crate::sync::{SyncEngine, SyncOptions, SyncReport};
use crate::{Error, Result};

/// Merge authored overrides into every spell package and refresh the links
/// between spells, their roll tables and their journals.
///
/// Registries are built before the first spell is touched. Every package
/// written during the stage is compacted once all spell packages are done.
///
/// # Errors
///
/// Returns an error if the pack pattern is invalid or a package cannot be
/// opened or compacted. Failures of individual spells are in the report.
pub async fn import_spells(workspace: &Workspace, options: SyncOptions) -> Result<SyncReport> {
    let manifest = workspace.manifest();
    let settings = &workspace.settings().spells;
    let pattern = workspace
        .settings()
        .spell_pack_regex()
        .map_err(|e| Error::ConfigInvalid {
            path: workspace.resolve(Path::new(SETTINGS_FILE)),
            message: format!("spells.pack_pattern: {e}"),
        })?;

    let mut engine = SyncEngine::new(workspace.root(), options);
    let tables = Registry::build(&mut engine, manifest, EntityType::RollTable).await?;

    let journal_pack = spell_journal_pack(workspace);
    let mut journals = match &journal_pack {
        Some(pack) => Registry::build_from(&mut engine, [pack]).await?,
        None => Registry::new(),
    };

    let spell_packs: Vec<PackDescriptor> = manifest
        .packages(EntityType::Item)
        .filter(|pack| pattern.is_match(&pack.name))
        .cloned()
        .collect();
    if spell_packs.is_empty() {
        tracing::warn!(pattern = %settings.pack_pattern, "No spell packages match");
    }

    let mut linker = SpellLinker::new(
        Formatter::new(&manifest.name),
        &tables,
        &mut journals,
        journal_pack,
        workspace.resolve(&settings.metadata_dir),
    );

    let mut report = SyncReport::new(options.dry_run);
    for pack in &spell_packs {
        tracing::info!(package = %pack.name, "Importing spells");
        let pass = engine.process_documents(pack, &mut linker).await?;
        report.merge(pass);
    }

    report.actions.extend(engine.compact_written().await?);
    Ok(report)
}

/// The package receiving synthesized spell journals, if it is configured and
/// present in the manifest.
fn spell_journal_pack(workspace: &Workspace) -> Option<PackDescriptor> {
    let Some(name) = &workspace.settings().spells.journal_pack else {
        tracing::warn!("No spell journal package configured; journals will not be synthesized");
        return None;
    };

    match workspace.manifest().package(name) {
        Some(pack) => Some(pack.clone()),
        None => {
            tracing::warn!(
                package = %name,
                "Spell journal package not in manifest; journals will not be synthesized"
            );
            None
        }
    }
}
