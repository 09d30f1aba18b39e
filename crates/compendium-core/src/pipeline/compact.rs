//! Bulk compaction stage

use crate::config::{EntityType, Workspace};
use crate::sync::{SyncEngine, SyncOptions, SyncReport};
use crate::Result;

/// Compact every package of a known entity type.
///
/// Packages of other entity types are left untouched.
pub async fn compact_all(workspace: &Workspace, options: SyncOptions) -> Result<SyncReport> {
    let mut engine = SyncEngine::new(workspace.root(), options);
    let mut report = SyncReport::new(options.dry_run);

    for pack in &workspace.manifest().packs {
        if pack.entity == EntityType::Other {
            tracing::debug!(package = %pack.name, "Skipping package of unknown entity type");
            continue;
        }
        report.actions.push(engine.compact(pack).await?);
    }
    Ok(report)
}
