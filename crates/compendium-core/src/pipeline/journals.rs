//! Journal text import stage
//!
//! Authored `.html` files become journal entries named after their file stem.
//! Files may sit directly in the text directory or one directory below it;
//! both levels are visited in name order.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::{EntityType, PackDescriptor, Workspace};
use crate::document::{Document, NAME_KEY};
use crate::link::SYNTHESIZED_JOURNAL_SORT;
use crate::registry::Registry;
use crate::sync::{DocumentError, SyncEngine, SyncOptions, SyncReport};
use crate::{Error, Result};

const TEXT_EXTENSION: &str = "html";

/// One authored journal text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSource {
    /// Journal title, the file stem
    pub title: String,
    pub path: PathBuf,
}

/// Import every text source into the configured journal package.
///
/// Existing journals, matched by slug, have their content replaced when it
/// differs; missing ones are created. The package is compacted afterwards.
///
/// # Errors
///
/// Returns an error if no journal package can be determined, the text
/// directory cannot be listed, or the package cannot be opened or compacted.
pub async fn import_journals(workspace: &Workspace, options: SyncOptions) -> Result<SyncReport> {
    let pack = journal_pack(workspace)?;
    let mut engine = SyncEngine::new(workspace.root(), options);
    let mut registry = Registry::build_from(&mut engine, [&pack]).await?;

    let text_dir = workspace.resolve(&workspace.settings().journals.text_dir);
    let sources = collect_text_sources(&text_dir).await?;
    tracing::info!(
        package = %pack.name,
        sources = sources.len(),
        "Importing journal text"
    );

    let mut report = SyncReport::new(options.dry_run);
    for source in &sources {
        report.processed += 1;
        if let Err(e) = import_source(&mut engine, &mut registry, &pack, source).await {
            tracing::error!(
                source = %source.path.display(),
                error = %e,
                "Journal import failed"
            );
            report.errors.push(DocumentError {
                package: pack.name.clone(),
                document: source.title.clone(),
                message: e.to_string(),
            });
        }
    }

    report.actions = engine.take_actions();
    report.actions.push(engine.compact(&pack).await?);
    Ok(report)
}

/// List the `.html` sources under `text_dir`, sorted by name at each level.
///
/// # Errors
///
/// Returns `Source` if the directory or one of its sub-directories cannot be
/// listed.
pub async fn collect_text_sources(text_dir: &Path) -> Result<Vec<TextSource>> {
    let mut sources = Vec::new();
    for entry in sorted_entries(text_dir).await? {
        if entry.is_dir() {
            for nested in sorted_entries(&entry).await? {
                if let Some(source) = text_source(nested) {
                    sources.push(source);
                }
            }
        } else if let Some(source) = text_source(entry) {
            sources.push(source);
        }
    }
    Ok(sources)
}

async fn import_source(
    engine: &mut SyncEngine,
    registry: &mut Registry,
    pack: &PackDescriptor,
    source: &TextSource,
) -> Result<()> {
    let content = tokio::fs::read_to_string(&source.path)
        .await
        .map_err(|e| Error::Source {
            path: source.path.clone(),
            message: e.to_string(),
        })?;

    match registry.find(&source.title).cloned() {
        Some(existing) => {
            let id = existing.id().ok_or_else(|| Error::MissingField {
                document: existing.document.label(),
                field: "_id".to_string(),
            })?;
            let mut fields = Map::new();
            fields.insert("content".into(), Value::String(content));

            if engine.apply_fields(&existing.package, id, fields).await?
                && let Some(refreshed) = engine
                    .store(&existing.package.name)
                    .and_then(|store| store.get(id))
                    .cloned()
            {
                registry.register(&existing.package, refreshed);
            }
        }
        None => {
            let mut journal = Document::new();
            journal.set(NAME_KEY, source.title.as_str());
            journal.set("sort", SYNTHESIZED_JOURNAL_SORT);
            journal.set("content", content);

            let stored = engine.insert_document(pack, journal).await?;
            registry.register(pack, stored);
        }
    }
    Ok(())
}

/// The configured journal package, or the first JournalEntry package.
fn journal_pack(workspace: &Workspace) -> Result<PackDescriptor> {
    let manifest = workspace.manifest();
    match &workspace.settings().journals.pack {
        Some(name) => manifest.require_package(name).cloned(),
        None => manifest
            .packages(EntityType::JournalEntry)
            .next()
            .cloned()
            .ok_or_else(|| Error::PackageNotFound {
                name: format!("<first {} package>", EntityType::JournalEntry),
            }),
    }
}

async fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let source_error = |e: std::io::Error| Error::Source {
        path: dir.to_path_buf(),
        message: e.to_string(),
    };

    let mut reader = tokio::fs::read_dir(dir).await.map_err(source_error)?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await.map_err(source_error)? {
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

fn text_source(path: PathBuf) -> Option<TextSource> {
    let is_text = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(TEXT_EXTENSION));
    if !is_text || !path.is_file() {
        tracing::debug!(path = %path.display(), "Skipping non-text entry");
        return None;
    }

    let title = path.file_stem()?.to_string_lossy().into_owned();
    Some(TextSource { title, path })
}
