//! SyncEngine implementation
//!
//! The SyncEngine owns every package store opened during a run and is the
//! only path through which documents are written. Each write is compared
//! against the stored document first, so a pass over unchanged inputs writes
//! nothing.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use similar::TextDiff;

use crate::config::PackDescriptor;
use crate::document::{Document, ID_KEY};
use crate::store::PackStore;
use crate::{Error, Result};

use super::report::{DocumentError, SyncAction, SyncOptions, SyncReport};

/// Per-document transform applied by [`SyncEngine::process_documents`].
///
/// Returning `Ok(None)` removes the document; returning a document equal to
/// the input writes nothing. The engine is handed back so a transform can
/// issue side writes to other packages through the same minimal-diff path.
#[async_trait]
pub trait Transform: Send {
    async fn transform(
        &mut self,
        engine: &mut SyncEngine,
        package: &PackDescriptor,
        document: &Document,
    ) -> Result<Option<Document>>;
}

/// Engine for synchronizing package documents
pub struct SyncEngine {
    /// Workspace root every package path is relative to
    root: PathBuf,
    options: SyncOptions,
    /// Lazily opened stores, keyed by package name
    stores: HashMap<String, PackStore>,
    /// Writes not yet claimed by a pass report
    pending: Vec<SyncAction>,
    /// Packages written since the last compaction, in first-write order
    written: Vec<PackDescriptor>,
}

impl SyncEngine {
    pub fn new(root: impl Into<PathBuf>, options: SyncOptions) -> Self {
        Self {
            root: root.into(),
            options,
            stores: HashMap::new(),
            pending: Vec::new(),
            written: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the store for `package`, opening it on first use.
    pub async fn open(&mut self, package: &PackDescriptor) -> Result<&mut PackStore> {
        match self.stores.entry(package.name.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let store = PackStore::open(package, &self.root, self.options.dry_run).await?;
                Ok(entry.insert(store))
            }
        }
    }

    /// Get an already opened store.
    pub fn store(&self, name: &str) -> Option<&PackStore> {
        self.stores.get(name)
    }

    /// Run `transform` over every content document of `package`.
    ///
    /// Failures are captured per document: a transform error or a failed
    /// write is logged and reported, and the remaining documents still run.
    /// Side writes issued by the transform are included in the report.
    ///
    /// # Errors
    ///
    /// Returns an error only if the package cannot be opened.
    pub async fn process_documents(
        &mut self,
        package: &PackDescriptor,
        transform: &mut dyn Transform,
    ) -> Result<SyncReport> {
        let documents = self.open(package).await?.find_content();
        let mut report = SyncReport::new(self.options.dry_run);
        let start = self.pending.len();

        for document in documents {
            report.processed += 1;

            let outcome = match transform.transform(self, package, &document).await {
                Ok(outcome) => self.write_outcome(package, &document, outcome).await,
                Err(e) => Err(e),
            };

            if let Err(e) = outcome {
                tracing::error!(
                    package = %package.name,
                    document = %document.label(),
                    error = %e,
                    "Document failed"
                );
                report.errors.push(DocumentError {
                    package: package.name.clone(),
                    document: document.label(),
                    message: e.to_string(),
                });
            }
        }

        report.actions = self.pending.split_off(start);
        Ok(report)
    }

    async fn write_outcome(
        &mut self,
        package: &PackDescriptor,
        original: &Document,
        outcome: Option<Document>,
    ) -> Result<()> {
        let id = original.id().ok_or_else(|| Error::MissingField {
            document: original.label(),
            field: ID_KEY.to_string(),
        })?;
        let name = original.name().unwrap_or_default().to_string();

        match outcome {
            None => {
                let removed = self.open(package).await?.remove(id).await?;
                if removed > 0 {
                    self.record(
                        package,
                        SyncAction::Removed {
                            package: package.name.clone(),
                            id: id.to_string(),
                            name,
                        },
                    );
                }
            }
            Some(mut updated) => {
                updated.set(ID_KEY, id);
                if &updated == original {
                    return Ok(());
                }

                self.log_diff(original, &updated);
                let name = updated.name().unwrap_or(&name).to_string();
                let replaced = self.open(package).await?.replace(id, updated).await?;
                if replaced > 0 {
                    self.record(
                        package,
                        SyncAction::Updated {
                            package: package.name.clone(),
                            id: id.to_string(),
                            name,
                        },
                    );
                }
            }
        }

        Ok(())
    }

    /// Set `fields` on one document, writing only if a field differs.
    ///
    /// Returns whether a write happened.
    pub async fn apply_fields(
        &mut self,
        package: &PackDescriptor,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<bool> {
        let store = self.open(package).await?;
        let before = store
            .get(id)
            .cloned()
            .ok_or_else(|| Error::DocumentNotFound {
                package: package.name.clone(),
                id: id.to_string(),
            })?;

        if !before.differs_from(&fields) {
            return Ok(false);
        }

        store.update(id, &fields).await?;
        let mut after = before.clone();
        after.merge_fields(&fields);

        self.log_diff(&before, &after);
        self.record(
            package,
            SyncAction::Updated {
                package: package.name.clone(),
                id: id.to_string(),
                name: before.name().unwrap_or_default().to_string(),
            },
        );
        Ok(true)
    }

    /// Insert a new document and return it as stored (with its id).
    pub async fn insert_document(
        &mut self,
        package: &PackDescriptor,
        document: Document,
    ) -> Result<Document> {
        let store = self.open(package).await?;
        let id = store.insert(document).await?;
        let stored = store
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::DocumentNotFound {
                package: package.name.clone(),
                id: id.clone(),
            })?;

        self.record(
            package,
            SyncAction::Created {
                package: package.name.clone(),
                id,
                name: stored.name().unwrap_or_default().to_string(),
            },
        );
        Ok(stored)
    }

    /// Compact one package. Call only after its pass has completed.
    pub async fn compact(&mut self, package: &PackDescriptor) -> Result<SyncAction> {
        self.open(package).await?.compact().await?;
        self.written.retain(|p| p.name != package.name);

        let action = SyncAction::Compacted {
            package: package.name.clone(),
        };
        if self.options.dry_run {
            tracing::info!("[dry-run] Would compact {}", package.name);
        } else {
            tracing::info!("{}", action);
        }
        Ok(action)
    }

    /// Compact every package written since its last compaction.
    pub async fn compact_written(&mut self) -> Result<Vec<SyncAction>> {
        let packages = std::mem::take(&mut self.written);
        let mut actions = Vec::with_capacity(packages.len());
        for package in &packages {
            actions.push(self.compact(package).await?);
        }
        Ok(actions)
    }

    /// Drain writes performed outside [`SyncEngine::process_documents`].
    pub fn take_actions(&mut self) -> Vec<SyncAction> {
        std::mem::take(&mut self.pending)
    }

    fn record(&mut self, package: &PackDescriptor, action: SyncAction) {
        if self.options.dry_run {
            tracing::info!("[dry-run] {}", action);
        } else {
            tracing::info!("{}", action);
        }

        if !self.written.iter().any(|p| p.name == package.name) {
            self.written.push(package.clone());
        }
        self.pending.push(action);
    }

    fn log_diff(&self, before: &Document, after: &Document) {
        if !self.options.dry_run {
            return;
        }
        let (Ok(old), Ok(new)) = (
            serde_json::to_string_pretty(before),
            serde_json::to_string_pretty(after),
        ) else {
            return;
        };

        let diff = TextDiff::from_lines(&old, &new)
            .unified_diff()
            .context_radius(2)
            .header("stored", "synchronized")
            .to_string();
        tracing::info!("[dry-run] {}\n{}", after.label(), diff);
    }
}
