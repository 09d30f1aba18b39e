//! Cross-reference registry
//!
//! A [`Registry`] indexes documents of one entity type by the slug of their
//! display name. It is built fresh for every run, by a read-only pass over the
//! relevant packages, and dropped when the run ends.
//!
//! Slugs are not injective. When two documents share a slug the one indexed
//! last replaces the earlier one; the collision is logged at warn level.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::config::{EntityType, Manifest, PackDescriptor};
use crate::document::Document;
use crate::slug::slugify;
use crate::sync::{SyncEngine, Transform};
use crate::Result;

/// A registered document and the package that owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub document: Document,
    pub package: PackDescriptor,
}

impl RegistryEntry {
    pub fn name(&self) -> &str {
        self.document.name().unwrap_or_default()
    }

    pub fn id(&self) -> Option<&str> {
        self.document.id()
    }
}

/// Slug-keyed index of documents of one entity type.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<String, RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every document of `entity` across all matching packages.
    pub async fn build(
        engine: &mut SyncEngine,
        manifest: &Manifest,
        entity: EntityType,
    ) -> Result<Self> {
        let registry = Self::build_from(engine, manifest.packages(entity)).await?;
        tracing::info!(entity = %entity, entries = registry.len(), "Populated registry");
        Ok(registry)
    }

    /// Index every document of the given packages, in order.
    pub async fn build_from<'a>(
        engine: &mut SyncEngine,
        packages: impl IntoIterator<Item = &'a PackDescriptor>,
    ) -> Result<Self> {
        let mut registry = Self::new();
        for package in packages {
            let mut indexer = Indexer {
                registry: &mut registry,
            };
            engine.process_documents(package, &mut indexer).await?;
        }
        Ok(registry)
    }

    /// Register `document` under the slug of its name.
    ///
    /// Returns the entry it replaced, if any. Unnamed documents are ignored.
    pub fn register(
        &mut self,
        package: &PackDescriptor,
        document: Document,
    ) -> Option<RegistryEntry> {
        let name = document.name()?.to_string();
        let slug = slugify(&name);

        let replaced = self.entries.insert(
            slug.clone(),
            RegistryEntry {
                document,
                package: package.clone(),
            },
        );

        if let Some(previous) = &replaced
            && (previous.name() != name || previous.package.name != package.name)
        {
            tracing::warn!(
                slug = %slug,
                previous = %previous.name(),
                previous_package = %previous.package.name,
                current = %name,
                current_package = %package.name,
                "Slug collision; the later document wins"
            );
        }

        replaced
    }

    /// Exact slug lookup.
    pub fn get(&self, slug: &str) -> Option<&RegistryEntry> {
        self.entries.get(slug)
    }

    /// Lookup by display name (slugified first).
    pub fn find(&self, name: &str) -> Option<&RegistryEntry> {
        self.get(&slugify(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Identity transform that indexes every document it sees.
struct Indexer<'r> {
    registry: &'r mut Registry,
}

#[async_trait]
impl<'r> Transform for Indexer<'r> {
    async fn transform(
        &mut self,
        _engine: &mut SyncEngine,
        package: &PackDescriptor,
        document: &Document,
    ) -> Result<Option<Document>> {
        self.registry.register(package, document.clone());
        Ok(Some(document.clone()))
    }
}
