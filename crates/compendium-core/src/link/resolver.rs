//! Spell link resolution and the spell import transform

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::config::PackDescriptor;
use crate::document::{Document, ID_KEY, NAME_KEY};
use crate::registry::{Registry, RegistryEntry};
use crate::slug::slugify;
use crate::sync::{SyncEngine, Transform};
use crate::{Error, Result};

use super::format::{Formatter, SpellLinks};
use super::fragments::strip_derived;

/// Sort order given to synthesized journals so they list after authored ones.
pub const SYNTHESIZED_JOURNAL_SORT: i64 = 100001;

const DESCRIPTION_PATH: &str = "data.description.value";
const LEGACY_FIELDS: [&str; 3] = ["data.corruption", "data.manifestation", "data.misfire"];

impl SpellLinks {
    /// Look up the tables and journal related to the spell called `name`.
    ///
    /// A journal is only linked alongside a results table; a spell without
    /// one carries no Spell Data footer even if a same-named journal exists.
    pub fn resolve(name: &str, tables: &Registry, journals: &Registry) -> Self {
        let slug = slugify(name);
        let table = |suffix: &str| tables.get(&format!("{slug}{suffix}")).cloned();
        let results = table("");
        let journal = results.as_ref().and_then(|_| journals.get(&slug).cloned());

        Self {
            results,
            manifestation: table("-manifestation"),
            misfire: table("-misfire"),
            corruption: table("-corruption"),
            journal,
        }
    }
}

/// Transform that merges authored overrides into spells and links them to
/// their tables and journals.
///
/// The table registry must be fully built before the first spell runs. The
/// journal registry is updated as journals are created, so a journal made
/// for one spell is found by later spells sharing its slug.
pub struct SpellLinker<'a> {
    formatter: Formatter,
    tables: &'a Registry,
    journals: &'a mut Registry,
    /// Package receiving synthesized journals; `None` disables synthesis
    journal_pack: Option<PackDescriptor>,
    /// Absolute directory of `<package>/<slug>.yaml` overrides
    metadata_dir: PathBuf,
}

impl<'a> SpellLinker<'a> {
    pub fn new(
        formatter: Formatter,
        tables: &'a Registry,
        journals: &'a mut Registry,
        journal_pack: Option<PackDescriptor>,
        metadata_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            formatter,
            tables,
            journals,
            journal_pack,
            metadata_dir: metadata_dir.into(),
        }
    }

    /// Path of the override file for a stored spell.
    pub fn override_path(&self, package: &PackDescriptor, name: &str) -> PathBuf {
        self.metadata_dir
            .join(&package.name)
            .join(format!("{}.yaml", slugify(name)))
    }

    /// Create or refresh the journal for `spell` and return its registry entry.
    async fn upsert_journal(
        &mut self,
        engine: &mut SyncEngine,
        spell: &Document,
        content: String,
    ) -> Result<Option<RegistryEntry>> {
        let Some(journal_pack) = &self.journal_pack else {
            return Ok(None);
        };
        let name = spell.name().unwrap_or_default();
        let img = spell.get("img").cloned();

        if let Some(existing) = self.journals.find(name).cloned() {
            let id = required_id(&existing.document)?;
            let mut fields = Map::new();
            fields.insert("content".into(), Value::String(content));
            if let Some(img) = img {
                fields.insert("img".into(), img);
            }

            if engine.apply_fields(&existing.package, id, fields).await?
                && let Some(refreshed) = engine
                    .store(&existing.package.name)
                    .and_then(|store| store.get(id))
                    .cloned()
            {
                self.journals.register(&existing.package, refreshed);
            }
        } else {
            let mut journal = Document::new();
            journal.set(NAME_KEY, name);
            journal.set("sort", SYNTHESIZED_JOURNAL_SORT);
            journal.set("content", content);
            if let Some(img) = img {
                journal.set("img", img);
            }

            let stored = engine.insert_document(journal_pack, journal).await?;
            self.journals.register(journal_pack, stored);
        }

        Ok(self.journals.find(name).cloned())
    }
}

#[async_trait]
impl<'a> Transform for SpellLinker<'a> {
    async fn transform(
        &mut self,
        engine: &mut SyncEngine,
        package: &PackDescriptor,
        document: &Document,
    ) -> Result<Option<Document>> {
        let mut spell = document.clone();
        for field in LEGACY_FIELDS {
            spell.remove_path(field);
        }
        if let Some(description) = spell.str_at(DESCRIPTION_PATH) {
            let stripped = strip_derived(description);
            spell.set_path(DESCRIPTION_PATH, stripped);
        }

        let stored_name = document.name().unwrap_or_default();
        let override_path = self.override_path(package, stored_name);
        match read_override(&override_path).await? {
            Some(fields) => spell.merge_fields(&fields),
            None => tracing::info!(
                spell = %document.label(),
                path = %override_path.display(),
                "No override file; keeping stored fields"
            ),
        }

        let name = spell.name().unwrap_or_default().to_string();
        let description = spell.str_at(DESCRIPTION_PATH).unwrap_or_default().to_string();
        let mut links = SpellLinks::resolve(&name, self.tables, &*self.journals);
        let img = spell.get("img").cloned();

        if let Some(results) = links.results.clone() {
            spell.set_path(
                "data.results",
                json!({
                    "table": results.name(),
                    "collection": self.formatter.collection(&results),
                }),
            );

            let content = self.formatter.journal_content(&description, &spell, &links);
            links.journal = self.upsert_journal(engine, &spell, content).await?;

            let mut fields = Map::new();
            fields.insert(
                "description".into(),
                Value::String(self.formatter.table_description(&description, &spell, &links)),
            );
            if let Some(img) = &img {
                fields.insert("img".into(), img.clone());
            }
            engine
                .apply_fields(&results.package, required_id(&results.document)?, fields)
                .await?;
        }

        if let Some(img) = &img {
            for table in [&links.manifestation, &links.misfire, &links.corruption]
                .into_iter()
                .flatten()
            {
                let mut fields = Map::new();
                fields.insert("img".into(), img.clone());
                engine
                    .apply_fields(&table.package, required_id(&table.document)?, fields)
                    .await?;
            }
        }

        spell.set_path(
            DESCRIPTION_PATH,
            self.formatter.item_description(&description, &links),
        );
        Ok(Some(spell))
    }
}

/// Read the authored override for one spell.
///
/// A missing file is `Ok(None)`; an empty file is an empty override.
async fn read_override(path: &Path) -> Result<Option<Map<String, Value>>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(Error::Source {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
        }
    };

    let fields: Option<Map<String, Value>> =
        serde_yaml::from_str(&content).map_err(|e| Error::Source {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(Some(fields.unwrap_or_default()))
}

fn required_id(document: &Document) -> Result<&str> {
    document.id().ok_or_else(|| Error::MissingField {
        document: document.label(),
        field: ID_KEY.to_string(),
    })
}
