//! Manifest parsing for `module.json`
//!
//! The manifest names the compendium namespace and lists every package with
//! its entity type and storage path. Fields the pipeline has no use for are
//! ignored.

use std::fmt;
use std::path::{Path, PathBuf};

use compendium_fs::ConfigStore;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Entity type held by a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Item,
    RollTable,
    JournalEntry,
    Scene,
    Actor,
    /// Any type the pipeline does not process (Macro, Playlist, ...)
    #[serde(other)]
    Other,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Item => "Item",
            Self::RollTable => "RollTable",
            Self::JournalEntry => "JournalEntry",
            Self::Scene => "Scene",
            Self::Actor => "Actor",
            Self::Other => "Other",
        };
        f.write_str(name)
    }
}

/// One package entry of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackDescriptor {
    /// Package name, unique within the manifest
    pub name: String,
    /// Entity type of every document in the package
    #[serde(alias = "type")]
    pub entity: EntityType,
    /// Storage path, relative to the workspace root
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PackDescriptor {
    pub fn new(name: impl Into<String>, entity: EntityType, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            entity,
            path: path.into(),
            label: None,
        }
    }

    /// `<namespace>.<package>`, the collection id used in link descriptors.
    pub fn collection(&self, namespace: &str) -> String {
        format!("{}.{}", namespace, self.name)
    }
}

/// Parsed package manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Namespace every link token is qualified with
    pub name: String,
    /// Packages in declaration order
    #[serde(default)]
    pub packs: Vec<PackDescriptor>,
}

impl Manifest {
    /// Parse a manifest from JSON content.
    ///
    /// ```
    /// use compendium_core::config::{EntityType, Manifest};
    ///
    /// let manifest = Manifest::parse(r#"{
    ///     "name": "dcc-core-book",
    ///     "packs": [
    ///         {"name": "dcc-core-spells-wizard", "entity": "Item", "path": "packs/wizard.db"}
    ///     ]
    /// }"#).unwrap();
    ///
    /// assert_eq!(manifest.packages(EntityType::Item).count(), 1);
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let inline = Path::new("<inline>");
        let manifest: Manifest =
            serde_json::from_str(content).map_err(|e| Error::ConfigInvalid {
                path: inline.to_path_buf(),
                message: e.to_string(),
            })?;
        manifest.check_unique_names(inline)?;
        Ok(manifest)
    }

    /// Load a manifest from a JSON, YAML or TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if the file is missing and `ConfigInvalid` if
    /// it cannot be parsed or declares the same package twice.
    pub fn load(path: &Path) -> Result<Self> {
        let manifest: Manifest = ConfigStore::new()
            .load(path)
            .map_err(|e| Error::from_config_fs(path, e))?;
        manifest.check_unique_names(path)?;
        Ok(manifest)
    }

    fn check_unique_names(&self, path: &Path) -> Result<()> {
        for (index, pack) in self.packs.iter().enumerate() {
            if self.packs[..index].iter().any(|p| p.name == pack.name) {
                return Err(Error::ConfigInvalid {
                    path: path.to_path_buf(),
                    message: format!("package {} is declared more than once", pack.name),
                });
            }
        }
        Ok(())
    }

    /// All packages holding the given entity type, in manifest order.
    pub fn packages(&self, entity: EntityType) -> impl Iterator<Item = &PackDescriptor> {
        self.packs.iter().filter(move |pack| pack.entity == entity)
    }

    /// Look up a package by name.
    pub fn package(&self, name: &str) -> Option<&PackDescriptor> {
        self.packs.iter().find(|pack| pack.name == name)
    }

    /// Look up a package by name, failing with `PackageNotFound`.
    pub fn require_package(&self, name: &str) -> Result<&PackDescriptor> {
        self.package(name).ok_or_else(|| Error::PackageNotFound {
            name: name.to_string(),
        })
    }
}
