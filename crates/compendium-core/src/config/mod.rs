//! Configuration for a pipeline run
//!
//! A [`Workspace`] bundles the workspace root, the optional
//! `compendium.toml` settings and the package manifest. It is loaded once per
//! invocation, before any pass starts; every failure here is fatal.

mod manifest;
mod settings;

pub use manifest::{EntityType, Manifest, PackDescriptor};
pub use settings::{
    JournalSettings, SETTINGS_FILE, Settings, SpellSettings, TokenSettings, ValidationSettings,
};

use std::path::{Path, PathBuf};

use crate::Result;

/// Root directory, settings and manifest of one compendium.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    settings: Settings,
    manifest: Manifest,
}

impl Workspace {
    /// Load settings and manifest from `root`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the manifest is missing or malformed,
    /// or if `compendium.toml` exists but is invalid.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let settings = Settings::load(&root)?;
        let manifest = Manifest::load(&root.join(&settings.manifest))?;

        tracing::debug!(
            namespace = %manifest.name,
            packages = manifest.packs.len(),
            "Loaded manifest"
        );

        Ok(Self {
            root,
            settings,
            manifest,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Resolve a workspace-relative path.
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }
}
