//! Pipeline settings parsed from `compendium.toml`
//!
//! Every key is optional; the defaults reproduce the content product's
//! established layout.

use std::path::{Path, PathBuf};

use compendium_fs::ConfigStore;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// File name of the settings file at the workspace root.
pub const SETTINGS_FILE: &str = "compendium.toml";

/// Spell import settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellSettings {
    /// Regex selecting which Item packages hold spells
    pub pack_pattern: String,
    /// JournalEntry package receiving the synthesized spell journals
    pub journal_pack: Option<String>,
    /// Directory holding `<package>/<slug>.yaml` overrides
    pub metadata_dir: PathBuf,
}

impl Default for SpellSettings {
    fn default() -> Self {
        Self {
            pack_pattern: "^dcc-core-spells-".to_string(),
            journal_pack: Some("dcc-core-spell-journals".to_string()),
            metadata_dir: PathBuf::from("metadata/spells"),
        }
    }
}

/// Journal text import settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalSettings {
    /// Directory holding the authored `.html` files
    pub text_dir: PathBuf,
    /// Target JournalEntry package; defaults to the first one in the manifest
    pub pack: Option<String>,
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            text_dir: PathBuf::from("assets/text"),
            pack: None,
        }
    }
}

/// Scene note validation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Flag scope holding the `journalName` tag on each note
    pub flag_scope: String,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            flag_scope: "dcc".to_string(),
        }
    }
}

/// Actor prototype token defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenSettings {
    pub display_name: i64,
    pub display_bars: i64,
    pub bar1_attribute: String,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            display_name: 20,
            display_bars: 20,
            bar1_attribute: "attributes.hp".to_string(),
        }
    }
}

/// All pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Manifest path, relative to the workspace root
    pub manifest: PathBuf,
    pub spells: SpellSettings,
    pub journals: JournalSettings,
    pub validation: ValidationSettings,
    pub tokens: TokenSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("module.json"),
            spells: SpellSettings::default(),
            journals: JournalSettings::default(),
            validation: ValidationSettings::default(),
            tokens: TokenSettings::default(),
        }
    }
}

impl Settings {
    /// Load `compendium.toml` from `root`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the file exists but cannot be parsed, or if
    /// the spell pack pattern is not a valid regex.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(SETTINGS_FILE);
        let settings: Settings = ConfigStore::new()
            .load_optional(&path)
            .map_err(|e| Error::from_config_fs(&path, e))?
            .unwrap_or_default();

        settings
            .spell_pack_regex()
            .map_err(|e| Error::ConfigInvalid {
                path,
                message: format!("spells.pack_pattern: {e}"),
            })?;

        Ok(settings)
    }

    /// Compiled spell package pattern.
    pub fn spell_pack_regex(&self) -> std::result::Result<Regex, regex::Error> {
        Regex::new(&self.spells.pack_pattern)
    }
}
