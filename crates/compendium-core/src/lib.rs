//! Core synchronization layer for compendium content packages
//!
//! This crate turns hand-authored sources into distributable packages,
//! implementing:
//!
//! - **Configuration**: the package manifest and optional `compendium.toml`
//!   settings, bundled as a [`Workspace`]
//! - **Pack stores**: append-log document collections, one per package
//! - **SyncEngine**: per-document transforms that write only what changed
//! - **Registries**: slug-keyed indexes used to resolve cross-references
//! - **Linking**: spell, roll table and journal links plus their HTML
//! - **Validation**: scene note references checked against journals
//! - **Pipeline stages**: spell import, journal import, token defaults,
//!   compaction and note validation
//!
//! # Architecture
//!
//! ```text
//!                  compendium-cli
//!                        |
//!     pipeline (spells, journals, tokens, compact, notes)
//!                        |
//!            link / validate / registry
//!                        |
//!                  sync (SyncEngine)
//!                        |
//!               store (PackStore) -- config
//!                        |
//!                  compendium-fs
//! ```
//!
//! # Example
//!
//! ```no_run
//! use compendium_core::{SyncOptions, Workspace, import_spells};
//!
//! # async fn run() -> compendium_core::Result<()> {
//! let workspace = Workspace::load(".")?;
//! let report = import_spells(&workspace, SyncOptions::default()).await?;
//! println!("{} writes, {} failures", report.writes(), report.errors.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod link;
pub mod pipeline;
pub mod registry;
pub mod slug;
pub mod store;
pub mod sync;
pub mod validate;

pub use config::{EntityType, Manifest, PackDescriptor, Settings, Workspace};
pub use document::Document;
pub use error::{Error, Result};
pub use pipeline::{compact_all, import_journals, import_spells, update_tokens, validate_notes};
pub use registry::{Registry, RegistryEntry};
pub use slug::slugify;
pub use store::PackStore;
pub use sync::{DocumentError, SyncAction, SyncEngine, SyncOptions, SyncReport, Transform};
pub use validate::{VALIDATION_FAILURE_EXIT_CODE, ValidationReport};
