//! Filesystem helpers for the compendium pack synchronizer
//!
//! Provides atomic locked writes, text reads, and format-agnostic loading of
//! configuration and override files.

pub mod config;
pub mod error;
pub mod io;

pub use config::{ConfigFormat, ConfigStore};
pub use error::{Error, Result};
