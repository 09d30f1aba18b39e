//! Shared test utilities for the compendium workspace.
//!
//! This crate provides temporary compendium fixtures so that crate test
//! suites do not each hand-roll manifests and package logs. It is a
//! dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`compendium`]: the [`TestCompendium`] builder and its assertions
//! - [`fixtures`]: a ready-made spell compendium used across suites

pub mod compendium;
pub mod fixtures;

pub use compendium::TestCompendium;
