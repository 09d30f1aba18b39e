//! Document synchronization
//!
//! This module provides:
//! - **engine**: the [`SyncEngine`] owning every package store of a run, and
//!   the [`Transform`] seam applied per document
//! - **report**: actions, per-document errors and options for write passes

mod engine;
mod report;

pub use engine::{SyncEngine, Transform};
pub use report::{DocumentError, SyncAction, SyncOptions, SyncReport};
