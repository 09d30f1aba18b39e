//! Cross-reference linking and content rendering
//!
//! This module provides:
//! - **fragments**: the derived footer kinds and their strip patterns
//! - **format**: link tokens and the HTML rendered into items, tables and
//!   journals
//! - **resolver**: slug-suffix link discovery and the [`SpellLinker`]
//!   transform used by spell import

mod format;
mod fragments;
mod resolver;

pub use format::{Formatter, SpellLinks, format_range};
pub use fragments::{Footer, strip_derived};
pub use resolver::{SYNTHESIZED_JOURNAL_SORT, SpellLinker};
