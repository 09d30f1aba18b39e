//! Pipeline stages
//!
//! Each stage loads nothing itself: it takes an already loaded
//! [`Workspace`](crate::config::Workspace), opens its own
//! [`SyncEngine`](crate::sync::SyncEngine), runs its passes strictly in
//! sequence and returns a report. Stages are independent; the CLI runs one
//! per invocation.

mod compact;
mod journals;
mod notes;
mod spells;
mod tokens;

pub use compact::compact_all;
pub use journals::{TextSource, collect_text_sources, import_journals};
pub use notes::validate_notes;
pub use spells::import_spells;
pub use tokens::{TokenDefaults, update_tokens};
