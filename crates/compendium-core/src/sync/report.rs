//! Reports produced by synchronization passes

use std::fmt;

use serde::Serialize;

/// A single write performed (or, in dry-run, simulated) by a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SyncAction {
    Created {
        package: String,
        id: String,
        name: String,
    },
    Updated {
        package: String,
        id: String,
        name: String,
    },
    Removed {
        package: String,
        id: String,
        name: String,
    },
    Compacted {
        package: String,
    },
}

impl SyncAction {
    /// Whether this action changed a document (compaction does not).
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Compacted { .. })
    }

    pub fn package(&self) -> &str {
        match self {
            Self::Created { package, .. }
            | Self::Updated { package, .. }
            | Self::Removed { package, .. }
            | Self::Compacted { package } => package,
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { package, id, name } => {
                write!(f, "Created {name} ({id}) in {package}")
            }
            Self::Updated { package, id, name } => {
                write!(f, "Updated {name} ({id}) in {package}")
            }
            Self::Removed { package, id, name } => {
                write!(f, "Removed {name} ({id}) from {package}")
            }
            Self::Compacted { package } => write!(f, "Compacted {package}"),
        }
    }
}

/// A document whose transform or write failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentError {
    pub package: String,
    /// `name (id)` of the failing document
    pub document: String,
    pub message: String,
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}: {}", self.document, self.package, self.message)
    }
}

/// Report from one or more synchronization passes
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// Whether the writes were simulated
    pub dry_run: bool,
    /// Documents visited
    pub processed: usize,
    /// Writes performed, in order
    pub actions: Vec<SyncAction>,
    /// Per-document failures; siblings of a failing document still ran
    pub errors: Vec<DocumentError>,
}

impl SyncReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// True when every document was processed without error.
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of create/update/remove actions.
    pub fn writes(&self) -> usize {
        self.actions.iter().filter(|a| a.is_write()).count()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: SyncReport) {
        self.dry_run |= other.dry_run;
        self.processed += other.processed;
        self.actions.extend(other.actions);
        self.errors.extend(other.errors);
    }
}

/// Options for write passes
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// If true, simulate writes without touching package files.
    pub dry_run: bool,
}
