//! Scene note validation
//!
//! Every note embedded in a scene must name a journal through its
//! `flags.<scope>.journalName` tag, and that name must resolve in the journal
//! registry. Failures are collected; one bad note never stops the pass.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::PackDescriptor;
use crate::document::{Document, Scene};
use crate::registry::Registry;
use crate::sync::{DocumentError, SyncEngine, Transform};
use crate::Result;

/// Process exit code signalling that at least one note failed validation.
pub const VALIDATION_FAILURE_EXIT_CODE: i32 = 127;

/// Why a note failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NoteIssue {
    /// The note carries no journal-name tag
    MissingJournalName,
    /// The tag names a journal that is not registered
    UnknownJournal { journal_name: String },
}

impl fmt::Display for NoteIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingJournalName => write!(f, "no journalName flag"),
            Self::UnknownJournal { journal_name } => {
                write!(f, "no journal found named {journal_name}")
            }
        }
    }
}

/// One failed note reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteFailure {
    pub package: String,
    pub scene_id: Option<String>,
    pub scene_name: Option<String>,
    pub note_id: Option<String>,
    /// Journal id the note originally pointed at
    pub entry_id: Option<String>,
    pub issue: NoteIssue,
}

impl fmt::Display for NoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "note {} in scene {} ({}) with original entry ID {}: {}",
            self.note_id.as_deref().unwrap_or("<no id>"),
            self.scene_name.as_deref().unwrap_or("<unnamed>"),
            self.scene_id.as_deref().unwrap_or("<no id>"),
            self.entry_id.as_deref().unwrap_or("<none>"),
            self.issue
        )
    }
}

/// Aggregate outcome of a validation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub scenes: usize,
    pub notes: usize,
    pub failures: Vec<NoteFailure>,
    /// Scenes whose payload could not be read at all
    pub errors: Vec<DocumentError>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty() && self.errors.is_empty()
    }

    /// `0` when every note resolved, otherwise [`VALIDATION_FAILURE_EXIT_CODE`].
    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            VALIDATION_FAILURE_EXIT_CODE
        }
    }
}

/// Read-only transform checking every note of every scene it sees.
pub struct NoteValidator<'a> {
    journals: &'a Registry,
    scope: String,
    report: ValidationReport,
}

impl<'a> NoteValidator<'a> {
    pub fn new(journals: &'a Registry, scope: impl Into<String>) -> Self {
        Self {
            journals,
            scope: scope.into(),
            report: ValidationReport::default(),
        }
    }

    /// Check the notes of one scene, recording each failure.
    pub fn check_scene(&mut self, package: &PackDescriptor, document: &Document) -> Result<()> {
        let scene: Scene = document.payload()?;
        tracing::info!(scene = %document.label(), "Processing scene");
        self.report.scenes += 1;

        for note in &scene.notes {
            self.report.notes += 1;

            let issue = match note.journal_name(&self.scope) {
                None => NoteIssue::MissingJournalName,
                Some(name) if self.journals.find(name).is_none() => NoteIssue::UnknownJournal {
                    journal_name: name.to_string(),
                },
                Some(name) => {
                    tracing::info!(
                        note = note.id.as_deref().unwrap_or_default(),
                        journal = %name,
                        "Note references journal"
                    );
                    continue;
                }
            };

            let failure = NoteFailure {
                package: package.name.clone(),
                scene_id: document.id().map(str::to_string),
                scene_name: document.name().map(str::to_string),
                note_id: note.id.clone(),
                entry_id: note.entry_id.clone(),
                issue,
            };
            tracing::error!("{}", failure);
            self.report.failures.push(failure);
        }

        Ok(())
    }

    /// Finish the run, folding in scenes that could not be read.
    pub fn finish(self, errors: Vec<DocumentError>) -> ValidationReport {
        let mut report = self.report;
        report.errors.extend(errors);

        if report.passed() {
            tracing::info!(
                scenes = report.scenes,
                notes = report.notes,
                "All scene notes passed validation"
            );
        } else {
            tracing::error!(
                failures = report.failures.len(),
                unreadable = report.errors.len(),
                "One or more scene notes failed validation"
            );
        }
        report
    }
}

#[async_trait]
impl<'a> Transform for NoteValidator<'a> {
    async fn transform(
        &mut self,
        _engine: &mut SyncEngine,
        package: &PackDescriptor,
        document: &Document,
    ) -> Result<Option<Document>> {
        self.check_scene(package, document)?;
        Ok(Some(document.clone()))
    }
}
