//! File-backed package store
//!
//! Each package is an append-only log of JSON documents (see [`log`]). A
//! [`PackStore`] replays the log into memory when opened, appends one line per
//! write, and rewrites the log to its minimal snapshot on [`PackStore::compact`].
//!
//! Writes are awaited one at a time; nothing in the store coordinates
//! concurrent writers.

mod log;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::PackDescriptor;
use crate::document::{Document, ID_KEY};
use crate::{Error, Result};

/// Length of store-assigned document ids.
pub const ID_LENGTH: usize = 16;

/// Open handle to one package's document log.
#[derive(Debug)]
pub struct PackStore {
    descriptor: PackDescriptor,
    path: PathBuf,
    documents: IndexMap<String, Document>,
    dry_run: bool,
}

impl PackStore {
    /// Open the package under `root`, creating an empty log if none exists.
    ///
    /// In dry-run mode a missing log is treated as empty and never created.
    pub async fn open(descriptor: &PackDescriptor, root: &Path, dry_run: bool) -> Result<Self> {
        let path = root.join(&descriptor.path);
        let io_err = |e| Error::store_io(&descriptor.name, &path, e);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if !dry_run {
                    if let Some(parent) = path.parent() {
                        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
                    }
                    tokio::fs::write(&path, "").await.map_err(io_err)?;
                    tracing::info!(package = %descriptor.name, path = %path.display(), "Created package log");
                }
                String::new()
            }
            Err(e) => return Err(io_err(e)),
        };

        let documents = log::replay(&path, &content)?;
        tracing::debug!(
            package = %descriptor.name,
            documents = documents.len(),
            "Opened package"
        );

        Ok(Self {
            descriptor: descriptor.clone(),
            path,
            documents,
            dry_run,
        })
    }

    pub fn descriptor(&self) -> &PackDescriptor {
        &self.descriptor
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    /// All documents matching `predicate`, in log order.
    pub fn find(&self, predicate: impl Fn(&Document) -> bool) -> Vec<Document> {
        self.documents
            .values()
            .filter(|doc| predicate(doc))
            .cloned()
            .collect()
    }

    /// Content documents: those carrying a name.
    pub fn find_content(&self) -> Vec<Document> {
        self.find(|doc| doc.name().is_some())
    }

    /// Insert a document, assigning an id if it has none.
    ///
    /// Returns the id the document is stored under.
    pub async fn insert(&mut self, mut document: Document) -> Result<String> {
        let id = match document.id() {
            Some(id) if !self.documents.contains_key(id) => id.to_string(),
            _ => {
                let id = self.generate_id();
                document.set(ID_KEY, id.clone());
                id
            }
        };

        self.append(log::encode_document(&document)?).await?;
        self.documents.insert(id.clone(), document);
        Ok(id)
    }

    /// Set `fields` on the document with `id`.
    ///
    /// Returns the number of documents replaced (0 if `id` is unknown).
    pub async fn update(&mut self, id: &str, fields: &Map<String, Value>) -> Result<usize> {
        let Some(existing) = self.documents.get(id) else {
            return Ok(0);
        };

        let mut updated = existing.clone();
        updated.merge_fields(fields);
        updated.set(ID_KEY, id);

        self.append(log::encode_document(&updated)?).await?;
        self.documents.insert(id.to_string(), updated);
        Ok(1)
    }

    /// Replace the document with `id` wholesale, keeping its id.
    ///
    /// Returns the number of documents replaced (0 if `id` is unknown).
    pub async fn replace(&mut self, id: &str, mut document: Document) -> Result<usize> {
        if !self.documents.contains_key(id) {
            return Ok(0);
        }
        document.set(ID_KEY, id);

        self.append(log::encode_document(&document)?).await?;
        self.documents.insert(id.to_string(), document);
        Ok(1)
    }

    /// Remove the document with `id`.
    ///
    /// Returns the number of documents removed (0 if `id` is unknown).
    pub async fn remove(&mut self, id: &str) -> Result<usize> {
        if !self.documents.contains_key(id) {
            return Ok(0);
        }

        self.append(log::encode_tombstone(id)?).await?;
        self.documents.shift_remove(id);
        Ok(1)
    }

    /// Rewrite the log as one line per live document.
    ///
    /// Must only be called once every write of the current pass has been
    /// awaited. The locked rewrite runs on the blocking pool. A no-op in
    /// dry-run mode.
    pub async fn compact(&self) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }

        let snapshot = log::encode_snapshot(self.documents.values())?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            compendium_fs::io::write_atomic(&path, snapshot.as_bytes())
        })
        .await
        .map_err(|e| {
            Error::store_io(&self.descriptor.name, &self.path, std::io::Error::other(e))
        })??;
        Ok(())
    }

    async fn append(&self, mut line: String) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        line.push('\n');

        let io_err = |e| Error::store_io(&self.descriptor.name, &self.path, e);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(io_err)?;
        file.write_all(line.as_bytes()).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;
        Ok(())
    }

    fn generate_id(&self) -> String {
        loop {
            let candidate: String = Uuid::new_v4()
                .simple()
                .to_string()
                .chars()
                .take(ID_LENGTH)
                .collect();
            if !self.documents.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}
