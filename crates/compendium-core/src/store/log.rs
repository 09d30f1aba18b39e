//! Line codec for package logs
//!
//! A package log is newline-delimited JSON. Each line is either a full
//! document (superseding any earlier line with the same `_id`), a tombstone
//! `{"$$deleted": true, "_id": ...}`, or index metadata carrying
//! `$$indexCreated`, which the pipeline ignores.

use std::path::Path;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::document::{Document, ID_KEY};
use crate::{Error, Result};

const DELETED_KEY: &str = "$$deleted";
const INDEX_KEY: &str = "$$indexCreated";

/// Fraction of undecodable lines tolerated before a log counts as corrupt.
const CORRUPT_ALERT_THRESHOLD: f64 = 0.1;

/// One decoded log line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LogEntry {
    Upsert(Document),
    Delete(String),
    Index,
}

/// Decode a single non-empty line; `None` means the line is corrupt.
pub(crate) fn decode_line(line: &str) -> Option<LogEntry> {
    let Value::Object(map) = serde_json::from_str::<Value>(line).ok()? else {
        return None;
    };

    if map.contains_key(INDEX_KEY) {
        return Some(LogEntry::Index);
    }

    let id = map.get(ID_KEY)?.as_str()?.to_string();
    if map.get(DELETED_KEY).and_then(Value::as_bool) == Some(true) {
        return Some(LogEntry::Delete(id));
    }

    Some(LogEntry::Upsert(Document::from(map)))
}

/// Replay a whole log into the live document set, in first-insertion order.
pub(crate) fn replay(path: &Path, content: &str) -> Result<IndexMap<String, Document>> {
    let mut documents: IndexMap<String, Document> = IndexMap::new();
    let mut total = 0usize;
    let mut corrupt = 0usize;

    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        total += 1;
        match decode_line(line) {
            Some(LogEntry::Upsert(document)) => {
                // Documents always carry an id when decoded as an upsert
                if let Some(id) = document.id().map(str::to_string) {
                    documents.insert(id, document);
                }
            }
            Some(LogEntry::Delete(id)) => {
                documents.shift_remove(&id);
            }
            Some(LogEntry::Index) => {}
            None => {
                corrupt += 1;
                tracing::warn!(path = %path.display(), line = total, "Skipping unreadable log line");
            }
        }
    }

    if total > 0 && (corrupt as f64 / total as f64) > CORRUPT_ALERT_THRESHOLD {
        return Err(Error::CorruptLog {
            path: path.to_path_buf(),
            corrupt,
            total,
        });
    }

    Ok(documents)
}

/// Encode a document as one log line (without the trailing newline).
pub(crate) fn encode_document(document: &Document) -> Result<String> {
    Ok(serde_json::to_string(document)?)
}

/// Encode a tombstone for `id`.
pub(crate) fn encode_tombstone(id: &str) -> Result<String> {
    let mut map = Map::new();
    map.insert(DELETED_KEY.to_string(), Value::Bool(true));
    map.insert(ID_KEY.to_string(), Value::String(id.to_string()));
    Ok(serde_json::to_string(&map)?)
}

/// Encode the minimal snapshot: one line per live document.
pub(crate) fn encode_snapshot<'a>(documents: impl IntoIterator<Item = &'a Document>) -> Result<String> {
    let mut out = String::new();
    for document in documents {
        out.push_str(&encode_document(document)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path() -> &'static Path {
        Path::new("packs/test.db")
    }

    #[test]
    fn later_lines_supersede_earlier_ones() {
        let content = concat!(
            r#"{"_id":"a","name":"Sleep","sort":1}"#, "\n",
            r#"{"_id":"b","name":"Light"}"#, "\n",
            r#"{"_id":"a","name":"Sleep","sort":2}"#, "\n",
        );

        let docs = replay(path(), content).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs["a"].get("sort"), Some(&json!(2)));
        // First-insertion order is kept across supersession
        assert_eq!(docs.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn tombstones_remove_documents() {
        let content = concat!(
            r#"{"_id":"a","name":"Sleep"}"#, "\n",
            r#"{"$$deleted":true,"_id":"a"}"#, "\n",
            r#"{"$$indexCreated":{"fieldName":"name"}}"#, "\n",
        );

        assert!(replay(path(), content).unwrap().is_empty());
    }

    #[test]
    fn few_corrupt_lines_are_skipped() {
        let mut content = String::new();
        for i in 0..10 {
            content.push_str(&format!("{{\"_id\":\"d{i}\",\"name\":\"Doc {i}\"}}\n"));
        }
        content.push_str("{not json\n");

        let docs = replay(path(), &content).unwrap();
        assert_eq!(docs.len(), 10);
    }

    #[test]
    fn many_corrupt_lines_fail() {
        let content = "{\"_id\":\"a\"}\n{broken\n[1,2]\n";
        let err = replay(path(), content).unwrap_err();
        assert!(matches!(err, Error::CorruptLog { corrupt: 2, total: 3, .. }));
    }

    #[test]
    fn tombstone_round_trips_through_decoder() {
        let line = encode_tombstone("abc").unwrap();
        assert_eq!(decode_line(&line), Some(LogEntry::Delete("abc".into())));
    }
}
