//! Package documents and typed views over their payloads
//!
//! A [`Document`] is an open JSON object. The pipeline reads and writes a
//! handful of known fields and carries everything else through untouched, so
//! equality between two documents is plain structural equality.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Key of the store-assigned document id.
pub const ID_KEY: &str = "_id";
/// Key of the display name, which doubles as the link key.
pub const NAME_KEY: &str = "name";

/// A single document stored in a package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap an already-parsed JSON value; anything but an object is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::InvalidPayload {
                document: "<unnamed>".into(),
                message: format!("expected a JSON object, found {other}"),
            }),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_KEY).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get(NAME_KEY).and_then(Value::as_str)
    }

    /// Name and id for log lines, e.g. `Magic Missile (a1b2c3)`.
    pub fn label(&self) -> String {
        format!(
            "{} ({})",
            self.name().unwrap_or("<unnamed>"),
            self.id().unwrap_or("<no id>")
        )
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Look up a dotted path such as `data.description.value`.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// String at a dotted path, if present and a string.
    pub fn str_at(&self, path: &str) -> Option<&str> {
        self.get_path(path).and_then(Value::as_str)
    }

    /// Set a dotted path, creating (or replacing non-object) intermediate
    /// objects along the way.
    pub fn set_path(&mut self, path: &str, value: impl Into<Value>) {
        let (parents, leaf) = match path.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, path),
        };

        let mut target = &mut self.0;
        if let Some(parents) = parents {
            for segment in parents.split('.') {
                let slot = target
                    .entry(segment.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                target = match slot {
                    Value::Object(map) => map,
                    _ => unreachable!("slot was just made an object"),
                };
            }
        }
        target.insert(leaf.to_string(), value.into());
    }

    /// Remove a dotted path. Missing intermediate objects are not an error.
    pub fn remove_path(&mut self, path: &str) -> Option<Value> {
        let (parents, leaf) = match path.rsplit_once('.') {
            Some((parents, leaf)) => (parents, leaf),
            None => return self.0.remove(path),
        };

        let mut target = &mut self.0;
        for segment in parents.split('.') {
            target = target.get_mut(segment)?.as_object_mut()?;
        }
        target.remove(leaf)
    }

    /// Shallow merge: every top-level field of `fields` replaces the
    /// document's field of the same name.
    pub fn merge_fields(&mut self, fields: &Map<String, Value>) {
        for (key, value) in fields {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Whether merging `fields` would change this document.
    pub fn differs_from(&self, fields: &Map<String, Value>) -> bool {
        fields
            .iter()
            .any(|(key, value)| self.0.get(key) != Some(value))
    }

    /// Deserialize the whole document into a typed payload view.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.0.clone())).map_err(|e| Error::InvalidPayload {
            document: self.label(),
            message: e.to_string(),
        })
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        Value::Object(document.0)
    }
}

/// One ranged outcome of a roll table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableResult {
    pub range: [i64; 2],
    #[serde(default)]
    pub text: String,
}

/// Roll-table payload: a dice formula plus ordered outcomes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RollTable {
    #[serde(default)]
    pub formula: String,
    #[serde(default)]
    pub results: Vec<TableResult>,
}

/// A map-note annotation embedded in a scene.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneNote {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "entryId", default)]
    pub entry_id: Option<String>,
    /// Module flags; `null` and non-object values carry no tags
    #[serde(default)]
    pub flags: Option<Value>,
}

impl SceneNote {
    /// The journal-name tag stored under `flags.<scope>.journalName`.
    ///
    /// Empty strings, `null` and any missing level count as absent.
    pub fn journal_name(&self, scope: &str) -> Option<&str> {
        self.flags
            .as_ref()?
            .get(scope)?
            .get("journalName")?
            .as_str()
            .filter(|name| !name.is_empty())
    }
}

/// Scene payload: only the notes matter to the pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: Vec<SceneNote>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
