//! [`TestCompendium`] builder for pipeline test scenarios.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// A temporary compendium root with helpers to lay out manifests, package
/// logs and authored sources, and to inspect the results.
///
/// # Example
///
/// ```rust,no_run
/// use compendium_test_utils::TestCompendium;
/// use serde_json::json;
///
/// let compendium = TestCompendium::new();
/// compendium.write_manifest("dcc-core-book", &[("tables", "RollTable", "packs/tables.db")]);
/// compendium.write_pack("packs/tables.db", &[json!({"_id": "t1", "name": "Sleep"})]);
/// compendium.assert_file_exists("packs/tables.db");
/// ```
pub struct TestCompendium {
    temp_dir: TempDir,
}

impl Default for TestCompendium {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCompendium {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `module.json` with one entry per `(name, entity, path)`.
    pub fn write_manifest(&self, namespace: &str, packs: &[(&str, &str, &str)]) {
        let packs: Vec<Value> = packs
            .iter()
            .map(|(name, entity, path)| json!({"name": name, "entity": entity, "path": path}))
            .collect();
        let manifest = json!({"name": namespace, "title": "Test Compendium", "packs": packs});
        self.write("module.json", &serde_json::to_string_pretty(&manifest).unwrap());
    }

    /// Write `compendium.toml`.
    pub fn write_settings(&self, toml: &str) {
        self.write("compendium.toml", toml);
    }

    /// Write a package log with one line per document.
    pub fn write_pack(&self, path: &str, documents: &[Value]) {
        let mut content = String::new();
        for document in documents {
            content.push_str(&serde_json::to_string(document).unwrap());
            content.push('\n');
        }
        self.write(path, &content);
    }

    /// Write a spell override at `<metadata_dir>/<package>/<slug>.yaml`
    /// using the default metadata directory.
    pub fn write_override(&self, package: &str, slug: &str, yaml: &str) {
        self.write(&format!("metadata/spells/{package}/{slug}.yaml"), yaml);
    }

    /// Write any file below the root, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let full_path = self.path(relative);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", full_path.display()));
    }

    /// Raw contents of a file below the root.
    pub fn read(&self, relative: &str) -> String {
        let full_path = self.path(relative);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Non-empty lines of a package log.
    pub fn pack_lines(&self, path: &str) -> Vec<Value> {
        self.read(path)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    /// Live documents of a package log, in first-seen order, after applying
    /// supersession and tombstones.
    pub fn pack_documents(&self, path: &str) -> Vec<Value> {
        let mut order: Vec<String> = Vec::new();
        let mut live: HashMap<String, Value> = HashMap::new();

        for line in self.pack_lines(path) {
            if line.get("$$indexCreated").is_some() {
                continue;
            }
            let id = line["_id"].as_str().unwrap().to_string();
            if line.get("$$deleted") == Some(&Value::Bool(true)) {
                live.remove(&id);
                order.retain(|known| known != &id);
                continue;
            }
            if !live.contains_key(&id) {
                order.push(id.clone());
            }
            live.insert(id, line);
        }

        order.into_iter().filter_map(|id| live.remove(&id)).collect()
    }

    /// The live document named `name` in a package log.
    ///
    /// # Panics
    /// Panics if no such document exists.
    pub fn find_document(&self, path: &str, name: &str) -> Value {
        self.pack_documents(path)
            .into_iter()
            .find(|document| document["name"] == name)
            .unwrap_or_else(|| panic!("No document named {name} in {path}"))
    }

    /// Assert that `path` (relative to the root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the root) does not exist.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` contains `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read(path);
        assert!(
            file_content.contains(content),
            "File {path} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }
}
