use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::warn;
use serde_json::{Map, Value};
use thiserror::Error;

pub const DATA_DIR_NAME: &str = ".flowr";
pub const STORE_FILE_NAME: &str = "user-preferences.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("home directory is unavailable")]
    NoHomeDir,
    #[error("failed to create preferences directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write preferences {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// `<home>/.flowr`
pub fn default_data_dir() -> Result<PathBuf, StoreError> {
    home::home_dir()
        .filter(|home| !home.as_os_str().is_empty())
        .map(|home| home.join(DATA_DIR_NAME))
        .ok_or(StoreError::NoHomeDir)
}

pub fn default_store_path() -> Result<PathBuf, StoreError> {
    Ok(default_data_dir()?.join(STORE_FILE_NAME))
}

/// Recursively merges `patch` into `target`.
///
/// Objects are merged key by key; every other value (arrays, scalars and `null`) replaces
/// whatever `target` held at that position.
pub fn deep_merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                match target_map.get_mut(&key) {
                    Some(existing) if existing.is_object() && patch_value.is_object() => {
                        deep_merge(existing, patch_value);
                    }
                    _ => {
                        target_map.insert(key, patch_value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

/// A JSON object persisted to a single file.
///
/// The whole document is rewritten on every mutation.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    data: Map<String, Value>,
}

impl ConfigStore {
    /// Loads `path` on top of `defaults`.
    ///
    /// A missing file is not an error. An unreadable or malformed file is logged and ignored,
    /// leaving the defaults in place until the next write replaces it.
    pub fn open(path: impl Into<PathBuf>, defaults: Map<String, Value>) -> Self {
        let path = path.into();
        let mut data = Value::Object(defaults);
        if let Some(persisted) = read_persisted(&path) {
            deep_merge(&mut data, Value::Object(persisted));
        }
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { path, data }
    }

    pub fn open_default(defaults: Map<String, Value>) -> Result<Self, StoreError> {
        Ok(Self::open(default_store_path()?, defaults))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Stores `value` under `key`. On a write error the in-memory document is left unchanged.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut staged = self.data.clone();
        staged.insert(key.to_string(), value);
        self.commit(staged)
    }

    /// Deep-merges `patch` into the value stored under `key` and returns the merged value.
    ///
    /// On a write error the in-memory document is left unchanged.
    pub fn merge(&mut self, key: &str, patch: Value) -> Result<&Value, StoreError> {
        let mut staged = self.data.clone();
        let entry = staged.entry(key.to_string()).or_insert(Value::Null);
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        deep_merge(entry, patch);
        self.commit(staged)?;
        Ok(&self.data[key])
    }

    fn commit(&mut self, staged: Map<String, Value>) -> Result<(), StoreError> {
        write_document(&self.path, &staged)?;
        self.data = staged;
        Ok(())
    }
}

fn write_document(path: &Path, data: &Map<String, Value>) -> Result<(), StoreError> {
    if let Some(parent_dir) = path.parent() {
        fs::create_dir_all(parent_dir).map_err(|source| StoreError::CreateDir {
            path: parent_dir.to_path_buf(),
            source,
        })?;
    }

    let serialized = serde_json::to_string_pretty(data)?;
    fs::write(path, serialized).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn read_persisted(path: &Path) -> Option<Map<String, Value>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return None,
        Err(error) => {
            warn!("failed to read preferences {}: {error}", path.display());
            return None;
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            warn!(
                "preferences {} have a non-object root; using defaults",
                path.display()
            );
            None
        }
        Err(error) => {
            warn!(
                "failed to parse preferences {}: {error}; using defaults",
                path.display()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn defaults() -> Map<String, Value> {
        match json!({ "windowBounds": { "width": 1280, "height": 720 }, "isMaximized": false }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn deep_merge_keeps_sibling_keys() {
        let mut target = json!({ "a": { "x": 1 } });
        deep_merge(&mut target, json!({ "a": { "y": 2 } }));
        assert_eq!(target, json!({ "a": { "x": 1, "y": 2 } }));
    }

    #[test]
    fn deep_merge_replaces_arrays_and_scalars() {
        let mut target = json!({ "list": [1, 2, 3], "n": 1, "nested": { "k": "v" } });
        deep_merge(
            &mut target,
            json!({ "list": [9], "n": null, "nested": "flat" }),
        );
        assert_eq!(target, json!({ "list": [9], "n": null, "nested": "flat" }));
    }

    #[test]
    fn open_missing_file_uses_defaults_without_creating_it() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(DATA_DIR_NAME).join(STORE_FILE_NAME);

        let store = ConfigStore::open(&path, defaults());

        assert_eq!(store.get("isMaximized"), Some(&json!(false)));
        assert!(!path.exists());
    }

    #[test]
    fn set_creates_directory_and_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(DATA_DIR_NAME).join(STORE_FILE_NAME);

        let mut store = ConfigStore::open(&path, defaults());
        store.set("isKiosk", json!(true)).expect("set");

        let reopened = ConfigStore::open(&path, defaults());
        assert_eq!(reopened.get("isKiosk"), Some(&json!(true)));
        assert_eq!(
            reopened.get("windowBounds"),
            Some(&json!({ "width": 1280, "height": 720 }))
        );
    }

    #[test]
    fn persisted_values_override_defaults_deeply() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(STORE_FILE_NAME);
        fs::write(&path, r#"{ "windowBounds": { "width": 800 } }"#).expect("write");

        let store = ConfigStore::open(&path, defaults());

        assert_eq!(
            store.get("windowBounds"),
            Some(&json!({ "width": 800, "height": 720 }))
        );
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(STORE_FILE_NAME);
        fs::write(&path, "{ not json").expect("write");

        let store = ConfigStore::open(&path, defaults());

        assert_eq!(store.get("isMaximized"), Some(&json!(false)));
        assert_eq!(store.get("extUrl"), None);
    }

    #[test]
    fn merge_accumulates_partial_updates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(STORE_FILE_NAME);
        let mut store = ConfigStore::open(&path, defaults());

        store.merge("flowrConfig", json!({ "a": { "x": 1 } })).expect("merge");
        store.merge("flowrConfig", json!({ "a": { "y": 2 } })).expect("merge");

        let reopened = ConfigStore::open(&path, defaults());
        assert_eq!(
            reopened.get("flowrConfig"),
            Some(&json!({ "a": { "x": 1, "y": 2 } }))
        );
    }

    #[test]
    fn merge_replaces_non_object_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = ConfigStore::open(dir.path().join(STORE_FILE_NAME), defaults());
        store.set("flowrConfig", json!("legacy")).expect("set");

        let merged = store
            .merge("flowrConfig", json!({ "ozoneApi": { "hostProxy": "h" } }))
            .expect("merge")
            .clone();

        assert_eq!(merged, json!({ "ozoneApi": { "hostProxy": "h" } }));
    }

    #[test]
    fn failed_write_leaves_document_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("not-a-directory");
        fs::write(&blocker, "").expect("write");
        let mut store = ConfigStore::open(blocker.join(STORE_FILE_NAME), defaults());

        assert!(matches!(
            store.set("extUrl", json!("http://example.com")),
            Err(StoreError::CreateDir { .. })
        ));
        assert!(store.merge("flowrConfig", json!({ "a": 1 })).is_err());

        assert_eq!(store.get("extUrl"), None);
        assert_eq!(store.get("flowrConfig"), None);
        assert_eq!(store.get("isMaximized"), Some(&json!(false)));
    }
}
