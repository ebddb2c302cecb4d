//! File-backed adapter.
//!
//! The whole store is a single JSON object on disk mapping namespaced keys
//! to documents. Every save rewrites the file in full, with keys sorted and
//! the body indented, so the file diffs cleanly under version control. A
//! missing or empty file starts as an empty store; a present-but-malformed
//! file is an error, not silent data loss.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

use crate::document::Document;
use crate::errors::{Error, Result};

use super::{Backend, KeyIter, Namespace};

/// Backend adapter holding its store in one JSON file.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    data: Mutex<Document>,
}

impl FileBackend {
    /// Opens the store at `path`, reading any existing contents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file exists but cannot be read,
    /// [`Error::Serialization`] when its contents are not valid JSON, and a
    /// configuration error when the JSON is valid but not an object.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                Document::new()
            } else {
                let value: Value = serde_json::from_str(&raw)?;
                match value {
                    Value::Object(map) => map,
                    _ => {
                        return Err(Error::configuration(format!(
                            "file store {} must contain a JSON object at the top level",
                            path.display()
                        )))
                    }
                }
            }
        } else {
            Document::new()
        };

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, data: &Document) -> Result<()> {
        let ordered = sort_keys(&Value::Object(data.clone()));
        fs::write(&self.path, serde_json::to_string_pretty(&ordered)?)?;
        Ok(())
    }
}

impl Backend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn load(&self, namespace: &Namespace, identifier: &str) -> Result<Option<Document>> {
        let data = self.data.lock().expect("file store poisoned");
        match data.get(&namespace.key_for(identifier)) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    fn save(&self, namespace: &Namespace, identifier: &str, document: &Document) -> Result<()> {
        let mut data = self.data.lock().expect("file store poisoned");
        data.insert(
            namespace.key_for(identifier),
            Value::Object(document.clone()),
        );
        self.flush(&data)
    }

    fn all_keys<'a>(&'a self, namespace: &Namespace) -> Result<KeyIter<'a>> {
        let prefix = namespace.prefix();
        let identifiers: Vec<String> = self
            .data
            .lock()
            .expect("file store poisoned")
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
            .collect();
        Ok(Box::new(identifiers.into_iter().map(Ok)))
    }
}

/// Returns a copy of `value` with every object's keys sorted, recursively.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered: BTreeMap<&String, &Value> = map.iter().collect();
            Value::Object(
                ordered
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn doc(value: Value) -> Document {
        value.as_object().unwrap().clone()
    }

    fn store_path(tmp: &TempDir) -> PathBuf {
        tmp.path().join("store.json")
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let tmp = TempDir::new().unwrap();
        let backend = FileBackend::open(store_path(&tmp)).unwrap();
        assert!(backend
            .load(&Namespace::new("user"), "pam")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_empty_file_starts_empty() {
        let tmp = TempDir::new().unwrap();
        let path = store_path(&tmp);
        fs::write(&path, "  \n").unwrap();
        let backend = FileBackend::open(&path).unwrap();
        assert!(backend
            .load(&Namespace::new("user"), "pam")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = store_path(&tmp);
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FileBackend::open(&path).unwrap_err(),
            Error::Serialization(_)
        ));
    }

    #[test]
    fn test_non_object_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = store_path(&tmp);
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(
            FileBackend::open(&path).unwrap_err(),
            Error::Configuration(_)
        ));
    }

    #[test]
    fn test_save_persists_across_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = store_path(&tmp);
        let ns = Namespace::new("user");
        let document = doc(json!({"name": "Pam", "age": 30}));

        {
            let backend = FileBackend::open(&path).unwrap();
            backend.save(&ns, "pam", &document).unwrap();
        }

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.load(&ns, "pam").unwrap().unwrap(), document);
    }

    #[test]
    fn test_file_is_sorted_and_indented() {
        let tmp = TempDir::new().unwrap();
        let path = store_path(&tmp);
        let ns = Namespace::new("user");
        let backend = FileBackend::open(&path).unwrap();

        backend.save(&ns, "zeb", &doc(json!({"z": 1, "a": 2}))).unwrap();
        backend.save(&ns, "amy", &doc(json!({}))).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let amy = raw.find("::user::amy").unwrap();
        let zeb = raw.find("::user::zeb").unwrap();
        assert!(amy < zeb, "top-level keys must be sorted");
        let a = raw.find("\"a\"").unwrap();
        let z = raw.find("\"z\"").unwrap();
        assert!(a < z, "nested keys must be sorted");
        assert!(raw.contains("\n  "), "output must be indented");
    }

    #[test]
    fn test_all_keys_filters_to_collection() {
        let tmp = TempDir::new().unwrap();
        let backend = FileBackend::open(store_path(&tmp)).unwrap();
        let users = Namespace::new("user");
        let posts = Namespace::new("post");

        backend.save(&users, "pam", &doc(json!({}))).unwrap();
        backend.save(&posts, "memo", &doc(json!({}))).unwrap();

        let ids: Vec<String> = backend
            .all_keys(&users)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(ids, vec!["pam"]);
    }
}
