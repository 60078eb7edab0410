//! Directory-backed schema saves, one `<slot>.json` per slot.
use archsandbox_engine::{AppSchema, ImportError, SchemaStorage};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid slot name '{0}'")]
    InvalidSlot(String),
    #[error("i/o error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize schema")]
    Json(#[from] serde_json::Error),
    #[error("saved schema {path} is not importable")]
    Import {
        path: PathBuf,
        #[source]
        source: ImportError,
    },
}

#[derive(Debug, Clone)]
pub struct FileSchemaStorage {
    root: PathBuf,
}

impl FileSchemaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf, StorageError> {
        let valid = !slot.is_empty()
            && slot
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !slot.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidSlot(slot.to_string()));
        }
        Ok(self.root.join(format!("{slot}.json")))
    }
}

impl SchemaStorage for FileSchemaStorage {
    type Error = StorageError;

    fn save_schema(&self, slot: &str, schema: &AppSchema) -> Result<(), Self::Error> {
        let path = self.slot_path(slot)?;
        let json = schema.to_json()?;
        std::fs::create_dir_all(&self.root).map_err(|source| StorageError::Io {
            path: self.root.clone(),
            source,
        })?;
        std::fs::write(&path, json).map_err(|source| StorageError::Io { path, source })
    }

    fn load_schema(&self, slot: &str) -> Result<Option<AppSchema>, Self::Error> {
        let path = self.slot_path(slot)?;
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        AppSchema::from_json(&json)
            .map(Some)
            .map_err(|source| StorageError::Import { path, source })
    }

    fn delete_schema(&self, slot: &str) -> Result<(), Self::Error> {
        let path = self.slot_path(slot)?;
        match std::fs::remove_file(&path) {
            Err(err) if err.kind() != ErrorKind::NotFound => {
                Err(StorageError::Io { path, source: err })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archsandbox_engine::{Category, Technology};

    fn storage(label: &str) -> FileSchemaStorage {
        FileSchemaStorage::new(std::env::temp_dir().join(format!(
            "archsandbox-storage-{label}-{}",
            std::process::id()
        )))
    }

    #[test]
    fn save_load_delete_cycle() {
        let storage = storage("cycle");
        let schema = AppSchema::from_technologies(
            [Technology::uniform("react", Category::Framework, 60.0)],
            [Technology::uniform("node", Category::Framework, 55.0)],
        );
        storage.save_schema("shop", &schema).unwrap();
        assert!(storage.root().join("shop.json").exists());

        let loaded = storage.load_schema("shop").unwrap().expect("saved");
        assert_eq!(loaded, schema);

        storage.delete_schema("shop").unwrap();
        assert!(storage.load_schema("shop").unwrap().is_none());
        storage.delete_schema("shop").unwrap();
    }

    #[test]
    fn rejects_path_like_slots() {
        let storage = storage("slots");
        for slot in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                storage.load_schema(slot),
                Err(StorageError::InvalidSlot(_))
            ));
        }
    }

    #[test]
    fn unimportable_file_is_an_error() {
        let storage = storage("broken");
        std::fs::create_dir_all(storage.root()).unwrap();
        std::fs::write(storage.root().join("broken.json"), r#"{"frontend":[]}"#).unwrap();
        let err = storage.load_schema("broken").unwrap_err();
        assert!(matches!(
            err,
            StorageError::Import {
                source: ImportError::MissingView("backend"),
                ..
            }
        ));
    }
}
