//! Persisted key-value configuration.
//!
//! The store is stored at `.zeus.toml` in the working directory by default and
//! remembers the schema source between invocations:
//! ```toml
//! urlOrPath = "https://example.com/graphql"
//! ```

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use dialoguer::Input;
use toml_edit::{DocumentMut, value};
use tracing::{debug, warn};

use crate::error::ZeusError;

/// Default config filename, relative to the working directory.
pub const DEFAULT_CONFIG_FILENAME: &str = ".zeus.toml";

/// Key under which the schema source is remembered.
pub const SOURCE_KEY: &str = "urlOrPath";

/// Where a looked-up value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Already present in the store.
    Stored(String),
    /// Typed in by the user at the prompt.
    Prompted(String),
}

/// Handle to persisted configuration values.
pub trait ConfigStore: Send + Sync + Debug {
    /// Read a value, `None` when absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Persist a value.
    fn set(&self, key: &str, value: &str) -> Result<(), ZeusError>;

    /// Read a value, asking the user for it when it is absent and a terminal
    /// is attended. Empty answers count as absent.
    fn get_or_prompt(&self, key: &str, prompt: &str) -> Result<Option<Lookup>, ZeusError> {
        if let Some(stored) = self.get(key).filter(|v| !v.is_empty()) {
            return Ok(Some(Lookup::Stored(stored)));
        }
        if !console::user_attended() {
            debug!(key, "No terminal attended, skipping prompt.");
            return Ok(None);
        }
        let answer = Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|err| ZeusError::Config(format!("Failed to read {key}: {err}")))?;
        let answer = answer.trim();
        if answer.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Lookup::Prompted(answer.to_string())))
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// TOML-file backed store.
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    doc: Mutex<DocumentMut>,
}

impl FileConfigStore {
    /// Load the store from disk. A missing file is an empty store; an
    /// unreadable or unparsable one is reported and treated as empty.
    pub fn load(path: &Path) -> Self {
        let doc = match fs::read_to_string(path) {
            Ok(contents) => contents.parse::<DocumentMut>().unwrap_or_else(|err| {
                warn!(path = %path.display(), error = %err, "Ignoring unparsable config file.");
                DocumentMut::new()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => DocumentMut::new(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Ignoring unreadable config file.");
                DocumentMut::new()
            }
        };
        debug!(path = %path.display(), "Loaded config store.");
        Self {
            path: path.to_path_buf(),
            doc: Mutex::new(doc),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.doc)
            .get(key)
            .and_then(|item| item.as_str())
            .map(String::from)
    }

    fn set(&self, key: &str, val: &str) -> Result<(), ZeusError> {
        let contents = {
            let mut doc = lock(&self.doc);
            doc.insert(key, value(val));
            doc.to_string()
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| {
                ZeusError::Config(format!(
                    "Failed to create config directory {}: {err}",
                    parent.display()
                ))
            })?;
        }

        fs::write(&self.path, contents).map_err(|err| {
            ZeusError::Config(format!(
                "Failed to write config file {}: {err}",
                self.path.display()
            ))
        })
    }
}

/// In-process store that never prompts.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, val: &str) -> Self {
        let store = Self::new();
        lock(&store.values).insert(key.to_string(), val.to_string());
        store
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, val: &str) -> Result<(), ZeusError> {
        lock(&self.values).insert(key.to_string(), val.to_string());
        Ok(())
    }

    fn get_or_prompt(&self, key: &str, _prompt: &str) -> Result<Option<Lookup>, ZeusError> {
        Ok(self.get(key).filter(|v| !v.is_empty()).map(Lookup::Stored))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileConfigStore::load(&temp_dir.path().join(DEFAULT_CONFIG_FILENAME));
        assert_eq!(store.get(SOURCE_KEY), None);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(DEFAULT_CONFIG_FILENAME);

        let store = FileConfigStore::load(&path);
        store.set(SOURCE_KEY, "https://example.com/graphql").unwrap();

        let reloaded = FileConfigStore::load(&path);
        assert_eq!(
            reloaded.get(SOURCE_KEY).as_deref(),
            Some("https://example.com/graphql")
        );
    }

    #[test]
    fn test_set_preserves_other_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(DEFAULT_CONFIG_FILENAME);
        fs::write(&path, "# project settings\nother = \"kept\"\n").unwrap();

        let store = FileConfigStore::load(&path);
        store.set(SOURCE_KEY, "./schema.graphql").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("# project settings"));
        assert!(contents.contains("other = \"kept\""));
        assert!(contents.contains("urlOrPath = \"./schema.graphql\""));
    }

    #[test]
    fn test_unparsable_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(DEFAULT_CONFIG_FILENAME);
        fs::write(&path, "urlOrPath = [unterminated").unwrap();

        let store = FileConfigStore::load(&path);
        assert_eq!(store.get(SOURCE_KEY), None);
    }

    #[test]
    fn test_unreadable_path_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(DEFAULT_CONFIG_FILENAME);
        fs::create_dir(&path).unwrap();

        let store = FileConfigStore::load(&path);
        assert_eq!(store.get(SOURCE_KEY), None);
        assert!(matches!(
            store.set(SOURCE_KEY, "./schema.graphql"),
            Err(ZeusError::Config(_))
        ));
    }

    #[test]
    fn test_memory_store_never_prompts() {
        let store = MemoryConfigStore::new();
        assert_eq!(store.get_or_prompt(SOURCE_KEY, "Schema?").unwrap(), None);

        store.set(SOURCE_KEY, "./schema.graphql").unwrap();
        assert_eq!(
            store.get_or_prompt(SOURCE_KEY, "Schema?").unwrap(),
            Some(Lookup::Stored("./schema.graphql".into()))
        );
    }
}
