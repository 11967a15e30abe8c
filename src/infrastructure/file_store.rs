// File-backed key-value store - one JSON file per key
use crate::application::key_value_store::KeyValueStore;
use crate::error::{DashboardError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.directory.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DashboardError::Persistence(format!("read '{key}' failed: {e}"))),
        }
    }

    /// Writes go to a temporary sibling first and are renamed into place.
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let persist = |e: std::io::Error| DashboardError::Persistence(format!("write '{key}' failed: {e}"));
        fs::create_dir_all(&self.directory).map_err(persist)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(persist)?;
        fs::rename(&tmp, &path).map_err(persist)?;
        tracing::debug!(key, path = %path.display(), "stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        assert_eq!(store.get("dashboards").unwrap(), None);

        store.set("dashboards", "[]").unwrap();
        assert_eq!(store.get("dashboards").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("nested/dashboards.json").exists());
    }

    #[test]
    fn test_keys_are_sanitised() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("../escape", "x").unwrap();
        assert!(dir.path().join("___escape.json").exists());
    }

    #[test]
    fn test_unwritable_directory_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        let store = FileStore::new(blocker.join("sub"));
        assert!(matches!(store.set("k", "v"), Err(DashboardError::Persistence(_))));
    }
}
