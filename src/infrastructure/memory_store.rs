// In-memory key-value store
use crate::application::key_value_store::KeyValueStore;
use crate::error::{DashboardError, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local storage. `fail_writes` simulates a full or unavailable
/// backing store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: Mutex<bool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_writes.lock() {
            *flag = fail;
        }
    }

    /// Store a raw value directly, bypassing write failure simulation.
    pub fn seed(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| DashboardError::Persistence(format!("store lock poisoned: {e}")))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let failing = self.fail_writes.lock().map(|f| *f).unwrap_or(false);
        if failing {
            return Err(DashboardError::Persistence(format!(
                "write to '{key}' rejected: storage unavailable"
            )));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| DashboardError::Persistence(format!("store lock poisoned: {e}")))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("views").unwrap(), None);
        store.set("views", "{}").unwrap();
        assert_eq!(store.get("views").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_failing_writes_keep_previous_value() {
        let store = InMemoryStore::new();
        store.set("k", "1").unwrap();
        store.set_fail_writes(true);
        assert!(matches!(store.set("k", "2"), Err(DashboardError::Persistence(_))));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("1"));
    }
}
