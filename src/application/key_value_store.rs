// Key-value store trait for browser-style persistence
use crate::error::Result;

/// External string key-value storage (the browser's local storage or any
/// equivalent). Failures are reported as `DashboardError::Persistence`.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}
