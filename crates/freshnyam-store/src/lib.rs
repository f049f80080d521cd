// Key/value blob storage for FreshNyam
// Items, categories and the view mode all live here as opaque bytes

pub mod error;
pub mod memory;
pub mod sqlite;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Minimal blob store contract the item manager persists through.
///
/// Every call is atomic at key granularity. There are no transactions
/// spanning keys, so callers write each key independently.
pub trait KeyValueStore: Send {
    /// Fetch the bytes stored under `key`, `None` if the key was never set
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing whatever was there
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Drop `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
