use crate::{KeyValueStore, Result, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-process store. Clones share the same map, so a test can keep a
/// handle and inspect what the item manager wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.set("viewMode", b"list").unwrap();

        assert_eq!(handle.get("viewMode").unwrap(), Some(b"list".to_vec()));
        assert_eq!(handle.len(), 1);
    }

    #[test]
    fn test_boxed_store() {
        let store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        store.set("items", b"[]").unwrap();
        assert_eq!(store.get("items").unwrap(), Some(b"[]".to_vec()));
        assert_eq!(store.get("categories").unwrap(), None);
    }
}
