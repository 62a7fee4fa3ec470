use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::StoreError;
use crate::kv::KvStore;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::keys::StorageKey;
    use crate::kv::{read_json, read_json_or, write_json};

    #[test]
    fn missing_key_reads_as_none() {
        let store = MemoryStore::new();
        let value: Option<Vec<u8>> = read_json(&store, StorageKey::Ratings);
        assert!(value.is_none());
    }

    #[test]
    fn malformed_value_reads_as_default() {
        let mut store = MemoryStore::new();
        store
            .set(StorageKey::TotalReviews.as_str(), json!("twenty-two"))
            .unwrap();
        let total: u64 = read_json_or(&store, StorageKey::TotalReviews);
        assert_eq!(total, 0);
    }

    #[test]
    fn write_then_read_typed_value() {
        let mut store = MemoryStore::new();
        write_json(&mut store, StorageKey::TotalReviews, &23_u64).unwrap();
        let total: Option<u64> = read_json(&store, StorageKey::TotalReviews);
        assert_eq!(total, Some(23));
    }

    #[test]
    fn clear_drops_everything() {
        let mut store = MemoryStore::new();
        store.set("a", json!(1)).unwrap();
        store.set("b", json!(2)).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(store.keys().is_empty());
    }
}
