use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;
use crate::keys::StorageKey;

/// A flat map of string keys to JSON documents.
///
/// Keys are plain strings so legacy layouts can be read during migration;
/// day-to-day access goes through [`StorageKey`] and the typed helpers below.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<Value>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot persist the change.
    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot persist the change.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot persist the change.
    fn clear(&mut self) -> Result<(), StoreError>;

    fn keys(&self) -> Vec<String>;
}

/// Read and decode the document under `key`.
///
/// A missing key or a document that does not decode as `T` both yield
/// `None`; decode failures are logged and otherwise treated as "no data yet".
pub fn read_json<T, S>(store: &S, key: StorageKey) -> Option<T>
where
    T: DeserializeOwned,
    S: KvStore + ?Sized,
{
    let value = store.get(key.as_str())?;
    match serde_json::from_value::<T>(value) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "discarding unreadable stored value");
            None
        }
    }
}

/// Like [`read_json`] but falls back to `T::default()`.
pub fn read_json_or<T, S>(store: &S, key: StorageKey) -> T
where
    T: DeserializeOwned + Default,
    S: KvStore + ?Sized,
{
    read_json(store, key).unwrap_or_default()
}

/// Encode `value` and store it under `key`.
///
/// # Errors
///
/// Returns [`StoreError::Serialize`] if `value` cannot be encoded, or the
/// backend's error if it cannot persist.
pub fn write_json<T, S>(store: &mut S, key: StorageKey, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: KvStore + ?Sized,
{
    let encoded = serde_json::to_value(value).map_err(|e| StoreError::Serialize {
        key: key.to_string(),
        source: e,
    })?;
    store.set(key.as_str(), encoded)
}
