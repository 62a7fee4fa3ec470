//! Key-value storage for reviewkit state.
//!
//! A [`KvStore`] holds JSON documents under fixed keys, the way a browser
//! profile's local storage does. [`MemoryStore`] backs tests and dry runs;
//! [`FileStore`] persists a whole profile as one JSON object on disk.

pub mod error;
pub mod file;
pub mod keys;
pub mod kv;
pub mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use keys::{StorageKey, SCHEMA_VERSION};
pub use kv::{read_json, read_json_or, write_json, KvStore};
pub use memory::MemoryStore;
