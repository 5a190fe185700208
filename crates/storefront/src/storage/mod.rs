//! Durable key-value storage for client state snapshots.
//!
//! State managers serialise their whole collection under one key on every
//! mutation and read it back once when they are constructed. The store is
//! shared by every manager of a session, and by every session pointed at
//! the same backing directory. There is no cross-process coordination:
//! the last write wins.
//!
//! # Backends
//!
//! - [`MemoryStore`] - process-local, for tests and ephemeral sessions
//! - [`FileStore`] - one JSON file per key in a directory

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Keys under which state managers persist their snapshots.
pub mod keys {
    /// Cart line items.
    pub const CART: &str = "cart";

    /// Wishlist entries.
    pub const WISHLIST: &str = "wishlist";

    /// Light/dark theme preference.
    pub const THEME: &str = "theme";

    /// Bearer token from the last successful login.
    pub const AUTH_TOKEN: &str = "token";

    /// Set when the user hid their order history.
    pub const ORDERS_CLEARED: &str = "ordersCleared";
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O error for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The value could not be serialised.
    #[error("failed to encode '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The stored value is not valid for the requested type.
    #[error("corrupt value under '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A string-valued key-value store.
///
/// Implementations must be safe to share between threads. Operations are
/// synchronous: the local phase of every mutation completes before the
/// caller regains control.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the backend cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// A store shared between the managers of one session.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Read and decode the JSON value under `key`.
///
/// # Errors
///
/// Returns `StorageError::Decode` if the stored JSON does not match `T`.
pub fn load<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    store
        .read(key)?
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|source| StorageError::Decode {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
}

/// Encode `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns `StorageError::Encode` or a backend error.
pub fn save<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.write(key, &raw)
}

/// Read a snapshot, falling back to `T::default()` when it is absent or unreadable.
///
/// Corrupt snapshots are logged and ignored so a bad write never bricks a session.
pub fn load_or_default<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    match load(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring unreadable snapshot");
            T::default()
        }
    }
}

/// Read a list snapshot row by row.
///
/// Rows that do not decode as `T` are logged and skipped, so one bad entry
/// written by an older client costs that entry only. A value that is not a
/// JSON array at all is treated like any other unreadable snapshot.
pub fn load_rows<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let rows: Vec<serde_json::Value> = load_or_default(store, key);
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, index, error = %e, "Skipping unreadable snapshot row");
                None
            }
        })
        .collect()
}

/// Write a snapshot, logging instead of failing.
///
/// Local mutations always succeed; a failed snapshot write only costs
/// durability across restarts.
pub fn persist<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    if let Err(e) = save(store, key, value) {
        tracing::warn!(key, error = %e, "Failed to persist snapshot");
    }
}
