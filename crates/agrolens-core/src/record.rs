//! JSON records over the storage port

use agrolens_store::Storage;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Namespace prefixed to every storage key
pub(crate) const NAMESPACE: &str = "agrolens";

/// Read and decode the record at `key`. Storage and decode failures read as absent.
pub(crate) fn read<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "storage read failed");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "discarding undecodable record");
            None
        }
    }
}

/// Encode and store `value` at `key`, logging instead of failing
pub(crate) fn write_lossy<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) -> bool {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            warn!(key, error = %e, "record serialization failed");
            return false;
        }
    };

    match storage.set(key, &json) {
        Ok(()) => true,
        Err(e) => {
            warn!(key, error = %e, "storage write failed");
            false
        }
    }
}

/// Remove `key`, logging instead of failing
pub(crate) fn remove_lossy(storage: &dyn Storage, key: &str) {
    if let Err(e) = storage.remove(key) {
        warn!(key, error = %e, "storage remove failed");
    }
}
