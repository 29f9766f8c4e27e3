//! Key-value persistence behind the stats store
//!
//! Backends only move strings in and out. The store owns key names,
//! defaults and parsing. Implementations:
//! - `MemoryBackend`: in-process map, used for tests and as the degraded fallback
//! - `FileBackend` (pairs-tui): JSON file in the platform data dir
//! - `LocalStorageBackend` (pairs-wasm): browser `localStorage`

use crate::error::{StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Trait for stats persistence backends
pub trait KvBackend: Send + Sync {
    /// Read a value; `Ok(None)` when the key was never written
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Every key currently stored, in no particular order
    fn keys(&self) -> StoreResult<Vec<String>>;

    /// Check if backend is available
    fn is_available(&self) -> bool;

    /// Get backend name for display
    fn backend_name(&self) -> &'static str;
}

// ==================== In-memory Backend ====================

/// In-memory backend. Can be switched unavailable to simulate storage loss.
#[derive(Debug)]
pub struct MemoryBackend {
    data: Mutex<HashMap<String, String>>,
    available: Mutex<bool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            available: Mutex::new(true),
        }
    }

    /// Set whether the backend should report as available
    pub fn set_available(&self, available: bool) {
        *self.available.lock().unwrap_or_else(PoisonError::into_inner) = available;
    }

    /// Get entry count
    pub fn len(&self) -> usize {
        self.data.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self) -> StoreResult<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory backend switched off".into()))
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check()?;
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check()?;
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.check()?;
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        data.remove(key);
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        self.check()?;
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(data.keys().cloned().collect())
    }

    fn is_available(&self) -> bool {
        *self.available.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn backend_name(&self) -> &'static str {
        "Memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend() {
        let backend = MemoryBackend::new();
        assert!(backend.is_empty());
        assert_eq!(backend.get("flip_won").unwrap(), None);

        backend.set("flip_won", "3").unwrap();
        assert_eq!(backend.get("flip_won").unwrap().as_deref(), Some("3"));
        assert_eq!(backend.len(), 1);

        backend.set("flip_custom_6", "700").unwrap();
        let mut keys = backend.keys().unwrap();
        keys.sort();
        assert_eq!(keys, ["flip_custom_6", "flip_won"]);

        backend.remove("flip_won").unwrap();
        assert_eq!(backend.get("flip_won").unwrap(), None);
    }

    #[test]
    fn test_memory_unavailable() {
        let backend = MemoryBackend::new();
        backend.set_available(false);

        assert!(!backend.is_available());
        assert!(matches!(
            backend.get("flip_won"),
            Err(StoreError::Unavailable(_))
        ));
        assert!(backend.set("flip_won", "1").is_err());
    }
}
