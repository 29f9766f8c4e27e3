use pairs_core::stats::KvBackend;
use pairs_core::{StoreError, StoreResult};
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// Stats in the browser's `localStorage`, one string per key.
///
/// The storage handle is looked up on every call: it is not `Send`, and the
/// user may revoke storage access while the page is open.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageBackend;

impl LocalStorageBackend {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> StoreResult<Storage> {
        let window =
            web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".into()))?;
        window
            .local_storage()
            .map_err(|e| StoreError::Unavailable(describe(&e)))?
            .ok_or_else(|| StoreError::Unavailable("localStorage disabled".into()))
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

impl KvBackend for LocalStorageBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StoreError::Io(describe(&e)))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::Io(describe(&e)))
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| StoreError::Io(describe(&e)))
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let storage = Self::storage()?;
        let len = storage
            .length()
            .map_err(|e| StoreError::Io(describe(&e)))?;
        let mut keys = Vec::with_capacity(len as usize);
        for index in 0..len {
            if let Some(key) = storage
                .key(index)
                .map_err(|e| StoreError::Io(describe(&e)))?
            {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    fn is_available(&self) -> bool {
        Self::storage().is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "LocalStorage"
    }
}
