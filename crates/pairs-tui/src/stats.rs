//! Stats persistence for the terminal front end
//!
//! Backend is chosen from the environment:
//! - Local: JSON key-value file in the platform data dir
//! - Test: in-memory store that is dropped on exit

use pairs_core::stats::{KvBackend, MemoryBackend, StatsStore};
use pairs_core::{StoreError, StoreResult};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

/// Environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Normal play - file-based storage
    Local,
    /// Testing - in-memory store
    Test,
}

impl Environment {
    /// Detect environment from PAIRS_ENV variable
    pub fn detect() -> Self {
        Self::from_value(std::env::var("PAIRS_ENV").ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("test") | Some("testing") => Environment::Test,
            _ => Environment::Local,
        }
    }
}

// ==================== File Backend ====================

/// Stats kept as a flat JSON object of string values
pub struct FileBackend {
    path: PathBuf,
    cache: Mutex<Option<BTreeMap<String, String>>>,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    /// Default location under the platform data dir
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pairs")
            .join("pairs_stats.json")
    }

    fn load(&self) -> StoreResult<BTreeMap<String, String>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(ref data) = *cache {
            return Ok(data.clone());
        }

        let data = match std::fs::read_to_string(&self.path) {
            Ok(json) => serde_json::from_str(&json).map_err(|e| {
                StoreError::Corrupt(format!("{}: {}", self.path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };

        *cache = Some(data.clone());
        Ok(data)
    }

    fn save(&self, data: BTreeMap<String, String>) -> StoreResult<()> {
        let json =
            serde_json::to_string_pretty(&data).map_err(|e| StoreError::Io(e.to_string()))?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        std::fs::write(&self.path, json).map_err(|e| StoreError::Io(e.to_string()))?;

        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = Some(data);
        Ok(())
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut data = self.load()?;
        if data.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        data.insert(key.to_string(), value.to_string());
        self.save(data)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut data = self.load()?;
        if data.remove(key).is_some() {
            self.save(data)?;
        }
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.load()?.into_keys().collect())
    }

    fn is_available(&self) -> bool {
        self.load().is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "File"
    }
}

// ==================== Backend Factory ====================

/// Create the appropriate backend based on environment
pub fn create_backend(env: Environment, path: Option<PathBuf>) -> Arc<dyn KvBackend> {
    match env {
        Environment::Local => {
            Arc::new(FileBackend::new(path.unwrap_or_else(FileBackend::default_path)))
        }
        Environment::Test => Arc::new(MemoryBackend::new()),
    }
}

/// Open the stats store for this run
pub fn open_store(path: Option<PathBuf>) -> StatsStore {
    let env = Environment::detect();
    let backend = create_backend(env, path);
    log::info!("stats backend: {} ({:?})", backend.backend_name(), env);
    let store = StatsStore::new(backend);
    if let Some(err) = store.init_if_empty().warning {
        log::warn!("stats file unusable, playing with in-memory stats: {}", err);
    }
    store
}

/// Format milliseconds as MM:SS
pub fn format_clock(ms: u64) -> String {
    let secs = ms.div_ceil(1000);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairs_core::stats::{BestTime, Conclusion, KEY_WON};

    #[test]
    fn test_file_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stats.json");

        let backend = FileBackend::new(&path);
        assert_eq!(backend.get(KEY_WON).unwrap(), None);
        backend.set(KEY_WON, "4").unwrap();
        backend.set("flip_casual", "12345").unwrap();
        backend.remove("flip_casual").unwrap();

        // a fresh backend reads what the first one wrote
        let reopened = FileBackend::new(&path);
        assert_eq!(reopened.get(KEY_WON).unwrap().as_deref(), Some("4"));
        assert_eq!(reopened.get("flip_casual").unwrap(), None);

        let json = std::fs::read_to_string(&path).unwrap();
        let map: BTreeMap<String, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(map.get(KEY_WON).map(String::as_str), Some("4"));
    }

    #[test]
    fn test_store_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");

        let store = StatsStore::new(Arc::new(FileBackend::new(&path)));
        store.session_started().into_result().unwrap();
        store.session_concluded(Conclusion::Won).into_result().unwrap();
        store.record_time("medium", 41_000).into_result().unwrap();

        let store = StatsStore::new(Arc::new(FileBackend::new(&path)));
        let record = store.read().into_result().unwrap();
        assert_eq!(record.won, 1);
        assert_eq!(record.in_flight, 0);
        assert_eq!(record.best_time("medium"), BestTime::Millis(41_000));
        assert_eq!(record.best_time("hard"), BestTime::NoRecord);
    }

    #[test]
    fn test_custom_best_times_listed_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");

        let store = StatsStore::new(Arc::new(FileBackend::new(&path)));
        store.record_time("custom_12", 15_000).into_result().unwrap();
        let record = store.read().into_result().unwrap();
        assert_eq!(record.best_time("custom_12"), BestTime::Millis(15_000));

        store.reset().into_result().unwrap();
        let store = StatsStore::new(Arc::new(FileBackend::new(&path)));
        let record = store.read().into_result().unwrap();
        assert!(!record.best_times.contains_key("custom_12"));
        assert_eq!(store.best_time("custom_12").value, BestTime::NoRecord);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(&path, "{ not json").unwrap();

        let backend = FileBackend::new(&path);
        assert!(!backend.is_available());
        assert!(matches!(backend.get(KEY_WON), Err(StoreError::Corrupt(_))));

        let store = StatsStore::new(Arc::new(backend));
        let report = store.read();
        assert!(matches!(report.warning, Some(StoreError::Corrupt(_))));
        assert_eq!(report.value.won, 0);
        assert!(store.is_degraded());

        // the broken file is left alone
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_environment_detection() {
        assert_eq!(Environment::from_value(None), Environment::Local);
        assert_eq!(Environment::from_value(Some("test")), Environment::Test);
        assert_eq!(Environment::from_value(Some("prod")), Environment::Local);
    }

    #[test]
    fn test_test_environment_uses_memory() {
        let backend = create_backend(Environment::Test, None);
        assert_eq!(backend.backend_name(), "Memory");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(32_000), "00:32");
        assert_eq!(format_clock(31_001), "00:32");
        assert_eq!(format_clock(192_000), "03:12");
        assert_eq!(format_clock(0), "00:00");
    }
}
