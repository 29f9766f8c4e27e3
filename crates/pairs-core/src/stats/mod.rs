//! Durable game statistics
//!
//! Every value lives under its own key as a plain string, so the layout can
//! be shared with any key-value store:
//!
//! | key | meaning | default |
//! |---|---|---|
//! | `flip_won`, `flip_lost` | lifetime wins / losses | `0` |
//! | `flip_abandoned` | sessions started but not concluded | `0` |
//! | `flip_<difficulty>` | best completion time in ms | `-:-` |
//! | `flip_custom_<tiles>` | best time on a custom board, once won | absent |
//! | `flip_matched`, `flip_wrong` | lifetime flip outcomes | `0` |

mod backend;

pub use backend::{KvBackend, MemoryBackend};

use crate::config::Difficulty;
use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const KEY_WON: &str = "flip_won";
pub const KEY_LOST: &str = "flip_lost";
pub const KEY_IN_FLIGHT: &str = "flip_abandoned";
pub const KEY_MATCHED: &str = "flip_matched";
pub const KEY_WRONG: &str = "flip_wrong";

/// Stored value meaning "no best time yet"
pub const NO_RECORD: &str = "-:-";

const COUNTER_KEYS: [&str; 5] = [KEY_WON, KEY_LOST, KEY_IN_FLIGHT, KEY_MATCHED, KEY_WRONG];

const KEY_PREFIX: &str = "flip_";
const CUSTOM_PREFIX: &str = "custom_";

/// Storage key for the best time of a difficulty
pub fn best_time_key(difficulty_key: &str) -> String {
    format!("{}{}", KEY_PREFIX, difficulty_key)
}

/// How a session ended, as far as the counters care
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conclusion {
    Won,
    Lost,
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipKind {
    Matched,
    Wrong,
}

/// Best completion time for one difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BestTime {
    #[default]
    NoRecord,
    Millis(u64),
}

impl BestTime {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw == NO_RECORD {
            return Some(BestTime::NoRecord);
        }
        if let Ok(ms) = raw.parse::<u64>() {
            return Some(BestTime::Millis(ms));
        }
        // older writers stored fractional milliseconds
        match raw.parse::<f64>() {
            Ok(ms) if ms.is_finite() && ms >= 0.0 => Some(BestTime::Millis(ms.round() as u64)),
            _ => None,
        }
    }

    fn encode(self) -> String {
        match self {
            BestTime::NoRecord => NO_RECORD.to_string(),
            BestTime::Millis(ms) => ms.to_string(),
        }
    }

    pub fn millis(self) -> Option<u64> {
        match self {
            BestTime::NoRecord => None,
            BestTime::Millis(ms) => Some(ms),
        }
    }

    /// True when `elapsed_ms` would replace this record
    pub fn is_beaten_by(self, elapsed_ms: u64) -> bool {
        match self {
            BestTime::NoRecord => true,
            BestTime::Millis(best) => elapsed_ms < best,
        }
    }
}

impl fmt::Display for BestTime {
    /// Seconds with one decimal, dropping a trailing `.0`: `12.3s`, `12s`, `-:-`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BestTime::NoRecord => write!(f, "{}", NO_RECORD),
            BestTime::Millis(ms) => {
                let secs = format!("{:.1}", *ms as f64 / 1000.0);
                let secs = secs.strip_suffix(".0").unwrap_or(&secs);
                write!(f, "{}s", secs)
            }
        }
    }
}

/// Snapshot of everything the store knows, defaults applied
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsRecord {
    pub won: u64,
    pub lost: u64,
    pub in_flight: u64,
    pub matched: u64,
    pub wrong: u64,
    /// Best times keyed by difficulty key (built-in levels are always present)
    pub best_times: BTreeMap<String, BestTime>,
}

impl StatsRecord {
    pub fn best_time(&self, difficulty_key: &str) -> BestTime {
        self.best_times
            .get(difficulty_key)
            .copied()
            .unwrap_or_default()
    }

    pub fn games_concluded(&self) -> u64 {
        self.won + self.lost
    }

    /// Tiles turned over in resolved pairs
    pub fn total_flips(&self) -> u64 {
        (self.matched + self.wrong) * 2
    }

    /// Share of matched flips among all resolved flips, in percent
    pub fn accuracy(&self) -> f32 {
        let total = self.matched + self.wrong;
        if total > 0 {
            self.matched as f32 / total as f32 * 100.0
        } else {
            0.0
        }
    }
}

/// Value produced by a store operation, plus the storage error that forced
/// the store into degraded mode while producing it.
///
/// A warning never means the operation was lost: it was applied to the
/// in-memory fallback instead.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Reported<T> {
    pub value: T,
    pub warning: Option<StoreError>,
}

impl<T> Reported<T> {
    fn new(value: T, warning: Option<StoreError>) -> Self {
        Self { value, warning }
    }

    pub fn into_result(self) -> StoreResult<T> {
        match self.warning {
            Some(err) => Err(err),
            None => Ok(self.value),
        }
    }
}

/// Durable counters and best times.
///
/// Cheap to clone; clones share the backend and the degraded flag. The first
/// backend error switches the store to an in-memory fallback for the rest of
/// its life, so a broken disk never takes a session down with it.
#[derive(Clone)]
pub struct StatsStore {
    primary: Arc<dyn KvBackend>,
    fallback: Arc<MemoryBackend>,
    degraded: Arc<AtomicBool>,
}

impl fmt::Debug for StatsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsStore")
            .field("primary", &self.primary.backend_name())
            .field("degraded", &self.is_degraded())
            .finish()
    }
}

impl Default for StatsStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl StatsStore {
    pub fn new(primary: Arc<dyn KvBackend>) -> Self {
        Self {
            primary,
            fallback: Arc::new(MemoryBackend::new()),
            degraded: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Store that forgets everything when dropped
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    /// Name of the backend currently serving requests
    pub fn backend_name(&self) -> &'static str {
        if self.is_degraded() {
            self.fallback.backend_name()
        } else {
            self.primary.backend_name()
        }
    }

    /// Run `op` against the active backend. A primary failure degrades the
    /// store and replays `op` on the fallback.
    fn run<T: Default>(&self, op: impl Fn(&dyn KvBackend) -> StoreResult<T>) -> Reported<T> {
        if !self.is_degraded() {
            match op(self.primary.as_ref()) {
                Ok(value) => return Reported::new(value, None),
                Err(err) => {
                    log::warn!(
                        "{} stats backend failed, keeping stats in memory: {}",
                        self.primary.backend_name(),
                        err
                    );
                    self.degraded.store(true, Ordering::Relaxed);
                    return Reported::new(self.run_fallback(op), Some(err));
                }
            }
        }
        Reported::new(self.run_fallback(op), None)
    }

    fn run_fallback<T: Default>(&self, op: impl Fn(&dyn KvBackend) -> StoreResult<T>) -> T {
        op(self.fallback.as_ref()).unwrap_or_else(|err| {
            log::error!("in-memory stats fallback failed: {}", err);
            T::default()
        })
    }

    /// Write defaults for every key that has never been written
    pub fn init_if_empty(&self) -> Reported<()> {
        self.run(ensure_defaults)
    }

    /// A session started; counts as in flight until concluded
    pub fn session_started(&self) -> Reported<()> {
        self.run(|b| update_counter(b, KEY_IN_FLIGHT, |n| n.saturating_add(1)).map(drop))
    }

    /// A session ended. The in-flight counter never drops below zero.
    pub fn session_concluded(&self, kind: Conclusion) -> Reported<()> {
        self.run(|b| {
            update_counter(b, KEY_IN_FLIGHT, |n| n.saturating_sub(1))?;
            match kind {
                Conclusion::Won => update_counter(b, KEY_WON, |n| n.saturating_add(1))?,
                Conclusion::Lost => update_counter(b, KEY_LOST, |n| n.saturating_add(1))?,
                Conclusion::Abandoned => 0,
            };
            Ok(())
        })
    }

    /// Store `elapsed_ms` as the best time if it beats the current one.
    /// The value is `true` when the record changed.
    pub fn record_time(&self, difficulty_key: &str, elapsed_ms: u64) -> Reported<bool> {
        let key = best_time_key(difficulty_key);
        self.run(|b| {
            let current = read_best_time(b, &key)?;
            if current.is_beaten_by(elapsed_ms) {
                b.set(&key, &BestTime::Millis(elapsed_ms).encode())?;
                log::info!("new best time for {}: {}ms", difficulty_key, elapsed_ms);
                Ok(true)
            } else {
                Ok(false)
            }
        })
    }

    pub fn bump_flip(&self, kind: FlipKind) -> Reported<()> {
        let key = match kind {
            FlipKind::Matched => KEY_MATCHED,
            FlipKind::Wrong => KEY_WRONG,
        };
        self.run(|b| update_counter(b, key, |n| n.saturating_add(1)).map(drop))
    }

    pub fn best_time(&self, difficulty_key: &str) -> Reported<BestTime> {
        let key = best_time_key(difficulty_key);
        self.run(|b| read_best_time(b, &key))
    }

    /// Full snapshot for display. Defaults are written on first read.
    pub fn read(&self) -> Reported<StatsRecord> {
        self.run(|b| {
            ensure_defaults(b)?;
            let mut best_times = BTreeMap::new();
            for key in difficulty_keys(b)? {
                let best = read_best_time(b, &best_time_key(&key))?;
                best_times.insert(key, best);
            }
            Ok(StatsRecord {
                won: read_counter(b, KEY_WON)?,
                lost: read_counter(b, KEY_LOST)?,
                in_flight: read_counter(b, KEY_IN_FLIGHT)?,
                matched: read_counter(b, KEY_MATCHED)?,
                wrong: read_counter(b, KEY_WRONG)?,
                best_times,
            })
        })
    }

    /// Drop every counter and best time back to its default
    pub fn reset(&self) -> Reported<()> {
        self.run(|b| {
            for key in COUNTER_KEYS {
                b.remove(key)?;
            }
            for key in difficulty_keys(b)? {
                b.remove(&best_time_key(&key))?;
            }
            ensure_defaults(b)
        })
    }
}

fn ensure_defaults(b: &dyn KvBackend) -> StoreResult<()> {
    for key in COUNTER_KEYS {
        if b.get(key)?.is_none() {
            b.set(key, "0")?;
        }
    }
    for difficulty in Difficulty::all() {
        let key = best_time_key(difficulty.key());
        if b.get(&key)?.is_none() {
            b.set(&key, NO_RECORD)?;
        }
    }
    Ok(())
}

/// Built-in levels plus every custom board that has a stored best time
fn difficulty_keys(b: &dyn KvBackend) -> StoreResult<Vec<String>> {
    let mut keys: Vec<String> = Difficulty::all()
        .iter()
        .map(|d| d.key().to_string())
        .collect();
    let mut custom: Vec<String> = b
        .keys()?
        .iter()
        .filter_map(|k| k.strip_prefix(KEY_PREFIX))
        .filter(|k| k.starts_with(CUSTOM_PREFIX))
        .map(str::to_string)
        .collect();
    custom.sort();
    keys.extend(custom);
    Ok(keys)
}

fn read_counter(b: &dyn KvBackend, key: &str) -> StoreResult<u64> {
    Ok(match b.get(key)? {
        None => 0,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring unreadable counter {}={:?}", key, raw);
            0
        }),
    })
}

fn update_counter(b: &dyn KvBackend, key: &str, f: impl Fn(u64) -> u64) -> StoreResult<u64> {
    let next = f(read_counter(b, key)?);
    b.set(key, &next.to_string())?;
    Ok(next)
}

fn read_best_time(b: &dyn KvBackend, key: &str) -> StoreResult<BestTime> {
    Ok(match b.get(key)? {
        None => BestTime::NoRecord,
        Some(raw) => BestTime::parse(&raw).unwrap_or_else(|| {
            log::warn!("ignoring unreadable best time {}={:?}", key, raw);
            BestTime::NoRecord
        }),
    })
}
