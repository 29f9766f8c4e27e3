//! Pairs memory game engine
//!
//! Deals shuffled boards of symbol pairs, resolves flips against a countdown
//! and keeps lifetime statistics through a pluggable key-value backend.
//!
//! ```
//! use pairs_core::{Board, Difficulty, ManualClock, StartConfig, StatsStore, SymbolDeck};
//!
//! let clock = ManualClock::new();
//! let config = StartConfig::for_difficulty(Difficulty::Casual);
//! let mut board = Board::new(config, &mut SymbolDeck::new(), clock.clone(), StatsStore::in_memory());
//!
//! board.select_tile(0);
//! clock.advance_ms(32_000);
//! assert!(board.tick().is_some());
//! ```

mod clock;
mod config;
mod deck;
mod engine;
mod error;
mod rng;
mod shuffle;
pub mod stats;
mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Difficulty, StartConfig, MAX_TILE_COUNT};
pub use deck::{SymbolDeck, SymbolId};
pub use engine::{
    Board, BoardSnapshot, IgnoreReason, Outcome, SelectOutcome, Tile, RESOLVE_DELAY,
};
pub use error::{ConfigError, StoreError, StoreResult};
pub use rng::Rng;
pub use shuffle::Shuffler;
pub use stats::{
    BestTime, Conclusion, FlipKind, KvBackend, MemoryBackend, Reported, StatsRecord, StatsStore,
};
pub use timer::{Scheduler, TimerId};
