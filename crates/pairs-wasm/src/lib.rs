//! WebAssembly bindings for the Pairs game
//!
//! The host page draws the board and drives time: it forwards clicks to
//! [`PairsGame::select_tile`] and calls [`PairsGame::tick`] from
//! `requestAnimationFrame`. Stats live in `localStorage` under the
//! `flip_*` keys.

use pairs_core::{Board, Difficulty, StartConfig, StatsStore, SymbolDeck};
use std::sync::Arc;
use wasm_bindgen::prelude::*;

mod clock;
mod storage;

// WASM tests require wasm-pack test to run
#[cfg(all(test, target_arch = "wasm32"))]
mod tests;

pub use clock::PerformanceClock;
pub use storage::LocalStorageBackend;

// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // a second init (e.g. from tests) keeps the first logger
    let _ = console_log::init_with_level(log::Level::Info);
}

fn browser_store() -> StatsStore {
    StatsStore::new(Arc::new(LocalStorageBackend::new()))
}

/// Read lifetime stats without starting a game
#[wasm_bindgen]
pub fn read_stats_json() -> String {
    serde_json::to_string(&browser_store().read().value).unwrap_or_default()
}

/// One game session in the browser
#[wasm_bindgen]
pub struct PairsGame {
    board: Board<PerformanceClock>,
    /// Latest storage problem, for the host to display
    warning: Option<String>,
}

impl PairsGame {
    fn start(config: StartConfig) -> PairsGame {
        let stats = browser_store();
        let board = Board::new(config, &mut SymbolDeck::new(), PerformanceClock::new(), stats);
        let mut game = PairsGame {
            board,
            warning: None,
        };
        game.collect_warnings();
        game
    }

    fn collect_warnings(&mut self) {
        if let Some(err) = self.board.take_warnings().pop() {
            self.warning = Some(err.to_string());
        }
    }
}

#[wasm_bindgen]
impl PairsGame {
    /// Start a game at a built-in difficulty (`casual`, `medium`, `hard`)
    #[wasm_bindgen(constructor)]
    pub fn new(difficulty: &str) -> Result<PairsGame, JsValue> {
        let difficulty: Difficulty = difficulty.parse().map_err(|e: String| JsValue::from_str(&e))?;
        Ok(Self::start(StartConfig::for_difficulty(difficulty)))
    }

    /// Start a game with a custom board size and time limit
    #[wasm_bindgen]
    pub fn custom(tiles: usize, time_limit_secs: u32) -> Result<PairsGame, JsValue> {
        let config = StartConfig::custom(tiles, u64::from(time_limit_secs))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::start(config))
    }

    /// Flip a tile. Returns the select outcome as a JS object.
    #[wasm_bindgen]
    pub fn select_tile(&mut self, index: usize) -> JsValue {
        let outcome = self.board.select_tile(index);
        serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL)
    }

    /// Toggle pause; returns the new paused state
    #[wasm_bindgen]
    pub fn toggle_pause(&mut self) -> bool {
        self.board.toggle_pause()
    }

    /// Abandon the session. Returns `undefined` if it already ended.
    #[wasm_bindgen]
    pub fn abandon(&mut self) -> Option<String> {
        let outcome = self.board.abandon();
        self.collect_warnings();
        outcome.map(|o| o.as_str().to_string())
    }

    /// Update game state (call from requestAnimationFrame).
    /// Returns the current outcome: `in_progress`, `won`, `lost` or `abandoned`.
    #[wasm_bindgen]
    pub fn tick(&mut self) -> String {
        self.board.tick();
        self.collect_warnings();
        self.board.outcome().as_str().to_string()
    }

    /// Get current board state as JSON
    #[wasm_bindgen]
    pub fn get_state_json(&self) -> String {
        serde_json::to_string(&self.board.snapshot()).unwrap_or_default()
    }

    /// Get current board state as a JS object
    #[wasm_bindgen]
    pub fn get_state(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.board.snapshot()).unwrap_or(JsValue::NULL)
    }

    /// Get lifetime stats as JSON
    #[wasm_bindgen]
    pub fn get_stats_json(&mut self) -> String {
        let report = self.board.stats().read();
        if let Some(err) = report.warning {
            self.warning = Some(err.to_string());
        }
        serde_json::to_string(&report.value).unwrap_or_default()
    }

    /// Latest storage warning, cleared by reading it
    #[wasm_bindgen]
    pub fn storage_warning(&mut self) -> Option<String> {
        self.warning.take()
    }

    #[wasm_bindgen]
    pub fn is_paused(&self) -> bool {
        self.board.is_paused()
    }

    #[wasm_bindgen]
    pub fn remaining_ms(&self) -> f64 {
        self.board.remaining().as_millis() as f64
    }

    #[wasm_bindgen]
    pub fn elapsed_ms(&self) -> f64 {
        self.board.elapsed().as_millis() as f64
    }

    #[wasm_bindgen]
    pub fn tile_count(&self) -> usize {
        self.board.tiles().len()
    }

    /// Side of the square grid the host should lay tiles out on
    #[wasm_bindgen]
    pub fn grid_side(&self) -> usize {
        self.board.config().grid_side()
    }
}
