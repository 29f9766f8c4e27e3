//! Tests for the WASM bindings

use crate::{LocalStorageBackend, PairsGame, PerformanceClock};
use pairs_core::stats::{KvBackend, StatsStore};
use pairs_core::{BoardSnapshot, Clock, Outcome};
use std::sync::Arc;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_local_storage_round_trip() {
    let backend = LocalStorageBackend::new();
    assert!(backend.is_available());

    backend.set("flip_test_key", "7").unwrap();
    assert_eq!(backend.get("flip_test_key").unwrap().as_deref(), Some("7"));
    backend.remove("flip_test_key").unwrap();
    assert_eq!(backend.get("flip_test_key").unwrap(), None);
}

#[wasm_bindgen_test]
fn test_store_over_local_storage() {
    let store = StatsStore::new(Arc::new(LocalStorageBackend::new()));
    store.reset().into_result().unwrap();
    store.session_started().into_result().unwrap();
    assert_eq!(store.read().value.in_flight, 1);
    store.reset().into_result().unwrap();
}

#[wasm_bindgen_test]
fn test_new_game_state() {
    let game = PairsGame::new("casual").unwrap();
    assert_eq!(game.tile_count(), 16);
    assert_eq!(game.grid_side(), 4);
    assert!(!game.is_paused());

    let snapshot: BoardSnapshot = serde_json::from_str(&game.get_state_json()).unwrap();
    assert_eq!(snapshot.tiles.len(), 16);
    assert_eq!(snapshot.outcome, Outcome::InProgress);
    assert_eq!(snapshot.difficulty_key, "casual");
}

#[wasm_bindgen_test]
fn test_bad_configs_rejected() {
    assert!(PairsGame::new("impossible").is_err());
    assert!(PairsGame::custom(1, 30).is_err());
    assert!(PairsGame::custom(8, 0).is_err());
}

#[wasm_bindgen_test]
fn test_pause_and_abandon() {
    let mut game = PairsGame::custom(6, 30).unwrap();
    assert!(game.toggle_pause());
    assert_eq!(game.tick(), "in_progress");
    assert_eq!(game.abandon().as_deref(), Some("abandoned"));
    assert_eq!(game.abandon(), None);
    assert_eq!(game.tick(), "abandoned");
    assert_eq!(game.storage_warning(), None);
}

#[wasm_bindgen_test]
fn test_performance_clock_monotonic() {
    let clock = PerformanceClock::new();
    let a = clock.now();
    let b = clock.now();
    assert!(b >= a);
}
