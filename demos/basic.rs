//! Basic example of using the Pairs engine

use pairs_core::{
    Board, Difficulty, ManualClock, Outcome, StartConfig, StatsStore, SymbolDeck, RESOLVE_DELAY,
};
use std::collections::HashMap;

fn main() {
    // Deal a reproducible casual board on a simulated clock
    let clock = ManualClock::new();
    let stats = StatsStore::in_memory();
    let config = StartConfig::for_difficulty(Difficulty::Casual);
    println!(
        "Dealing a {} board: {} tiles, {}s on the clock\n",
        Difficulty::Casual,
        config.tile_count(),
        config.time_limit().as_secs()
    );
    let mut board = Board::new(config, &mut SymbolDeck::with_seed(42), clock.clone(), stats.clone());

    let side = board.config().grid_side();
    for row in board.tiles().chunks(side) {
        let line: Vec<String> = row.iter().map(|t| t.symbol.to_string()).collect();
        println!("  {}", line.join(" "));
    }

    // Find where each symbol sits
    let mut positions: HashMap<_, Vec<usize>> = HashMap::new();
    for tile in board.tiles() {
        positions.entry(tile.symbol).or_default().push(tile.id);
    }
    let mut pairs: Vec<_> = positions.into_values().filter(|p| p.len() == 2).collect();
    pairs.sort();

    // One wrong guess first
    let (a, b) = (pairs[0][0], pairs[1][0]);
    board.select_tile(a);
    board.select_tile(b);
    clock.advance(RESOLVE_DELAY);
    board.tick();
    println!("\nTiles {} and {} did not match", a, b);

    // Then clear the board
    for pair in &pairs {
        clock.advance_ms(750);
        board.select_tile(pair[0]);
        board.select_tile(pair[1]);
        clock.advance(RESOLVE_DELAY);
        if let Some(outcome) = board.tick() {
            println!("Session ended: {:?}", outcome);
        }
    }

    if board.outcome() == Outcome::Won {
        println!("Cleared in {:.1}s", board.elapsed().as_secs_f64());
    }

    let record = stats.read().value;
    println!("\n--- Stats ---\n");
    println!("Won: {}  Lost: {}  In flight: {}", record.won, record.lost, record.in_flight);
    println!("Matched flips: {}  Wrong flips: {}", record.matched, record.wrong);
    for difficulty in Difficulty::all() {
        println!("Best {}: {}", difficulty, record.best_time(difficulty.key()));
    }
}
