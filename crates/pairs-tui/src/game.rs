use pairs_core::{
    Board, Clock, Outcome, SelectOutcome, StartConfig, StatsStore, StoreError, SymbolDeck,
    SymbolId, SystemClock,
};

/// Glyphs printed on face-up tiles, by symbol id
const GLYPHS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789abcdefghijklmnopqrstuvwxyz#$%&@";

/// Label for a symbol: one glyph while they last, then the numeric id
pub fn symbol_label(symbol: SymbolId) -> String {
    match GLYPHS.get(symbol.index()) {
        Some(&glyph) => (glyph as char).to_string(),
        None => symbol.0.to_string(),
    }
}

/// A game session plus the cursor used to pick tiles
pub struct Game<C: Clock = SystemClock> {
    board: Board<C>,
    /// Tile index under the cursor
    cursor: usize,
    /// Tiles per grid row
    side: usize,
}

impl Game<SystemClock> {
    /// Deal a new board on the wall clock. A seed makes the deal reproducible.
    pub fn new(config: StartConfig, seed: Option<u64>, stats: StatsStore) -> Self {
        let mut deck = match seed {
            Some(seed) => SymbolDeck::with_seed(seed),
            None => SymbolDeck::new(),
        };
        Self::with_clock(config, &mut deck, SystemClock::new(), stats)
    }
}

impl<C: Clock> Game<C> {
    pub fn with_clock(config: StartConfig, deck: &mut SymbolDeck, clock: C, stats: StatsStore) -> Self {
        let side = config.grid_side();
        Self {
            board: Board::new(config, deck, clock, stats),
            cursor: 0,
            side,
        }
    }

    pub fn board(&self) -> &Board<C> {
        &self.board
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Number of grid rows in use
    pub fn rows(&self) -> usize {
        self.board.tiles().len().div_ceil(self.side)
    }

    /// Move the cursor, wrapping around the edges of the grid
    pub fn move_cursor(&mut self, drow: isize, dcol: isize) {
        let count = self.board.tiles().len();
        let rows = self.rows() as isize;
        let side = self.side as isize;
        let mut row = self.cursor as isize / side;
        let mut col = self.cursor as isize % side;

        // the last row may be short, so step until we land on a tile
        for _ in 0..(rows * side) {
            row = (row + drow).rem_euclid(rows);
            col = (col + dcol).rem_euclid(side);
            let index = (row * side + col) as usize;
            if index < count {
                self.cursor = index;
                return;
            }
        }
    }

    pub fn select(&mut self) -> SelectOutcome {
        self.board.select_tile(self.cursor)
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.board.toggle_pause()
    }

    pub fn is_paused(&self) -> bool {
        self.board.is_paused()
    }

    pub fn abandon(&mut self) -> Option<Outcome> {
        self.board.abandon()
    }

    pub fn tick(&mut self) -> Option<Outcome> {
        self.board.tick()
    }

    pub fn outcome(&self) -> Outcome {
        self.board.outcome()
    }

    pub fn is_finished(&self) -> bool {
        self.board.outcome().is_terminal()
    }

    pub fn take_warnings(&mut self) -> Vec<StoreError> {
        self.board.take_warnings()
    }

    /// Text shown for a tile: its label when face-up, blank otherwise
    pub fn tile_label(&self, index: usize) -> Option<String> {
        let tile = self.board.tiles().get(index)?;
        let show = self.board.is_face_up(index) || self.is_finished();
        show.then(|| {
            if self.board.filler() == Some(index) {
                "*".to_string()
            } else {
                symbol_label(tile.symbol)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairs_core::{Difficulty, ManualClock};

    fn game(tiles: usize) -> Game<ManualClock> {
        let clock = ManualClock::new();
        let config = StartConfig::custom(tiles, 60).unwrap();
        Game::with_clock(
            config,
            &mut SymbolDeck::with_seed(5),
            clock,
            StatsStore::in_memory(),
        )
    }

    #[test]
    fn test_cursor_wraps() {
        let mut game = game(16);
        assert_eq!(game.side(), 4);
        game.move_cursor(0, -1);
        assert_eq!(game.cursor(), 3);
        game.move_cursor(-1, 0);
        assert_eq!(game.cursor(), 15);
        game.move_cursor(1, 1);
        assert_eq!(game.cursor(), 0);
    }

    #[test]
    fn test_cursor_skips_missing_tiles() {
        // 7 tiles on a 3x3 grid: the last row holds only index 6
        let mut game = game(7);
        assert_eq!(game.rows(), 3);
        game.move_cursor(0, 2);
        assert_eq!(game.cursor(), 2);
        game.move_cursor(1, 0);
        assert_eq!(game.cursor(), 5);
        game.move_cursor(1, 0);
        // index 8 does not exist, wraps to the top row
        assert_eq!(game.cursor(), 2);
    }

    #[test]
    fn test_labels_follow_face_up_state() {
        let mut game = game(4);
        assert_eq!(game.tile_label(0), None);
        assert_eq!(game.select(), SelectOutcome::Flipped);
        assert!(game.tile_label(0).is_some());

        game.abandon();
        assert!((0..4).all(|i| game.tile_label(i).is_some()));
        assert_eq!(game.tile_label(4), None);
    }

    #[test]
    fn test_symbol_labels() {
        assert_eq!(symbol_label(SymbolId(0)), "A");
        assert_eq!(symbol_label(SymbolId(26)), "0");
        assert_eq!(symbol_label(SymbolId(500)), "500");
    }

    #[test]
    fn test_wall_clock_game() {
        let mut game = Game::new(
            StartConfig::for_difficulty(Difficulty::Medium),
            Some(1),
            StatsStore::in_memory(),
        );
        assert_eq!(game.side(), 6);
        assert!(game.toggle_pause());
        assert_eq!(game.tick(), None);
        assert_eq!(game.abandon(), Some(Outcome::Abandoned));
    }
}
