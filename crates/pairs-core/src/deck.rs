use crate::shuffle::Shuffler;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the symbol printed on a tile.
///
/// Real pairs use ids `0..pair_count`; the filler of an odd board gets
/// `pair_count`. Mapping ids to glyphs is left to the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Builds the shuffled symbol sequence for a board
#[derive(Debug, Clone, Default)]
pub struct SymbolDeck {
    shuffler: Shuffler,
}

impl SymbolDeck {
    pub fn new() -> Self {
        Self {
            shuffler: Shuffler::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            shuffler: Shuffler::with_seed(seed),
        }
    }

    /// Generate `tile_count` symbols: every pair id twice, plus one filler
    /// id when `tile_count` is odd, in shuffled order.
    pub fn generate(&mut self, tile_count: usize) -> Vec<SymbolId> {
        let pair_count = tile_count / 2;
        let mut symbols = Vec::with_capacity(tile_count);
        for id in 0..pair_count {
            symbols.push(SymbolId(id as u32));
            symbols.push(SymbolId(id as u32));
        }
        if tile_count % 2 == 1 {
            symbols.push(Self::filler_for(pair_count));
        }
        self.shuffler.shuffle(&symbols)
    }

    /// The id reserved for the unpaired tile on a board with `pair_count` pairs
    pub fn filler_for(pair_count: usize) -> SymbolId {
        SymbolId(pair_count as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn counts(symbols: &[SymbolId]) -> HashMap<SymbolId, usize> {
        let mut map = HashMap::new();
        for &s in symbols {
            *map.entry(s).or_insert(0) += 1;
        }
        map
    }

    #[test]
    fn test_every_symbol_twice_on_even_boards() {
        let mut deck = SymbolDeck::with_seed(11);
        for n in [2, 4, 16, 36, 64] {
            let symbols = deck.generate(n);
            assert_eq!(symbols.len(), n);
            let counts = counts(&symbols);
            assert_eq!(counts.len(), n / 2);
            assert!(counts.values().all(|&c| c == 2));
        }
    }

    #[test]
    fn test_single_filler_on_odd_boards() {
        let mut deck = SymbolDeck::with_seed(12);
        for n in [3, 9, 25, 49] {
            let symbols = deck.generate(n);
            assert_eq!(symbols.len(), n);
            let counts = counts(&symbols);
            let singles: Vec<_> = counts.iter().filter(|(_, &c)| c == 1).collect();
            assert_eq!(singles.len(), 1, "board of {} tiles", n);
            assert_eq!(*singles[0].0, SymbolDeck::filler_for(n / 2));
            assert_eq!(counts.values().filter(|&&c| c == 2).count(), n / 2);
        }
    }

    #[test]
    fn test_property_holds_for_all_small_counts() {
        let mut deck = SymbolDeck::new();
        for n in 0..=64 {
            let symbols = deck.generate(n);
            assert_eq!(symbols.len(), n);
            let counts = counts(&symbols);
            let singles = counts.values().filter(|&&c| c == 1).count();
            assert!(counts.values().all(|&c| c == 1 || c == 2));
            assert_eq!(singles, n % 2);
        }
    }

    #[test]
    fn test_symbol_display_is_zero_padded() {
        assert_eq!(SymbolId(3).to_string(), "03");
        assert_eq!(SymbolId(21).to_string(), "21");
    }
}
