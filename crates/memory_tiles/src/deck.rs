//! Deck construction and shuffling.

use std::collections::HashSet;

use derive_more::{Display, Error};
use rand::Rng;
use tracing::{debug, instrument};

use crate::{Symbol, Tile, TileId};

/// Faces used when no custom symbol set is configured.
pub const DEFAULT_SYMBOLS: [&str; 8] = ["🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼"];

/// Error building a symbol set.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum DeckError {
    /// No symbols were supplied.
    #[display("A deck needs at least one pair")]
    Empty,
    /// More pairs requested than the default set provides.
    #[display("Requested {requested} pairs but only {available} symbols are available")]
    TooManyPairs {
        /// Pairs asked for.
        requested: usize,
        /// Symbols on offer.
        available: usize,
    },
    /// The same face appears twice in the set.
    #[display("Symbol '{_0}' appears more than once")]
    Duplicate(#[error(not(source))] Symbol),
}

/// The N distinct faces a deck of 2N tiles is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSet {
    symbols: Vec<Symbol>,
}

impl SymbolSet {
    /// Creates a set from distinct symbols.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError`] if the list is empty or contains duplicates.
    #[instrument(skip(symbols))]
    pub fn new(symbols: Vec<Symbol>) -> Result<Self, DeckError> {
        if symbols.is_empty() {
            return Err(DeckError::Empty);
        }
        let mut seen = HashSet::new();
        for symbol in &symbols {
            if !seen.insert(symbol) {
                return Err(DeckError::Duplicate(symbol.clone()));
            }
        }
        Ok(Self { symbols })
    }

    /// Takes the first `pairs` faces of [`DEFAULT_SYMBOLS`].
    ///
    /// # Errors
    ///
    /// Returns [`DeckError`] if `pairs` is zero or exceeds the default set.
    #[instrument]
    pub fn first(pairs: usize) -> Result<Self, DeckError> {
        if pairs == 0 {
            return Err(DeckError::Empty);
        }
        if pairs > DEFAULT_SYMBOLS.len() {
            return Err(DeckError::TooManyPairs {
                requested: pairs,
                available: DEFAULT_SYMBOLS.len(),
            });
        }
        Ok(Self {
            symbols: DEFAULT_SYMBOLS[..pairs].iter().map(|s| Symbol::from(*s)).collect(),
        })
    }

    /// Number of pairs (N).
    pub fn pairs(&self) -> usize {
        self.symbols.len()
    }

    /// The distinct faces.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Builds a shuffled board of 2N hidden tiles. Ids follow board order.
    #[instrument(skip(self, rng), fields(pairs = self.pairs()))]
    pub fn deal<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Tile> {
        let mut faces: Vec<Symbol> = self
            .symbols
            .iter()
            .chain(self.symbols.iter())
            .cloned()
            .collect();
        shuffle_with(&mut faces, rng);
        debug!(tiles = faces.len(), "Dealt deck");
        faces
            .into_iter()
            .enumerate()
            .map(|(index, content)| Tile::new(TileId(index), content))
            .collect()
    }
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| Symbol::from(*s)).collect(),
        }
    }
}

/// Fisher–Yates shuffle driven by the given RNG.
pub fn shuffle_with<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Fisher–Yates shuffle using the thread-local RNG.
pub fn shuffle<T>(items: &mut [T]) {
    shuffle_with(items, &mut rand::thread_rng());
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    #[test]
    fn test_deal_pairs_every_symbol_twice() {
        let mut rng = StdRng::seed_from_u64(7);
        for pairs in 1..=DEFAULT_SYMBOLS.len() {
            let set = SymbolSet::first(pairs).expect("valid pair count");
            let tiles = set.deal(&mut rng);
            assert_eq!(tiles.len(), pairs * 2);

            let mut counts: HashMap<&str, usize> = HashMap::new();
            for tile in &tiles {
                *counts.entry(tile.content.as_str()).or_default() += 1;
            }
            assert_eq!(counts.len(), pairs);
            assert!(counts.values().all(|&c| c == 2));
        }
    }

    #[test]
    fn test_deal_assigns_ids_in_board_order() {
        let mut rng = StdRng::seed_from_u64(1);
        let tiles = SymbolSet::default().deal(&mut rng);
        for (index, tile) in tiles.iter().enumerate() {
            assert_eq!(tile.id, TileId(index));
            assert!(tile.is_hidden());
        }
    }

    #[test]
    fn test_shuffle_keeps_multiset() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut items: Vec<u32> = (0..50).collect();
        shuffle_with(&mut items, &mut rng);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffle_reaches_every_permutation_of_three() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = HashMap::new();
        for _ in 0..6000 {
            let mut items = [0u8, 1, 2];
            shuffle_with(&mut items, &mut rng);
            *seen.entry(items).or_insert(0usize) += 1;
        }
        assert_eq!(seen.len(), 6);
        // Each of the 6 orders expects ~1000 hits.
        assert!(seen.values().all(|&n| (800..1200).contains(&n)));
    }

    #[test]
    fn test_symbol_set_rejects_duplicates() {
        let result = SymbolSet::new(vec![Symbol::from("A"), Symbol::from("A")]);
        assert_eq!(result, Err(DeckError::Duplicate(Symbol::from("A"))));
    }

    #[test]
    fn test_symbol_set_rejects_bad_pair_counts() {
        assert_eq!(SymbolSet::first(0), Err(DeckError::Empty));
        assert!(matches!(
            SymbolSet::first(9),
            Err(DeckError::TooManyPairs { requested: 9, .. })
        ));
    }
}
