//! Memory tiles - pure game logic for a tile-pairing memory game.
//!
//! # Architecture
//!
//! - **Deck**: symbol sets and unbiased Fisher–Yates dealing
//! - **Engine**: the flip/match/undo/hint state machine
//! - **Actions**: typed payloads describing each tracked interaction
//!
//! # Example
//!
//! ```
//! use memory_tiles::{FlipOutcome, MemoryGame, SymbolSet};
//!
//! let mut game = MemoryGame::new(SymbolSet::first(2).unwrap());
//! assert!(matches!(game.flip(0), FlipOutcome::Selected(_)));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod deck;
mod engine;
mod types;

pub use action::{ActionDetails, ActionKind, SessionOutcome};
pub use deck::{DEFAULT_SYMBOLS, DeckError, SymbolSet, shuffle, shuffle_with};
pub use engine::{
    FlipOutcome, HINT_DURATION, Hint, MISMATCH_DELAY, MemoryGame, Snapshot, UndoOutcome,
};
pub use types::{Phase, Symbol, Tile, TileId};
