//! Core domain types for the memory game.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Stable identifier of a tile, equal to its position on the board.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TileId(pub usize);

impl TileId {
    /// Returns the board index of this tile.
    pub fn index(self) -> usize {
        self.0
    }
}

/// The face printed on a tile. Exactly two tiles in a deck share a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a symbol from any string-like value.
    pub fn new(face: impl Into<String>) -> Self {
        Self(face.into())
    }

    /// Returns the symbol as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(face: &str) -> Self {
        Self(face.to_string())
    }
}

/// A single tile on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    /// Stable id for the lifetime of the game.
    pub id: TileId,
    /// Face shared with exactly one other tile.
    pub content: Symbol,
    /// Face up, waiting to be resolved.
    pub is_flipped: bool,
    /// Paired and removed from play.
    pub is_matched: bool,
}

impl Tile {
    /// Creates a hidden, unmatched tile.
    pub fn new(id: TileId, content: Symbol) -> Self {
        Self {
            id,
            content,
            is_flipped: false,
            is_matched: false,
        }
    }

    /// Whether the tile is still face down and in play.
    pub fn is_hidden(&self) -> bool {
        !self.is_flipped && !self.is_matched
    }

    /// Whether the tile is face up but not yet paired.
    pub fn is_pending(&self) -> bool {
        self.is_flipped && !self.is_matched
    }
}

/// Global phase of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No tile selected.
    Idle,
    /// One tile face up, waiting for its partner.
    OneSelected(TileId),
    /// Two mismatched tiles face up, waiting for the back-flip.
    Resolving(TileId, TileId),
    /// Every tile matched.
    Won,
}

impl Phase {
    /// Whether the game is over.
    pub fn is_won(self) -> bool {
        matches!(self, Phase::Won)
    }
}
