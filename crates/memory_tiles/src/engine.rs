//! Tile engine: the flip/match/undo/hint state machine.
//!
//! The engine never sleeps. Operations that imply a visible pause (the
//! back-flip of a mismatched pair, the hint reveal) report how long the
//! pause should last, and the caller finishes the transition with
//! [`MemoryGame::conceal_mismatch`] or [`MemoryGame::clear_hint`] once the
//! time has passed.
//!
//! Every operation is a no-op on invalid input. Nothing here returns an
//! error.

use std::time::Duration;

use derive_getters::Getters;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{Phase, SymbolSet, Tile, TileId};

/// How long a mismatched pair stays face up before flipping back.
pub const MISMATCH_DELAY: Duration = Duration::from_millis(1000);

/// How long a hinted pair is highlighted.
pub const HINT_DURATION: Duration = Duration::from_millis(800);

/// Board and move counter captured before a tile click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    board: Vec<Tile>,
    move_count: u32,
}

/// What a call to [`MemoryGame::flip`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Nothing changed.
    Rejected,
    /// First tile of a pair turned face up.
    Selected(TileId),
    /// Second tile matched the first. Both are now matched.
    Matched(TileId, TileId),
    /// Second tile did not match. Call [`MemoryGame::conceal_mismatch`]
    /// after `conceal_after`.
    Mismatched {
        /// Tile selected first.
        first: TileId,
        /// Tile selected second.
        second: TileId,
        /// Display pause before the back-flip.
        conceal_after: Duration,
    },
    /// The final pair matched. Reported once per board.
    Won(TileId, TileId),
}

impl FlipOutcome {
    /// Whether the flip changed the board.
    pub fn accepted(&self) -> bool {
        !matches!(self, FlipOutcome::Rejected)
    }

    /// The resolved pair and whether it matched, if this flip completed a pair.
    pub fn pair(&self) -> Option<([TileId; 2], bool)> {
        match *self {
            FlipOutcome::Matched(a, b) | FlipOutcome::Won(a, b) => Some(([a, b], true)),
            FlipOutcome::Mismatched { first, second, .. } => Some(([first, second], false)),
            FlipOutcome::Rejected | FlipOutcome::Selected(_) => None,
        }
    }
}

/// What a call to [`MemoryGame::undo`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// History empty or game already won.
    Rejected,
    /// The previous snapshot is back in place.
    Restored {
        /// Move counter after the restore.
        move_count: u32,
    },
}

/// A pair briefly revealed to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    /// The two tiles sharing a face.
    pub tiles: [TileId; 2],
    /// How long to highlight them.
    pub duration: Duration,
}

/// A single memory game on one shuffled board.
#[derive(Debug, Clone)]
pub struct MemoryGame {
    symbols: SymbolSet,
    board: Vec<Tile>,
    move_count: u32,
    history: Vec<Snapshot>,
    phase: Phase,
    hinted: Option<[TileId; 2]>,
}

impl MemoryGame {
    /// Deals a new game from the given symbols using the thread RNG.
    #[instrument(skip(symbols), fields(pairs = symbols.pairs()))]
    pub fn new(symbols: SymbolSet) -> Self {
        Self::with_rng(symbols, &mut rand::thread_rng())
    }

    /// Deals a new game using the supplied RNG.
    #[instrument(skip(symbols, rng), fields(pairs = symbols.pairs()))]
    pub fn with_rng<R: Rng + ?Sized>(symbols: SymbolSet, rng: &mut R) -> Self {
        let board = symbols.deal(rng);
        info!(tiles = board.len(), "New memory game dealt");
        Self {
            symbols,
            board,
            move_count: 0,
            history: Vec::new(),
            phase: Phase::Idle,
            hinted: None,
        }
    }

    /// Re-deals the same symbols and clears moves, history and selection.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.reset_with(&mut rand::thread_rng());
    }

    /// Re-deals using the supplied RNG.
    #[instrument(skip(self, rng))]
    pub fn reset_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        *self = Self::with_rng(self.symbols.clone(), rng);
    }

    /// The tiles in board order.
    pub fn board(&self) -> &[Tile] {
        &self.board
    }

    /// The tile at `id`, if it exists.
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.board.get(id.index())
    }

    /// Completed pair selections, matched or not.
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Current global phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Snapshots available to undo.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// The currently highlighted hint pair.
    pub fn hinted(&self) -> Option<[TileId; 2]> {
        self.hinted
    }

    /// Symbols this board was dealt from.
    pub fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    /// Number of pairs already matched.
    pub fn matched_pairs(&self) -> usize {
        self.board.iter().filter(|t| t.is_matched).count() / 2
    }

    /// Tiles face up and not yet matched, in board order.
    pub fn pending(&self) -> Vec<TileId> {
        self.board
            .iter()
            .filter(|t| t.is_pending())
            .map(|t| t.id)
            .collect()
    }

    /// True iff every tile is matched.
    pub fn is_won(&self) -> bool {
        self.board.iter().all(|t| t.is_matched)
    }

    /// Turns the tile at `index` face up.
    ///
    /// Rejected while a mismatched pair is waiting for its back-flip, after
    /// the game is won, or if the tile is missing, face up, or matched.
    #[instrument(skip(self), fields(phase = ?self.phase, moves = self.move_count))]
    pub fn flip(&mut self, index: usize) -> FlipOutcome {
        if matches!(self.phase, Phase::Resolving(..) | Phase::Won) {
            debug!("Flip rejected: pair pending or game over");
            return FlipOutcome::Rejected;
        }
        let Some(tile) = self.board.get(index) else {
            debug!("Flip rejected: no such tile");
            return FlipOutcome::Rejected;
        };
        if tile.is_flipped || tile.is_matched {
            debug!("Flip rejected: tile already face up");
            return FlipOutcome::Rejected;
        }
        let id = tile.id;

        self.history.push(Snapshot {
            board: self.board.clone(),
            move_count: self.move_count,
        });
        self.board[index].is_flipped = true;

        match self.phase {
            Phase::OneSelected(first) => {
                self.move_count += 1;
                self.resolve(first, id)
            }
            _ => {
                self.phase = Phase::OneSelected(id);
                debug!(tile = %id, "First tile selected");
                FlipOutcome::Selected(id)
            }
        }
    }

    /// Settles a two-tile selection.
    fn resolve(&mut self, first: TileId, second: TileId) -> FlipOutcome {
        let is_match = self.board[first.index()].content == self.board[second.index()].content;

        if !is_match {
            self.phase = Phase::Resolving(first, second);
            debug!(%first, %second, "Pair mismatched");
            return FlipOutcome::Mismatched {
                first,
                second,
                conceal_after: MISMATCH_DELAY,
            };
        }

        self.board[first.index()].is_matched = true;
        self.board[second.index()].is_matched = true;

        if self.is_won() {
            self.phase = Phase::Won;
            self.hinted = None;
            info!(moves = self.move_count, "Board cleared");
            FlipOutcome::Won(first, second)
        } else {
            self.phase = Phase::Idle;
            debug!(%first, %second, matched = self.matched_pairs(), "Pair matched");
            FlipOutcome::Matched(first, second)
        }
    }

    /// Flips a mismatched pair back to hidden. Returns whether anything changed.
    ///
    /// Only the first call after a mismatch has an effect.
    #[instrument(skip(self), fields(phase = ?self.phase))]
    pub fn conceal_mismatch(&mut self) -> bool {
        let Phase::Resolving(first, second) = self.phase else {
            return false;
        };
        self.board[first.index()].is_flipped = false;
        self.board[second.index()].is_flipped = false;
        self.phase = Phase::Idle;
        debug!(%first, %second, "Mismatched pair hidden");
        true
    }

    /// Restores the board and move counter from before the last tile click.
    ///
    /// The pending selection is rebuilt from the restored board, which also
    /// cancels a back-flip that was still waiting.
    #[instrument(skip(self), fields(history = self.history.len()))]
    pub fn undo(&mut self) -> UndoOutcome {
        if self.phase.is_won() {
            debug!("Undo rejected: game over");
            return UndoOutcome::Rejected;
        }
        let Some(snapshot) = self.history.pop() else {
            debug!("Undo rejected: history empty");
            return UndoOutcome::Rejected;
        };

        self.board = snapshot.board;
        self.move_count = snapshot.move_count;
        self.hinted = None;
        let pending = self.pending();
        self.phase = match pending.as_slice() {
            [] => Phase::Idle,
            [only] => Phase::OneSelected(*only),
            [first, second, ..] => Phase::Resolving(*first, *second),
        };

        info!(moves = self.move_count, phase = ?self.phase, "Move undone");
        UndoOutcome::Restored {
            move_count: self.move_count,
        }
    }

    /// Picks the first hidden tile and its partner for a brief reveal.
    ///
    /// Flip state is untouched. Returns `None` once fewer than two hidden
    /// unmatched tiles remain or the game is over.
    #[instrument(skip(self))]
    pub fn hint(&mut self) -> Option<Hint> {
        if self.phase.is_won() {
            return None;
        }
        let mut hidden = self.board.iter().filter(|t| t.is_hidden());
        let first = hidden.next()?;
        hidden.next()?;

        let partner = self
            .board
            .iter()
            .find(|t| !t.is_matched && t.id != first.id && t.content == first.content)?;

        let tiles = [first.id, partner.id];
        self.hinted = Some(tiles);
        debug!(first = %tiles[0], second = %tiles[1], "Hint revealed");
        Some(Hint {
            tiles,
            duration: HINT_DURATION,
        })
    }

    /// Ends a hint reveal.
    pub fn clear_hint(&mut self) {
        self.hinted = None;
    }
}
