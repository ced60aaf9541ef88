//! The tile engine with every transition reported to the tracker.

use memory_tiles::{
    ActionDetails, FlipOutcome, Hint, MemoryGame, SessionOutcome, TileId, UndoOutcome,
};
use tracing::{debug, info, instrument};

use crate::tracker::{SessionHandle, SessionTracker, TrackerTransport};

/// A [`MemoryGame`] whose session and actions are tracked.
#[derive(Debug)]
pub struct TrackedGame<T: TrackerTransport> {
    game: MemoryGame,
    tracker: SessionTracker<T>,
    handle: SessionHandle,
}

impl<T: TrackerTransport> TrackedGame<T> {
    /// Wraps a freshly dealt game. Call [`TrackedGame::start`] before play.
    pub fn new(game: MemoryGame, tracker: SessionTracker<T>, handle: SessionHandle) -> Self {
        Self {
            game,
            tracker,
            handle,
        }
    }

    /// The engine.
    pub fn game(&self) -> &MemoryGame {
        &self.game
    }

    /// The session handle.
    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    /// The tracker.
    pub fn tracker(&self) -> &SessionTracker<T> {
        &self.tracker
    }

    /// Opens a session and records `game_start`.
    #[instrument(skip(self))]
    pub async fn start(&mut self) {
        self.tracker.start_session(&mut self.handle).await;
        self.tracker
            .log_action(&self.handle, ActionDetails::GameStart);
    }

    /// Flips a tile, recording the click and any resolved pair.
    ///
    /// Winning records `game_end` and closes the session as `win`.
    #[instrument(skip(self))]
    pub fn flip(&mut self, index: usize) -> FlipOutcome {
        let outcome = self.game.flip(index);
        if !outcome.accepted() {
            return outcome;
        }

        if let Some(tile) = self.game.tile(TileId(index)) {
            let click = ActionDetails::TileClick {
                tile: tile.content.clone(),
                tile_id: tile.id,
                is_first_tile: matches!(outcome, FlipOutcome::Selected(_)),
            };
            self.tracker.log_action(&self.handle, click);
        }

        if let Some((tiles, is_match)) = outcome.pair() {
            self.tracker
                .log_action(&self.handle, ActionDetails::MatchAttempt { tiles, is_match });
        }

        if let FlipOutcome::Won(..) = outcome {
            info!(moves = self.game.move_count(), "Game won");
            self.close(SessionOutcome::Win);
        }
        outcome
    }

    /// Hides a mismatched pair once its display pause is over.
    pub fn conceal_mismatch(&mut self) -> bool {
        self.game.conceal_mismatch()
    }

    /// Requests a hint. The request is recorded even when no hint is available.
    #[instrument(skip(self))]
    pub fn hint(&mut self) -> Option<Hint> {
        self.tracker.log_action(&self.handle, ActionDetails::Hint);
        self.game.hint()
    }

    /// Ends a hint reveal.
    pub fn clear_hint(&mut self) {
        self.game.clear_hint();
    }

    /// Undoes the last click. Only a restored snapshot is recorded.
    #[instrument(skip(self))]
    pub fn undo(&mut self) -> UndoOutcome {
        let outcome = self.game.undo();
        if let UndoOutcome::Restored { .. } = outcome {
            self.tracker.log_action(&self.handle, ActionDetails::Undo);
        }
        outcome
    }

    /// Deals a new board, closing an unfinished session as `incomplete`
    /// and opening a fresh one.
    #[instrument(skip(self))]
    pub async fn reset(&mut self) {
        self.close(SessionOutcome::Incomplete);
        self.game.reset();
        debug!("Board reset");
        self.start().await;
    }

    /// Waits for every tracking call sent so far.
    pub async fn flush(&mut self) {
        self.tracker.flush().await;
    }

    /// Closes an unfinished session as `incomplete` and waits for every
    /// pending tracking call.
    #[instrument(skip(self))]
    pub async fn finish(&mut self) {
        self.close(SessionOutcome::Incomplete);
        self.tracker.flush().await;
    }

    fn close(&mut self, outcome: SessionOutcome) {
        if !self.handle.is_active() {
            return;
        }
        self.tracker
            .log_action(&self.handle, ActionDetails::GameEnd { outcome });
        self.tracker.end_session(&mut self.handle, outcome);
    }
}
