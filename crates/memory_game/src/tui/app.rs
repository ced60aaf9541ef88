//! Application state and key handling.

use std::time::Instant;

use crossterm::event::KeyCode;
use memory_tiles::{FlipOutcome, TileId, UndoOutcome};
use tracing::{debug, info};

use crate::tracker::{TrackedGame, TrackerTransport};
use crate::tui::input::{grid_columns, move_cursor};

/// Main application state.
#[derive(Debug)]
pub struct App<T: TrackerTransport> {
    game: TrackedGame<T>,
    cursor: usize,
    status: String,
    conceal_at: Option<Instant>,
    hint_until: Option<Instant>,
    should_quit: bool,
}

impl<T: TrackerTransport> App<T> {
    /// Creates the app around a started game.
    pub fn new(game: TrackedGame<T>) -> Self {
        Self {
            game,
            cursor: 0,
            status: help_text().to_string(),
            conceal_at: None,
            hint_until: None,
            should_quit: false,
        }
    }

    /// The tracked game.
    pub fn game(&self) -> &TrackedGame<T> {
        &self.game
    }

    /// Consumes the app, returning the game for shutdown.
    pub fn into_game(self) -> TrackedGame<T> {
        self.game
    }

    /// Highlighted board index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Grid width for the current board.
    pub fn columns(&self) -> usize {
        grid_columns(self.game.game().board().len())
    }

    /// Status line.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Whether the player asked to leave.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Applies one key press.
    pub async fn handle_key(&mut self, key: KeyCode, now: Instant) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                info!("User quit");
                self.should_quit = true;
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.flip(now),
            KeyCode::Char('h') => self.hint(now),
            KeyCode::Char('u') => self.undo(),
            KeyCode::Char('r') => {
                self.game.reset().await;
                self.cursor = 0;
                self.conceal_at = None;
                self.hint_until = None;
                self.status = "New board dealt. ".to_string() + help_text();
            }
            arrow => {
                let tiles = self.game.game().board().len();
                self.cursor = move_cursor(self.cursor, tiles, self.columns(), arrow);
            }
        }
    }

    /// Runs any back-flip or hint expiry that is due.
    pub fn tick(&mut self, now: Instant) {
        if self.conceal_at.is_some_and(|at| now >= at) {
            self.conceal_at = None;
            if self.game.conceal_mismatch() {
                debug!("Back-flip applied");
            }
        }
        if self.hint_until.is_some_and(|at| now >= at) {
            self.hint_until = None;
            self.game.clear_hint();
        }
    }

    fn flip(&mut self, now: Instant) {
        match self.game.flip(self.cursor) {
            FlipOutcome::Rejected => {}
            FlipOutcome::Selected(_) => self.status = "Pick a second tile.".to_string(),
            FlipOutcome::Matched(..) => self.status = "A match!".to_string(),
            FlipOutcome::Mismatched { conceal_after, .. } => {
                self.conceal_at = Some(now + conceal_after);
                self.status = "No match.".to_string();
            }
            FlipOutcome::Won(..) => {
                self.status = format!(
                    "You won in {} moves! Press r to play again or q to quit.",
                    self.game.game().move_count()
                );
            }
        }
    }

    fn hint(&mut self, now: Instant) {
        match self.game.hint() {
            Some(hint) => {
                self.hint_until = Some(now + hint.duration);
                self.status = "Hint shown.".to_string();
            }
            None => self.status = "No hint available.".to_string(),
        }
    }

    fn undo(&mut self) {
        match self.game.undo() {
            UndoOutcome::Restored { move_count } => {
                self.conceal_at = None;
                self.status = format!("Undone. Moves: {}.", move_count);
            }
            UndoOutcome::Rejected => self.status = "Nothing to undo.".to_string(),
        }
    }

    /// Whether `id` is highlighted by an active hint.
    pub fn is_hinted(&self, id: TileId) -> bool {
        self.game
            .game()
            .hinted()
            .is_some_and(|tiles| tiles.contains(&id))
    }
}

fn help_text() -> &'static str {
    "Arrows move, Enter flips, h hint, u undo, r reset, q quit."
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TransportError;
    use crate::tracker::{SessionHandle, SessionTracker};
    use async_trait::async_trait;
    use memory_tiles::{ActionDetails, MISMATCH_DELAY, MemoryGame, SessionOutcome, SymbolSet};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Transport for a server that is down.
    #[derive(Debug)]
    struct Offline;

    #[async_trait]
    impl TrackerTransport for Offline {
        async fn start_session(&self, _: &str) -> Result<String, TransportError> {
            Err(TransportError::Status {
                status: 503,
                message: "down".to_string(),
            })
        }

        async fn log_action(
            &self,
            _: &str,
            _: &str,
            _: &ActionDetails,
        ) -> Result<(), TransportError> {
            Ok(())
        }

        async fn end_session(&self, _: &str, _: SessionOutcome) -> Result<(), TransportError> {
            Ok(())
        }
    }

    async fn offline_app() -> App<Offline> {
        let symbols = SymbolSet::first(2).expect("valid pair count");
        let game = MemoryGame::with_rng(symbols, &mut StdRng::seed_from_u64(3));
        let mut tracked = TrackedGame::new(
            game,
            SessionTracker::new(Offline),
            SessionHandle::new("a@x.com"),
        );
        tracked.start().await;
        App::new(tracked)
    }

    fn partner_of(app: &App<Offline>, index: usize) -> usize {
        let board = app.game().game().board();
        (0..board.len())
            .find(|&i| i != index && board[i].content == board[index].content)
            .expect("partner")
    }

    #[tokio::test]
    async fn test_play_continues_when_server_is_down() {
        let mut app = offline_app().await;
        assert!(!app.game().handle().is_active());

        let now = Instant::now();
        app.handle_key(KeyCode::Enter, now).await;
        assert_eq!(app.game().game().pending().len(), 1);
    }

    #[tokio::test]
    async fn test_mismatch_hides_after_deadline() {
        let mut app = offline_app().await;
        let now = Instant::now();
        let partner = partner_of(&app, 0);
        let other = (1..4).find(|&i| i != partner).expect("other tile");

        app.handle_key(KeyCode::Enter, now).await;
        app.cursor = other;
        app.handle_key(KeyCode::Enter, now).await;
        assert_eq!(app.game().game().pending().len(), 2);

        app.tick(now);
        assert_eq!(app.game().game().pending().len(), 2);

        app.tick(now + MISMATCH_DELAY);
        assert!(app.game().game().pending().is_empty());
    }

    #[tokio::test]
    async fn test_hint_expires() {
        let mut app = offline_app().await;
        let now = Instant::now();

        app.handle_key(KeyCode::Char('h'), now).await;
        assert!(app.game().game().hinted().is_some());

        app.tick(now + memory_tiles::HINT_DURATION);
        assert!(app.game().game().hinted().is_none());
    }

    #[tokio::test]
    async fn test_quit_key() {
        let mut app = offline_app().await;
        app.handle_key(KeyCode::Char('q'), Instant::now()).await;
        assert!(app.should_quit());
    }
}
