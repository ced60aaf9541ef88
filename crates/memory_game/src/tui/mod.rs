//! Terminal UI for playing a tracked game.

mod app;
mod input;
mod ui;

pub use app::App;
pub use input::{grid_columns, move_cursor};

use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use memory_tiles::{MemoryGame, SymbolSet};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info, instrument, warn};

use crate::client::{ApiClient, TransportError};
use crate::tracker::{HttpTransport, SessionHandle, SessionTracker, TrackedGame};

/// File the play mode logs to, so logs do not corrupt the screen.
pub const LOG_FILE: &str = "memory_game.log";

/// How long the loop waits for a key before checking timers.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Options for a play session.
#[derive(Debug, Clone)]
pub struct PlayOptions {
    /// Server base URL.
    pub server_url: String,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Create the account first.
    pub register: bool,
    /// Pairs on the board.
    pub pairs: usize,
}

/// Logs in, then runs the game until the player quits.
///
/// A server that cannot be reached leaves the game playable but untracked.
/// Rejected credentials end the run before the screen is taken over.
pub async fn run_tui(options: PlayOptions) -> Result<()> {
    let log_file = std::fs::File::create(LOG_FILE)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!(server_url = %options.server_url, pairs = options.pairs, "Starting memory game TUI");

    let symbols = SymbolSet::first(options.pairs).context("Invalid pair count")?;
    let client = ApiClient::new(options.server_url.clone());
    authenticate(&client, &options).await?;

    let mut game = TrackedGame::new(
        MemoryGame::new(symbols),
        SessionTracker::new(HttpTransport::new(client)),
        SessionHandle::new(options.email.clone()),
    );
    game.start().await;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(game);
    let res = run_loop(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let mut game = app.into_game();
    game.finish().await;

    if let Err(err) = res {
        error!(error = ?err, "Game loop error");
        return Err(err);
    }
    info!("Memory game TUI exited");
    Ok(())
}

/// Checks or creates the account. Network failures only warn.
#[instrument(skip_all, fields(email = %options.email))]
async fn authenticate(client: &ApiClient, options: &PlayOptions) -> Result<()> {
    if options.register {
        match client.register(&options.email, &options.password).await {
            Ok(message) => info!(message = %message, "Registered"),
            Err(TransportError::Status { status: 409, .. }) => {
                info!("Account already exists; logging in");
            }
            Err(TransportError::Status { message, .. }) => {
                anyhow::bail!("Registration failed: {}", message)
            }
            Err(e) => warn!(error = %e, "Server unreachable; playing offline"),
        }
    }

    match client.login(&options.email, &options.password).await {
        Ok(message) => info!(message = %message, "Logged in"),
        Err(TransportError::Status { message, .. }) => {
            anyhow::bail!("Login failed: {}", message)
        }
        Err(e) => warn!(error = %e, "Server unreachable; playing offline"),
    }
    Ok(())
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<HttpTransport>,
) -> Result<()> {
    loop {
        app.tick(Instant::now());
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code, Instant::now()).await;
                }
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
