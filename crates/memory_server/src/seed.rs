//! Sample data for trying out the dashboard on an empty database.

use memory_tiles::{ActionDetails, SessionOutcome, Symbol, TileId};
use tracing::{info, instrument, warn};

use crate::db::{DbError, DbErrorKind, EventStore, StoreError};

/// Account the sample session is attributed to.
pub const SAMPLE_EMAIL: &str = "demo@example.com";

fn click(face: &str, id: usize, is_first_tile: bool) -> ActionDetails {
    ActionDetails::TileClick {
        tile: Symbol::from(face),
        tile_id: TileId(id),
        is_first_tile,
    }
}

/// Inserts a short abandoned session and its actions.
///
/// Returns the number of actions written, or `None` if the store already
/// holds data and nothing was written.
///
/// # Errors
///
/// Returns [`DbError`] if a database error occurs.
#[instrument(skip(store))]
pub fn seed_sample_data(store: &EventStore) -> Result<Option<usize>, DbError> {
    if !store.is_empty()? {
        warn!("Database already contains data; seeding aborted");
        return Ok(None);
    }

    let session = store.create_session(SAMPLE_EMAIL)?;
    let session_id = session.session_id();

    let actions = [
        ActionDetails::GameStart,
        click("🐶", 0, true),
        click("🐱", 1, false),
        ActionDetails::MatchAttempt {
            tiles: [TileId(0), TileId(1)],
            is_match: false,
        },
        click("🐭", 2, true),
        click("🐹", 3, false),
        ActionDetails::MatchAttempt {
            tiles: [TileId(2), TileId(3)],
            is_match: false,
        },
        ActionDetails::Hint,
        click("🦊", 4, true),
        ActionDetails::Undo,
        ActionDetails::GameEnd {
            outcome: SessionOutcome::Incomplete,
        },
    ];

    for details in &actions {
        store.record_action(session_id, SAMPLE_EMAIL, details)?;
    }
    store
        .close_session(session_id, SessionOutcome::Incomplete)
        .map_err(|e| match e {
            StoreError::Db(db) => db,
            missing => DbError::new(DbErrorKind::Query, missing.to_string()),
        })?;

    info!(count = actions.len(), session_id = %session_id, "Sample data seeded");
    Ok(Some(actions.len()))
}
