//! Database repository for accounts, sessions and the action log.

use chrono::Utc;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use memory_tiles::{ActionDetails, SessionOutcome};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::db::{
    DbError, DbErrorKind, GameAction, GameSession, NewGameAction, NewGameSession, NewUser, SessionCounter,
    StoreError, User, schema,
};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Milliseconds SQLite waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Database repository for the memory game event store.
///
/// Every operation opens its own connection, so the store can be cloned
/// freely across request handlers.
#[derive(Debug, Clone)]
pub struct EventStore {
    db_path: String,
}

impl EventStore {
    /// Creates a repository for the database at the given path without
    /// touching the schema.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new(DbErrorKind::Path, "Database path must not be empty"));
        }
        info!(path = %db_path, "Creating EventStore");
        Ok(Self { db_path })
    }

    /// Creates a repository and applies any pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, DbError> {
        let store = Self::new(db_path)?;
        store.run_migrations()?;
        Ok(store)
    }

    /// Applies pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(DbErrorKind::Migration, format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(
                DbErrorKind::Connection,
                format!("Failed to connect to '{}': {}", self.db_path, e),
            )
        })?;
        diesel::sql_query(format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"))
            .execute(&mut conn)
            .map_err(|e| {
                DbError::new(DbErrorKind::Connection, format!("Failed to set busy timeout: {}", e))
            })?;
        Ok(conn)
    }

    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the email is already taken or a database error occurs.
    #[instrument(skip(self, user))]
    pub fn create_user(&self, user: NewUser) -> Result<User, DbError> {
        let mut conn = self.connection()?;

        let user = diesel::insert_into(schema::users::table)
            .values(&user)
            .returning(User::as_returning())
            .get_result(&mut conn)?;

        info!(user_id = user.id(), email = %user.email(), "User created");
        Ok(user)
    }

    /// Gets an account by email. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        debug!(email = %email, "Looking up user by email");
        let mut conn = self.connection()?;

        let user = schema::users::table
            .filter(schema::users::email.eq(email))
            .first::<User>(&mut conn)
            .optional()?;

        debug!(found = user.is_some(), "User lookup finished");
        Ok(user)
    }

    /// Opens a new session for a player with a fresh UUID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn create_session(&self, user_email: &str) -> Result<GameSession, DbError> {
        let mut conn = self.connection()?;

        let new_session = NewGameSession::new(
            Uuid::new_v4().to_string(),
            user_email.to_string(),
            Utc::now().naive_utc(),
            SessionOutcome::Incomplete.to_string(),
        );

        let session = diesel::insert_into(schema::game_sessions::table)
            .values(&new_session)
            .returning(GameSession::as_returning())
            .get_result(&mut conn)?;

        info!(session_id = %session.session_id(), user_email = %user_email, "Session started");
        Ok(session)
    }

    /// Gets a session by its public id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_session(&self, session_id: &str) -> Result<Option<GameSession>, DbError> {
        let mut conn = self.connection()?;
        let session = find_session(&mut conn, session_id)?;
        debug!(found = session.is_some(), "Session lookup finished");
        Ok(session)
    }

    /// Appends an action and bumps the owning session's counter.
    ///
    /// The insert and the counter update share one transaction. An action
    /// for an unknown session is still logged; its counter update touches
    /// no rows.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the payload cannot be encoded or a database error occurs.
    #[instrument(skip(self, details), fields(kind = %details.kind()))]
    pub fn record_action(
        &self,
        session_id: &str,
        user_email: &str,
        details: &ActionDetails,
    ) -> Result<GameAction, DbError> {
        let row = NewGameAction::new(
            session_id.to_string(),
            user_email.to_string(),
            details,
            Utc::now().naive_utc(),
        )?;
        let counter = SessionCounter::for_action(details);

        let mut conn = self.connection()?;
        let (action, bumped) = conn.immediate_transaction(|conn| {
            let action = diesel::insert_into(schema::game_actions::table)
                .values(&row)
                .returning(GameAction::as_returning())
                .get_result(conn)?;
            let bumped = match counter {
                Some(counter) => increment(conn, session_id, counter)?,
                None => 0,
            };
            Ok::<_, diesel::result::Error>((action, bumped))
        })?;

        if counter.is_some() && bumped == 0 {
            warn!(session_id = %session_id, "Action logged for unknown session; no counter updated");
        }
        debug!(action_id = action.id(), counter = ?counter, "Action recorded");
        Ok(action)
    }

    /// Closes a session with the given outcome.
    ///
    /// Closing an already closed session overwrites its end time,
    /// duration and outcome.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SessionNotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub fn close_session(
        &self,
        session_id: &str,
        outcome: SessionOutcome,
    ) -> Result<GameSession, StoreError> {
        use schema::game_sessions::dsl;

        let mut conn = self.connection()?;
        let session = find_session(&mut conn, session_id)?
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;

        if session.is_closed() {
            warn!(
                session_id = %session_id,
                previous_outcome = %session.outcome(),
                "Session already closed; overwriting end time and outcome"
            );
        }

        let end_time = Utc::now().naive_utc();
        let elapsed = end_time - *session.start_time();
        let duration = elapsed
            .num_microseconds()
            .map(|us| us as f64 / 1_000_000.0)
            .unwrap_or_else(|| elapsed.num_milliseconds() as f64 / 1_000.0);

        let closed = diesel::update(dsl::game_sessions.filter(dsl::session_id.eq(session_id)))
            .set((
                dsl::end_time.eq(Some(end_time)),
                dsl::duration_seconds.eq(Some(duration)),
                dsl::outcome.eq(outcome.to_string()),
            ))
            .returning(GameSession::as_returning())
            .get_result(&mut conn)?;

        info!(session_id = %session_id, outcome = %outcome, duration, "Session closed");
        Ok(closed)
    }

    /// Gets the most recently started sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn recent_sessions(&self, limit: i64) -> Result<Vec<GameSession>, DbError> {
        use schema::game_sessions::dsl;

        let mut conn = self.connection()?;
        let sessions = dsl::game_sessions
            .order((dsl::start_time.desc(), dsl::id.desc()))
            .limit(limit)
            .load::<GameSession>(&mut conn)?;

        debug!(count = sessions.len(), "Recent sessions loaded");
        Ok(sessions)
    }

    /// Gets every session whose outcome is not `incomplete`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn completed_sessions(&self) -> Result<Vec<GameSession>, DbError> {
        use schema::game_sessions::dsl;

        let mut conn = self.connection()?;
        let sessions = dsl::game_sessions
            .filter(dsl::outcome.ne(SessionOutcome::Incomplete.to_string()))
            .load::<GameSession>(&mut conn)?;

        debug!(count = sessions.len(), "Completed sessions loaded");
        Ok(sessions)
    }

    /// Gets the most recent actions across all sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn recent_actions(&self, limit: i64) -> Result<Vec<GameAction>, DbError> {
        use schema::game_actions::dsl;

        let mut conn = self.connection()?;
        let actions = dsl::game_actions
            .order((dsl::timestamp.desc(), dsl::id.desc()))
            .limit(limit)
            .load::<GameAction>(&mut conn)?;

        debug!(count = actions.len(), "Recent actions loaded");
        Ok(actions)
    }

    /// Gets one session's actions in the order they were recorded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SessionNotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub fn actions_for_session(&self, session_id: &str) -> Result<Vec<GameAction>, StoreError> {
        use schema::game_actions::dsl;

        let mut conn = self.connection()?;
        if find_session(&mut conn, session_id)?.is_none() {
            debug!(session_id = %session_id, "Action log requested for unknown session");
            return Err(StoreError::SessionNotFound(session_id.to_string()));
        }

        let actions = dsl::game_actions
            .filter(dsl::session_id.eq(session_id))
            .order((dsl::timestamp.asc(), dsl::id.asc()))
            .load::<GameAction>(&mut conn)?;

        info!(session_id = %session_id, count = actions.len(), "Session action log loaded");
        Ok(actions)
    }

    /// Whether the store holds no sessions and no actions.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn is_empty(&self) -> Result<bool, DbError> {
        let mut conn = self.connection()?;
        let sessions: i64 = schema::game_sessions::table.count().get_result(&mut conn)?;
        let actions: i64 = schema::game_actions::table.count().get_result(&mut conn)?;
        Ok(sessions == 0 && actions == 0)
    }
}

fn find_session(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> Result<Option<GameSession>, diesel::result::Error> {
    schema::game_sessions::table
        .filter(schema::game_sessions::session_id.eq(session_id))
        .first::<GameSession>(conn)
        .optional()
}

/// Adds one to a session counter in a single UPDATE. Returns rows touched.
fn increment(
    conn: &mut SqliteConnection,
    session_id: &str,
    counter: SessionCounter,
) -> Result<usize, diesel::result::Error> {
    use schema::game_sessions::dsl;

    let target = dsl::game_sessions.filter(dsl::session_id.eq(session_id));
    match counter {
        SessionCounter::TotalMoves => diesel::update(target)
            .set(dsl::total_moves.eq(dsl::total_moves + 1))
            .execute(conn),
        SessionCounter::HintsUsed => diesel::update(target)
            .set(dsl::hints_used.eq(dsl::hints_used + 1))
            .execute(conn),
        SessionCounter::UndosUsed => diesel::update(target)
            .set(dsl::undos_used.eq(dsl::undos_used + 1))
            .execute(conn),
    }
}
