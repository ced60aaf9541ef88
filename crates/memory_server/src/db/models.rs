//! Database models and domain types.

use chrono::{DateTime, NaiveDateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use memory_tiles::{ActionDetails, ActionKind, SessionOutcome};
use serde::Serialize;
use tracing::instrument;

use crate::db::{DbError, schema};

/// Account database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::users)]
pub struct User {
    id: i32,
    email: String,
    password_digest: String,
    created_at: NaiveDateTime,
}

/// Insertable account model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    email: String,
    password_digest: String,
}

/// Game session database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::game_sessions)]
pub struct GameSession {
    id: i32,
    session_id: String,
    user_email: String,
    start_time: NaiveDateTime,
    end_time: Option<NaiveDateTime>,
    duration_seconds: Option<f64>,
    outcome: String,
    total_moves: i32,
    hints_used: i32,
    undos_used: i32,
}

impl GameSession {
    /// Parses the stored outcome string.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored value is not a known outcome.
    #[instrument(skip(self), fields(outcome = %self.outcome))]
    pub fn parse_outcome(&self) -> Result<SessionOutcome, DbError> {
        self.outcome
            .parse()
            .map_err(|_| DbError::unreadable(format!("Invalid outcome: '{}'", self.outcome)))
    }

    /// Whether an end time has been recorded.
    pub fn is_closed(&self) -> bool {
        self.end_time.is_some()
    }
}

/// Insertable session model for a freshly started game.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::game_sessions)]
pub struct NewGameSession {
    session_id: String,
    user_email: String,
    start_time: NaiveDateTime,
    outcome: String,
}

/// Action log database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::game_actions)]
pub struct GameAction {
    id: i32,
    session_id: String,
    user_email: String,
    action_type: String,
    details: String,
    timestamp: NaiveDateTime,
}

impl GameAction {
    /// Parses the stored type and payload back into typed details.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored type or JSON is not recognised.
    #[instrument(skip(self), fields(action_id = self.id, action_type = %self.action_type))]
    pub fn parse_details(&self) -> Result<ActionDetails, DbError> {
        let kind: ActionKind = self
            .action_type
            .parse()
            .map_err(|_| {
                DbError::unreadable(format!("Invalid action type: '{}'", self.action_type))
            })?;
        let fields = serde_json::from_str(&self.details)?;
        Ok(ActionDetails::from_fields(kind, fields)?)
    }
}

/// Insertable action model.
#[derive(Debug, Clone, Insertable, Getters)]
#[diesel(table_name = schema::game_actions)]
pub struct NewGameAction {
    session_id: String,
    user_email: String,
    action_type: String,
    details: String,
    timestamp: NaiveDateTime,
}

impl NewGameAction {
    /// Builds an action row stamped with the given time.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the payload cannot be encoded.
    #[instrument(skip(details), fields(kind = %details.kind()))]
    pub fn new(
        session_id: String,
        user_email: String,
        details: &ActionDetails,
        timestamp: NaiveDateTime,
    ) -> Result<Self, DbError> {
        Ok(Self {
            session_id,
            user_email,
            action_type: details.kind().to_string(),
            details: serde_json::to_string(&details.fields())?,
            timestamp,
        })
    }
}

/// A per-session counter bumped by certain action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionCounter {
    /// Completed pair selections.
    TotalMoves,
    /// Hint requests.
    HintsUsed,
    /// Undo requests.
    UndosUsed,
}

impl SessionCounter {
    /// The counter an action increments, if any.
    ///
    /// A move is one pair selection, so only the second click of a pair
    /// counts toward `total_moves`.
    pub fn for_action(details: &ActionDetails) -> Option<Self> {
        match details {
            ActionDetails::TileClick { is_first_tile, .. } => {
                (!is_first_tile).then_some(Self::TotalMoves)
            }
            ActionDetails::Hint => Some(Self::HintsUsed),
            ActionDetails::Undo => Some(Self::UndosUsed),
            ActionDetails::MatchAttempt { .. }
            | ActionDetails::GameStart
            | ActionDetails::GameEnd { .. } => None,
        }
    }
}

/// Session as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    session_id: String,
    user_email: String,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    duration_seconds: Option<f64>,
    outcome: SessionOutcome,
    total_moves: i32,
    hints_used: i32,
    undos_used: i32,
}

impl TryFrom<GameSession> for SessionRecord {
    type Error = DbError;

    fn try_from(row: GameSession) -> Result<Self, Self::Error> {
        let outcome = row.parse_outcome()?;
        Ok(Self {
            session_id: row.session_id,
            user_email: row.user_email,
            start_time: row.start_time.and_utc(),
            end_time: row.end_time.map(|t| t.and_utc()),
            duration_seconds: row.duration_seconds,
            outcome,
            total_moves: row.total_moves,
            hints_used: row.hints_used,
            undos_used: row.undos_used,
        })
    }
}

/// Action as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    session_id: String,
    user_email: String,
    #[serde(rename = "type")]
    kind: ActionKind,
    #[serde(serialize_with = "serialize_fields")]
    details: ActionDetails,
    timestamp: DateTime<Utc>,
}

fn serialize_fields<S: serde::Serializer>(
    details: &ActionDetails,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    details.fields().serialize(serializer)
}

impl TryFrom<GameAction> for ActionRecord {
    type Error = DbError;

    fn try_from(row: GameAction) -> Result<Self, Self::Error> {
        let details = row.parse_details()?;
        Ok(Self {
            session_id: row.session_id,
            user_email: row.user_email,
            kind: details.kind(),
            details,
            timestamp: row.timestamp.and_utc(),
        })
    }
}
