//! Play statistics computed on read from raw sessions and actions.

use derive_getters::Getters;
use memory_tiles::SessionOutcome;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::db::{ActionRecord, DbError, EventStore, GameSession, SessionRecord};

/// Sessions included in `recentSessions`.
pub const RECENT_SESSION_LIMIT: i64 = 50;

/// Actions included in `actionLog`.
pub const ACTION_LOG_LIMIT: i64 = 100;

/// Summary over sessions that reached a final outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    total_games: usize,
    wins: usize,
    win_rate: f64,
    average_duration: f64,
    average_moves: f64,
    total_hints: i64,
}

impl AnalyticsSummary {
    /// Summarises the given sessions, ignoring any still `incomplete`.
    #[instrument(skip(sessions), fields(count = sessions.len()))]
    pub fn from_sessions(sessions: &[GameSession]) -> Self {
        let mut total_games = 0usize;
        let mut wins = 0usize;
        let mut duration_sum = 0.0;
        let mut moves_sum = 0i64;
        let mut total_hints = 0i64;

        for session in sessions {
            match session.parse_outcome() {
                Ok(SessionOutcome::Incomplete) => continue,
                Ok(SessionOutcome::Win) => wins += 1,
                Ok(SessionOutcome::Loss) => {}
                Err(e) => {
                    warn!(error = %e, session_id = %session.session_id(), "Skipping session");
                    continue;
                }
            }
            total_games += 1;
            duration_sum += session.duration_seconds().unwrap_or(0.0);
            moves_sum += i64::from(*session.total_moves());
            total_hints += i64::from(*session.hints_used());
        }

        let mean = |sum: f64| {
            if total_games == 0 {
                0.0
            } else {
                sum / total_games as f64
            }
        };

        Self {
            total_games,
            wins,
            win_rate: mean(wins as f64 * 100.0),
            average_duration: mean(duration_sum),
            average_moves: mean(moves_sum as f64),
            total_hints,
        }
    }
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    summary: AnalyticsSummary,
    recent_sessions: Vec<SessionRecord>,
    action_log: Vec<ActionRecord>,
}

/// Builds [`AnalyticsReport`]s from the event store.
#[derive(Debug, Clone)]
pub struct Aggregator {
    store: EventStore,
}

impl Aggregator {
    /// Creates an aggregator reading from the given store.
    #[instrument(skip(store))]
    pub fn new(store: EventStore) -> Self {
        Self { store }
    }

    /// Computes the summary, recent sessions and action log.
    ///
    /// Rows that fail to parse are logged and left out.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn report(&self) -> Result<AnalyticsReport, DbError> {
        debug!("Computing analytics report");

        let summary = AnalyticsSummary::from_sessions(&self.store.completed_sessions()?);

        let recent_sessions = self
            .store
            .recent_sessions(RECENT_SESSION_LIMIT)?
            .into_iter()
            .filter_map(|row| {
                SessionRecord::try_from(row)
                    .inspect_err(|e| warn!(error = %e, "Dropping unreadable session"))
                    .ok()
            })
            .collect::<Vec<_>>();

        let action_log = self
            .store
            .recent_actions(ACTION_LOG_LIMIT)?
            .into_iter()
            .filter_map(|row| {
                ActionRecord::try_from(row)
                    .inspect_err(|e| warn!(error = %e, "Dropping unreadable action"))
                    .ok()
            })
            .collect::<Vec<_>>();

        info!(
            total_games = summary.total_games,
            wins = summary.wins,
            win_rate = %format!("{:.1}%", summary.win_rate),
            recent_sessions = recent_sessions.len(),
            actions = action_log.len(),
            "Analytics report computed"
        );

        Ok(AnalyticsReport {
            summary,
            recent_sessions,
            action_log,
        })
    }
}
