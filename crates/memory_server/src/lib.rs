//! Memory Game analytics backend.
//!
//! Accounts, game sessions and an append-only action log persisted in
//! SQLite through diesel, served over a small axum JSON API. Statistics
//! are computed on read by [`Aggregator`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod accounts;
pub mod analytics;
pub mod config;
pub mod db;
pub mod http;
pub mod seed;

pub use accounts::{AccountError, AccountGate, Argon2Hasher, CredentialHasher};
pub use analytics::{
    ACTION_LOG_LIMIT, Aggregator, AnalyticsReport, AnalyticsSummary, RECENT_SESSION_LIMIT,
};
pub use config::{ConfigError, ServerConfig};
pub use db::{ActionRecord, DbError, DbErrorKind, EventStore, GameAction, GameSession, SessionRecord, StoreError};
pub use http::{ApiError, AppState, router, serve};
pub use seed::{SAMPLE_EMAIL, seed_sample_data};
