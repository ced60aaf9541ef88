//! Database persistence layer for accounts, sessions and the action log.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::{DbError, DbErrorKind, StoreError};
pub use models::{
    ActionRecord, GameAction, GameSession, NewGameAction, NewGameSession, NewUser,
    SessionCounter, SessionRecord, User,
};
pub use repository::{EventStore, MIGRATIONS};
