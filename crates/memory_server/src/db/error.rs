//! Event store error types.

use derive_more::{Display, Error};
use diesel::result::DatabaseErrorKind;
use tracing::instrument;

/// What part of the store failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DbErrorKind {
    /// The store was given an unusable database path.
    #[display("path")]
    Path,
    /// The SQLite file could not be opened or configured.
    #[display("connection")]
    Connection,
    /// An embedded migration failed.
    #[display("migration")]
    Migration,
    /// A query failed.
    #[display("query")]
    Query,
    /// An insert hit a `UNIQUE` constraint, such as a taken email.
    #[display("unique violation")]
    UniqueViolation,
    /// A stored row holds an outcome, type or payload the game does not know.
    #[display("unreadable row")]
    UnreadableRow,
}

/// Event store failure, tagged with its kind and the line that raised it.
#[derive(Debug, Clone, Display, Error)]
#[display("Store {} error: {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failure category.
    pub kind: DbErrorKind,
    /// Human-readable detail.
    pub message: String,
    /// Line that raised the error.
    pub line: u32,
    /// Source file that raised the error.
    pub file: &'static str,
}

impl DbError {
    /// Creates an error of `kind`, recording the caller's location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for a row that cannot be read back into game types.
    #[track_caller]
    pub fn unreadable(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::UnreadableRow, message)
    }

    /// Whether an insert collided with an existing unique value.
    pub fn is_unique_violation(&self) -> bool {
        self.kind == DbErrorKind::UniqueViolation
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        let kind = match &err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                DbErrorKind::UniqueViolation
            }
            _ => DbErrorKind::Query,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::unreadable(format!("Stored details are not valid JSON: {}", err))
    }
}

/// Failure of a store operation addressed to a specific session.
#[derive(Debug, Clone, Display, Error)]
pub enum StoreError {
    /// No session with this id exists.
    #[display("Session '{_0}' not found")]
    SessionNotFound(#[error(not(source))] String),
    /// The underlying store failed.
    #[display("{_0}")]
    Db(DbError),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        Self::Db(err)
    }
}

impl From<diesel::result::Error> for StoreError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::Db(DbError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_records_kind_and_location() {
        let err = DbError::new(DbErrorKind::Path, "empty");
        assert_eq!(err.kind, DbErrorKind::Path);
        assert!(err.file.ends_with("error.rs"));
        assert!(err.to_string().starts_with("Store path error: empty at "));
    }

    #[test]
    fn test_not_found_maps_to_query_kind() {
        let err = DbError::from(diesel::result::Error::NotFound);
        assert_eq!(err.kind, DbErrorKind::Query);
        assert!(!err.is_unique_violation());
    }
}
