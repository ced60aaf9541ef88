//! Account registration and credential checks.

use std::sync::Arc;

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier};
use derive_more::{Display, Error, From};
use tracing::{debug, info, instrument, warn};

use crate::db::{DbError, EventStore, NewUser, User};

/// Opaque password hashing capability.
pub trait CredentialHasher: Send + Sync + std::fmt::Debug {
    /// Produces a self-describing digest of `password`.
    ///
    /// # Errors
    ///
    /// Returns a message if hashing fails.
    fn hash(&self, password: &str) -> Result<String, String>;

    /// Checks `password` against a digest produced by [`Self::hash`].
    fn verify(&self, password: &str, digest: &str) -> bool;
}

/// Argon2id hasher producing PHC-format digests.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Creates a hasher with explicit cost parameters.
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            self.params.clone(),
        )
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| e.to_string())
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self
                .argon2()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                warn!(error = %e, "Stored digest is not a valid PHC string");
                false
            }
        }
    }
}

/// Error from a register or login attempt.
#[derive(Debug, Clone, Display, Error, From)]
pub enum AccountError {
    /// A required field is missing or blank.
    #[display("{_0}")]
    #[from(skip)]
    Validation(#[error(not(source))] String),
    /// The email is already registered.
    #[display("An account for '{_0}' already exists")]
    #[from(skip)]
    Conflict(#[error(not(source))] String),
    /// Unknown email or wrong password.
    #[display("Invalid email or password")]
    #[from(skip)]
    InvalidCredentials,
    /// The hasher failed.
    #[display("Password hashing failed: {_0}")]
    #[from(skip)]
    Hash(#[error(not(source))] String),
    /// The store failed.
    #[display("{_0}")]
    Store(DbError),
}

/// Service layer for account operations.
///
/// Wraps [`EventStore`] with credential hashing. Login issues no token;
/// the caller remembers the email itself.
#[derive(Debug, Clone)]
pub struct AccountGate {
    store: EventStore,
    hasher: Arc<dyn CredentialHasher>,
}

impl AccountGate {
    /// Creates an account gate backed by the given store and hasher.
    #[instrument(skip(store, hasher))]
    pub fn new(store: EventStore, hasher: Arc<dyn CredentialHasher>) -> Self {
        info!("Creating AccountGate");
        Self { store, hasher }
    }

    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Conflict`] if the email exists, or
    /// [`AccountError::Validation`] for blank input.
    #[instrument(skip(self, password))]
    pub fn register(&self, email: &str, password: &str) -> Result<User, AccountError> {
        let email = validate(email, password)?;

        if self.store.get_user_by_email(email)?.is_some() {
            warn!(email = %email, "Registration rejected: email taken");
            return Err(AccountError::Conflict(email.to_string()));
        }

        let digest = self.hasher.hash(password).map_err(AccountError::Hash)?;
        let user = self
            .store
            .create_user(NewUser::new(email.to_string(), digest))
            .map_err(|e| {
                if e.is_unique_violation() {
                    warn!(email = %email, "Registration lost a race for the email");
                    AccountError::Conflict(email.to_string())
                } else {
                    AccountError::Store(e)
                }
            })?;
        info!(user_id = user.id(), "Account registered");
        Ok(user)
    }

    /// Checks credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidCredentials`] on unknown email or
    /// wrong password.
    #[instrument(skip(self, password))]
    pub fn login(&self, email: &str, password: &str) -> Result<User, AccountError> {
        let email = validate(email, password)?;

        let Some(user) = self.store.get_user_by_email(email)? else {
            debug!(email = %email, "Login rejected: unknown email");
            return Err(AccountError::InvalidCredentials);
        };

        if !self.hasher.verify(password, user.password_digest()) {
            debug!(email = %email, "Login rejected: wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        info!(user_id = user.id(), "Login succeeded");
        Ok(user)
    }
}

fn validate<'a>(email: &'a str, password: &str) -> Result<&'a str, AccountError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AccountError::Validation("Email is required.".to_string()));
    }
    if password.is_empty() {
        return Err(AccountError::Validation("Password is required.".to_string()));
    }
    Ok(email)
}
