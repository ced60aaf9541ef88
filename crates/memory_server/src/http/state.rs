//! Shared handler state.

use std::sync::Arc;

use tracing::instrument;

use crate::accounts::{AccountGate, CredentialHasher};
use crate::analytics::Aggregator;
use crate::db::EventStore;

/// State cloned into every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Sessions and actions.
    pub store: EventStore,
    /// Register and login.
    pub accounts: AccountGate,
    /// Dashboard statistics.
    pub aggregator: Aggregator,
}

impl AppState {
    /// Wires the services around one store.
    #[instrument(skip(store, hasher))]
    pub fn new(store: EventStore, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            accounts: AccountGate::new(store.clone(), hasher),
            aggregator: Aggregator::new(store.clone()),
            store,
        }
    }
}
