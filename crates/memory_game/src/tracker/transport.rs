//! The network seam under the session tracker.

use async_trait::async_trait;
use memory_tiles::{ActionDetails, SessionOutcome};
use tracing::instrument;

use crate::client::{ApiClient, TransportError};

/// Carries session lifecycle calls and actions to the event store.
#[async_trait]
pub trait TrackerTransport: Send + Sync + 'static {
    /// Opens a session and returns its id.
    async fn start_session(&self, user_email: &str) -> Result<String, TransportError>;

    /// Records one action against a session.
    async fn log_action(
        &self,
        session_id: &str,
        user_email: &str,
        details: &ActionDetails,
    ) -> Result<(), TransportError>;

    /// Closes a session with its outcome.
    async fn end_session(
        &self,
        session_id: &str,
        outcome: SessionOutcome,
    ) -> Result<(), TransportError>;
}

/// [`TrackerTransport`] over the REST API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ApiClient,
}

impl HttpTransport {
    /// Wraps an API client.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TrackerTransport for HttpTransport {
    #[instrument(skip(self))]
    async fn start_session(&self, user_email: &str) -> Result<String, TransportError> {
        self.client.start_session(user_email).await
    }

    #[instrument(skip(self, details))]
    async fn log_action(
        &self,
        session_id: &str,
        user_email: &str,
        details: &ActionDetails,
    ) -> Result<(), TransportError> {
        self.client
            .record_action(session_id, user_email, details)
            .await
    }

    #[instrument(skip(self))]
    async fn end_session(
        &self,
        session_id: &str,
        outcome: SessionOutcome,
    ) -> Result<(), TransportError> {
        self.client.end_session(session_id, outcome).await
    }
}
