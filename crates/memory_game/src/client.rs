//! REST client for the analytics server.

use chrono::{DateTime, Utc};
use derive_more::{Display, Error, From};
use memory_tiles::{ActionDetails, ActionKind, SessionOutcome};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Environment variable naming the server base URL.
pub const ENV_SERVER_URL: &str = "MEMORY_SERVER_URL";

/// Base URL used when neither flag nor environment names one.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5001";

/// Picks the server URL: explicit flag, then `lookup(ENV_SERVER_URL)`, then the default.
pub fn resolve_server_url(
    flag: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> String {
    let url = flag
        .or_else(|| lookup(ENV_SERVER_URL))
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
    url.trim_end_matches('/').to_string()
}

/// Client-side network failure.
#[derive(Debug, Display, Error, From)]
pub enum TransportError {
    /// The request could not be sent or its body not read.
    #[display("Request failed: {_0}")]
    Request(reqwest::Error),
    /// The server answered with an error status.
    #[display("Server returned {status}: {message}")]
    #[from(skip)]
    Status {
        /// HTTP status code.
        status: u16,
        /// The server's `message`, or the raw body.
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartBody<'a> {
    user_email: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartReply {
    session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionBody<'a> {
    session_id: &'a str,
    user_email: &'a str,
    #[serde(flatten)]
    details: &'a ActionDetails,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EndBody<'a> {
    session_id: &'a str,
    outcome: SessionOutcome,
}

/// Summary block of the analytics report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    /// Sessions with a final outcome.
    pub total_games: u64,
    /// Sessions won.
    pub wins: u64,
    /// Percentage of games won.
    pub win_rate: f64,
    /// Mean duration in seconds.
    pub average_duration: f64,
    /// Mean move count.
    pub average_moves: f64,
    /// Hints across all finished games.
    pub total_hints: i64,
}

/// One session row of the analytics report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    /// Session id.
    pub session_id: String,
    /// Player.
    pub user_email: String,
    /// When the session opened.
    pub start_time: DateTime<Utc>,
    /// When it closed, if it has.
    pub end_time: Option<DateTime<Utc>>,
    /// Seconds between start and end.
    pub duration_seconds: Option<f64>,
    /// Outcome so far.
    pub outcome: SessionOutcome,
    /// Pair selections.
    pub total_moves: i64,
    /// Hint requests.
    pub hints_used: i64,
    /// Undo requests.
    pub undos_used: i64,
}

/// One action row of the analytics report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionView {
    /// Owning session.
    pub session_id: String,
    /// Acting player.
    pub user_email: String,
    /// Action kind.
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Kind-specific fields.
    pub details: serde_json::Map<String, serde_json::Value>,
    /// When the server recorded it.
    pub timestamp: DateTime<Utc>,
}

/// `GET /api/analytics` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsView {
    /// Aggregate statistics.
    pub summary: SummaryView,
    /// Newest sessions first.
    pub recent_sessions: Vec<SessionView>,
    /// Newest actions first.
    pub action_log: Vec<ActionView>,
}

/// Typed client for every server endpoint.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the server at `base_url`.
    #[instrument]
    pub fn new(base_url: String) -> Self {
        debug!("Creating API client");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turns an error status into [`TransportError::Status`].
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await?;
        let message = serde_json::from_str::<MessageBody>(&body)
            .map(|b| b.message)
            .unwrap_or(body);
        warn!(status = status.as_u16(), message = %message, "Server rejected request");
        Err(TransportError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn post_message<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, TransportError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        let reply: MessageBody = Self::check(response).await?.json().await?;
        Ok(reply.message)
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Status`] with 409 if the email is taken.
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<String, TransportError> {
        info!("Registering account");
        self.post_message("/api/auth/register", &Credentials { email, password })
            .await
    }

    /// Checks credentials.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Status`] with 400 on bad credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, TransportError> {
        info!("Logging in");
        self.post_message("/api/auth/login", &Credentials { email, password })
            .await
    }

    /// Opens a session and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on network failure or an error status.
    #[instrument(skip(self))]
    pub async fn start_session(&self, user_email: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .post(self.url("/api/game/start"))
            .json(&StartBody { user_email })
            .send()
            .await?;
        let reply: StartReply = Self::check(response).await?.json().await?;
        debug!(session_id = %reply.session_id, "Session opened");
        Ok(reply.session_id)
    }

    /// Records one action.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on network failure or an error status.
    #[instrument(skip(self, details), fields(kind = %details.kind()))]
    pub async fn record_action(
        &self,
        session_id: &str,
        user_email: &str,
        details: &ActionDetails,
    ) -> Result<(), TransportError> {
        let body = ActionBody {
            session_id,
            user_email,
            details,
        };
        self.post_message("/api/game/action", &body).await?;
        Ok(())
    }

    /// Closes a session.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Status`] with 404 for an unknown session.
    #[instrument(skip(self))]
    pub async fn end_session(
        &self,
        session_id: &str,
        outcome: SessionOutcome,
    ) -> Result<(), TransportError> {
        self.post_message("/api/game/end", &EndBody { session_id, outcome })
            .await?;
        Ok(())
    }

    /// Fetches the analytics report.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on network failure or an error status.
    #[instrument(skip(self))]
    pub async fn analytics(&self) -> Result<AnalyticsView, TransportError> {
        let response = self.client.get(self.url("/api/analytics")).send().await?;
        let view: AnalyticsView = Self::check(response).await?.json().await?;
        debug!(
            total_games = view.summary.total_games,
            sessions = view.recent_sessions.len(),
            "Analytics fetched"
        );
        Ok(view)
    }

    /// Fetches one session's actions in recorded order.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Status`] with 404 for an unknown session.
    #[instrument(skip(self))]
    pub async fn session_log(&self, session_id: &str) -> Result<Vec<ActionView>, TransportError> {
        let response = self
            .client
            .get(self.url(&format!("/api/game/log/{}", session_id)))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins_over_environment() {
        let url = resolve_server_url(Some("http://flag:1/".to_string()), |_| {
            Some("http://env:2".to_string())
        });
        assert_eq!(url, "http://flag:1");
    }

    #[test]
    fn test_environment_then_default() {
        let url = resolve_server_url(None, |k| {
            (k == ENV_SERVER_URL).then(|| "http://env:2".to_string())
        });
        assert_eq!(url, "http://env:2");
        assert_eq!(resolve_server_url(None, |_| None), DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_action_body_flattens_details() {
        let details = ActionDetails::Hint;
        let body = ActionBody {
            session_id: "s1",
            user_email: "a@x.com",
            details: &details,
        };
        let value = serde_json::to_value(&body).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"sessionId": "s1", "userEmail": "a@x.com", "type": "hint"})
        );
    }
}
