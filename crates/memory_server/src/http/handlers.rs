//! REST handlers for accounts, sessions, actions and analytics.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use memory_tiles::{ActionDetails, SessionOutcome};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::analytics::AnalyticsReport;
use crate::db::ActionRecord;
use crate::http::{ApiError, AppState};
use crate::seed::seed_sample_data;

/// Body of register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsRequest {
    /// Account email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Body of `POST /api/game/start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    /// Player starting the game.
    pub user_email: String,
}

/// Reply to `POST /api/game/start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResponse {
    /// Handle for subsequent actions.
    pub session_id: String,
}

/// Body of `POST /api/game/action`: ids plus the flattened, tagged payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordActionRequest {
    /// Owning session.
    pub session_id: String,
    /// Acting player.
    pub user_email: String,
    /// `type` and its fields.
    #[serde(flatten)]
    pub details: ActionDetails,
}

/// Body of `POST /api/game/end`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionRequest {
    /// Session to close.
    pub session_id: String,
    /// Final outcome.
    pub outcome: SessionOutcome,
}

/// `{message}` reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable status.
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Runs blocking store work off the async executor.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{} is required.", field)));
    }
    Ok(())
}

/// `POST /api/auth/register`
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(req) = payload?;
    debug!(email = %req.email, "Register request");
    blocking(move || Ok(state.accounts.register(&req.email, &req.password)?)).await?;
    Ok((
        StatusCode::CREATED,
        MessageResponse::new("User registered successfully."),
    ))
}

/// `POST /api/auth/login`
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    debug!(email = %req.email, "Login request");
    blocking(move || Ok(state.accounts.login(&req.email, &req.password)?)).await?;
    Ok(MessageResponse::new("Login successful."))
}

/// `POST /api/game/start`
#[instrument(skip_all)]
pub async fn start_session(
    State(state): State<AppState>,
    payload: Result<Json<StartSessionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StartSessionResponse>), ApiError> {
    let Json(req) = payload?;
    require("userEmail", &req.user_email)?;

    let session = blocking(move || Ok(state.store.create_session(req.user_email.trim())?)).await?;
    info!(session_id = %session.session_id(), "Session start acknowledged");
    Ok((
        StatusCode::CREATED,
        Json(StartSessionResponse {
            session_id: session.session_id().clone(),
        }),
    ))
}

/// `POST /api/game/action`
#[instrument(skip_all)]
pub async fn record_action(
    State(state): State<AppState>,
    payload: Result<Json<RecordActionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(req) = payload?;
    require("sessionId", &req.session_id)?;
    debug!(session_id = %req.session_id, kind = %req.details.kind(), "Action request");

    blocking(move || {
        Ok(state
            .store
            .record_action(&req.session_id, &req.user_email, &req.details)?)
    })
    .await?;
    Ok((StatusCode::CREATED, MessageResponse::new("Action recorded.")))
}

/// `POST /api/game/end`
#[instrument(skip_all)]
pub async fn end_session(
    State(state): State<AppState>,
    payload: Result<Json<EndSessionRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    require("sessionId", &req.session_id)?;

    let outcome = req.outcome;
    blocking(move || Ok(state.store.close_session(&req.session_id, outcome)?)).await?;
    Ok(MessageResponse::new(format!("Session ended: {}.", outcome)))
}

/// `GET /api/analytics`
#[instrument(skip_all)]
pub async fn analytics(State(state): State<AppState>) -> Result<Json<AnalyticsReport>, ApiError> {
    let report = blocking(move || Ok(state.aggregator.report()?)).await?;
    Ok(Json(report))
}

/// `GET /api/game/log/{session_id}`
#[instrument(skip(state))]
pub async fn session_log(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<ActionRecord>>, ApiError> {
    let rows = blocking(move || Ok(state.store.actions_for_session(&session_id)?)).await?;
    let records = rows
        .into_iter()
        .map(ActionRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(records))
}

/// `GET /api/seed-data`
#[instrument(skip_all)]
pub async fn seed_data(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    match blocking(move || Ok(seed_sample_data(&state.store)?)).await? {
        Some(count) => Ok((
            StatusCode::CREATED,
            MessageResponse::new(format!("{} sample events added to the database.", count)),
        )),
        None => Err(ApiError::Validation(
            "Database already contains data. Seeding aborted.".to_string(),
        )),
    }
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
