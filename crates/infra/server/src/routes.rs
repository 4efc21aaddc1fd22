//! HTTP routes: trigger ingest and health.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use docrelay_events::{DocumentChange, EventError, Operation, TriggerContext, TriggerRegistry};

use crate::health::{ConfigurationSummary, EnvironmentSummary, HealthReport};

/// Shared state for relay routes.
#[derive(Clone)]
pub(crate) struct RelayState {
    pub(crate) registry: Arc<TriggerRegistry>,
    pub(crate) configuration: Arc<ConfigurationSummary>,
    pub(crate) environment: Arc<EnvironmentSummary>,
}

impl RelayState {
    /// Builds a health report for the current moment.
    pub(crate) fn health_report(&self) -> HealthReport {
        HealthReport::new(&self.configuration, &self.environment, &self.registry)
    }
}

/// Body of a trigger invocation.
#[derive(Debug, Deserialize)]
pub struct TriggerRequest {
    /// Before/after snapshots.
    #[serde(flatten)]
    pub change: DocumentChange,
    /// Route parameters and event id.
    #[serde(flatten)]
    pub context: TriggerContext,
}

/// Acknowledgement returned to the change source.
#[derive(Debug, Serialize, Deserialize)]
pub struct TriggerResponse {
    /// Always "handled"; delivery failures are not reported upstream.
    pub status: String,
    /// Invoked function.
    pub function: String,
    /// Relayed operation, or null for a no-op write.
    pub operation: Option<Operation>,
}

/// Creates the relay router.
pub(crate) fn relay_routes(state: RelayState) -> Router {
    Router::new()
        .route("/triggers/{function}", post(trigger_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn trigger_handler(
    State(state): State<RelayState>,
    Path(function): Path<String>,
    Json(request): Json<TriggerRequest>,
) -> Result<Json<TriggerResponse>, TriggerError> {
    let operation = state
        .registry
        .invoke(&function, &request.change, &request.context)
        .await?;

    Ok(Json(TriggerResponse {
        status: "handled".to_string(),
        function,
        operation,
    }))
}

async fn health_handler(State(state): State<RelayState>) -> Json<HealthReport> {
    tracing::debug!("Health check endpoint called");
    Json(state.health_report())
}

/// Wrapper for EventError that implements IntoResponse.
pub struct TriggerError(pub EventError);

impl TriggerError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            EventError::UnknownFunction(_) => StatusCode::NOT_FOUND,
            EventError::MissingRouteParam { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TriggerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Trigger invocation failed");
        } else {
            tracing::warn!(error = %self.0, "Trigger invocation rejected");
        }

        let body = serde_json::json!({
            "error": self.0.to_string(),
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

impl From<EventError> for TriggerError {
    fn from(err: EventError) -> Self {
        TriggerError(err)
    }
}
