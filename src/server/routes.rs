use std::path::Path;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::services::{ServeDir, ServeFile};

use crate::server::api::{self, ApiError, AppState};

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownUnit { .. } => StatusCode::NOT_FOUND,
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::SafetyLimit(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }
        let body = Json(json!({
            "status": "error",
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Invalid(format!("Invalid request body: {}", rejection.body_text()))
    }
}

/// Simulations are CPU-bound; keep them off the async workers.
async fn run_blocking<Req, Resp>(
    state: AppState,
    request: Req,
    work: fn(&AppState, &Req) -> Result<Resp, ApiError>,
) -> Result<Json<Resp>, ApiError>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    tokio::task::spawn_blocking(move || work(&state, &request))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .map(Json)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "skirmish-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn units(State(state): State<AppState>) -> Json<Vec<api::UnitListItem>> {
    Json(api::units_payload(&state))
}

async fn simulate(
    State(state): State<AppState>,
    payload: Result<Json<api::SimulateRequest>, JsonRejection>,
) -> Result<Json<api::SimulateResponse>, ApiError> {
    let Json(request) = payload?;
    run_blocking(state, request, api::simulate_payload).await
}

async fn duel(
    State(state): State<AppState>,
    payload: Result<Json<api::DuelRequest>, JsonRejection>,
) -> Result<Json<api::DuelResponse>, ApiError> {
    let Json(request) = payload?;
    api::duel_payload(&state, &request).map(Json)
}

async fn matchups(
    State(state): State<AppState>,
    payload: Result<Json<api::MatchupsRequest>, JsonRejection>,
) -> Result<Json<api::MatchupsResponse>, ApiError> {
    let Json(request) = payload?;
    run_blocking(state, request, api::matchups_payload).await
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/units", get(units))
        .route("/api/simulate", post(simulate))
        .route("/api/duel", post(duel))
        .route("/api/matchups", post(matchups))
        .with_state(state)
}

/// API routes plus the built frontend; unknown paths fall back to its index.html.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    let frontend =
        ServeDir::new(static_dir).not_found_service(ServeFile::new(static_dir.join("index.html")));
    api_router(state).fallback_service(frontend)
}
