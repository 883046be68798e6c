//! HTTP API server for the Linkproof node.
//!
//! Provides REST endpoints for health, node status, the supported platform
//! table and profile verification.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use linkproof_identity::LedgerHandle;
use linkproof_profile::{ErrorKind, Profile, ProfileError, ProfileVerifier};

/// State shared by every handler.
pub struct AppState {
    verifier: ProfileVerifier,
    ledger: Arc<LedgerHandle>,
    attester_keys: usize,
    started: Instant,
}

impl AppState {
    pub fn new(verifier: ProfileVerifier, ledger: Arc<LedgerHandle>, attester_keys: usize) -> Self {
        Self {
            verifier,
            ledger,
            attester_keys,
            started: Instant::now(),
        }
    }
}

// --- Request / response types ---

#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "web3Name", default)]
    pub web3_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub platform: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub version: String,
    pub ledger_connected: bool,
    pub platforms: usize,
    pub attester_keys: usize,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformInfo {
    pub name: String,
    pub title: String,
    pub schema_id: String,
    pub contents_key: String,
    pub link_template: String,
}

#[derive(Serialize)]
pub struct PlatformsResponse {
    pub platforms: Vec<PlatformInfo>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

/// A failed verification rendered as a JSON error body.
#[derive(Debug)]
pub struct ApiError(ProfileError);

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        Self(err)
    }
}

/// HTTP status reported for each failure kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound | ErrorKind::NoMatch => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Deactivated => StatusCode::GONE,
        ErrorKind::UnsupportedSchema | ErrorKind::MalformedData => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ErrorKind::Revoked
        | ErrorKind::InvalidSignature
        | ErrorKind::UntrustedIssuer
        | ErrorKind::SubjectMismatch => StatusCode::FORBIDDEN,
        ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
        ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let body = ErrorResponse {
            error: self.0.to_string(),
            kind: kind.code().to_string(),
        };
        (status_for(kind), Json(body)).into_response()
    }
}

// --- Handlers ---

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

async fn handle_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        ledger_connected: state.ledger.is_connected(),
        platforms: state.verifier.registry().len(),
        attester_keys: state.attester_keys,
        uptime_secs: state.started.elapsed().as_secs(),
    })
}

async fn handle_platforms(State(state): State<Arc<AppState>>) -> Json<PlatformsResponse> {
    let platforms: Vec<PlatformInfo> = state
        .verifier
        .registry()
        .all()
        .map(|d| PlatformInfo {
            name: d.name.clone(),
            title: d.title.clone(),
            schema_id: d.schema_id.to_string(),
            contents_key: d.contents_key.clone(),
            link_template: d.link_template.clone(),
        })
        .collect();
    let count = platforms.len();
    Json(PlatformsResponse { platforms, count })
}

async fn handle_verify_profile(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .verifier
        .verify_profile(&query.web3_name, &query.username, &query.platform)
        .await?;
    Ok(Json(profile))
}

// --- Server ---

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(handle_health))
        .route("/api/v1/status", get(handle_status))
        .route("/api/v1/platforms", get(handle_platforms))
        .route("/api/v1/profiles/verify", get(handle_verify_profile))
        .with_state(state)
}

pub async fn start_api_server(listen_addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app).await?;
    Ok(())
}
