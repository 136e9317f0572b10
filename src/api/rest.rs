use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::inventory_service::InventoryService;
use crate::domain::types::{ExtractionResult, JumpServerConfig, ServerRecord};
use crate::extraction::ExtractionError;
use crate::scan::{ScanError, ScanSnapshot};

/// Shared application state for all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub inventory: Arc<InventoryService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Inventory
        .route("/api/v1/servers", get(list_servers).post(add_server))
        .route("/api/v1/servers/{id}", get(get_server).delete(remove_server))
        .route("/api/v1/servers/{id}/select", post(select_server))
        .route("/api/v1/selection", get(selection).delete(clear_selection))
        .route("/api/v1/export", get(export_csv))
        // Search history
        .route(
            "/api/v1/history",
            get(history).post(record_search).delete(clear_history),
        )
        // Jump host
        .route("/api/v1/jump-host", get(jump_host).put(save_jump_host))
        // Scan session
        .route("/api/v1/scan", get(scan_state))
        .route("/api/v1/scan/open", post(scan_open))
        .route("/api/v1/scan/input", put(scan_input))
        .route("/api/v1/scan/start", post(scan_start))
        .route("/api/v1/scan/manual", post(scan_manual))
        .route("/api/v1/scan/discard", post(scan_discard))
        .route("/api/v1/scan/cancel", post(scan_cancel))
        .route("/api/v1/scan/commit", post(scan_commit))
        .with_state(state)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub version: String,
    pub servers: usize,
    pub jump_host_configured: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerQuery {
    #[serde(default)]
    pub q: String,
    /// Also push a non-blank `q` into the search history.
    #[serde(default)]
    pub record: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEntry {
    pub query: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanInput {
    pub target_ip: Option<String>,
    pub raw_log: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualParse {
    #[serde(rename = "rawLog")]
    pub raw_log: String,
}

type ApiError = (StatusCode, String);

fn scan_error(e: ScanError) -> ApiError {
    let status = match &e {
        ScanError::Busy | ScanError::WrongPhase { .. } | ScanError::Abandoned => {
            StatusCode::CONFLICT
        }
        ScanError::MissingTarget | ScanError::MissingLog | ScanError::NothingToReview => {
            StatusCode::BAD_REQUEST
        }
        ScanError::Extraction(ExtractionError::Unavailable(_))
        | ScanError::Extraction(ExtractionError::ParseFailure(_)) => StatusCode::BAD_GATEWAY,
    };
    (status, e.to_string())
}

fn not_found(id: &str) -> ApiError {
    (StatusCode::NOT_FOUND, format!("server '{}' not found", id))
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        version: env!("CARGO_PKG_VERSION").to_string(),
        servers: state.inventory.server_count().await,
        jump_host_configured: state.inventory.jump_host_configured().await,
    })
}

// ── Inventory ──────────────────────────────────────────────

async fn list_servers(
    State(state): State<AppState>,
    Query(params): Query<ServerQuery>,
) -> Json<Vec<ServerRecord>> {
    if params.record {
        state.inventory.record_search(&params.q).await;
    }
    Json(state.inventory.servers(&params.q).await)
}

async fn add_server(
    State(state): State<AppState>,
    Json(record): Json<ServerRecord>,
) -> (StatusCode, Json<ServerRecord>) {
    state.inventory.add_server(record.clone()).await;
    (StatusCode::CREATED, Json(record))
}

async fn get_server(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ServerRecord>, ApiError> {
    state
        .inventory
        .server(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

/// Deletion is irreversible, so it must be confirmed explicitly.
async fn remove_server(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<ServerRecord>, ApiError> {
    if !params.confirm {
        return Err((
            StatusCode::BAD_REQUEST,
            "deletion must be confirmed with ?confirm=true".to_string(),
        ));
    }
    state
        .inventory
        .remove_server(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

async fn select_server(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ServerRecord>, ApiError> {
    state
        .inventory
        .select_server(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

async fn selection(State(state): State<AppState>) -> Json<Option<ServerRecord>> {
    Json(state.inventory.selected_server().await)
}

async fn clear_selection(State(state): State<AppState>) -> StatusCode {
    state.inventory.clear_selection().await;
    StatusCode::NO_CONTENT
}

async fn export_csv(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let (csv, filename) = state
        .inventory
        .export_csv()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e)))?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    ))
}

// ── Search history ─────────────────────────────────────────

async fn history(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.inventory.search_history().await)
}

async fn record_search(
    State(state): State<AppState>,
    Json(entry): Json<SearchEntry>,
) -> Json<Vec<String>> {
    Json(state.inventory.record_search(&entry.query).await)
}

async fn clear_history(State(state): State<AppState>) -> StatusCode {
    state.inventory.clear_search_history().await;
    StatusCode::NO_CONTENT
}

// ── Jump host ──────────────────────────────────────────────

async fn jump_host(State(state): State<AppState>) -> Json<JumpServerConfig> {
    Json(state.inventory.jump_host().await.redacted())
}

async fn save_jump_host(
    State(state): State<AppState>,
    Json(config): Json<JumpServerConfig>,
) -> Json<JumpServerConfig> {
    let redacted = config.redacted();
    state.inventory.save_jump_host(config).await;
    Json(redacted)
}

// ── Scan session ───────────────────────────────────────────

async fn scan_state(State(state): State<AppState>) -> Json<ScanSnapshot> {
    Json(state.inventory.scan().snapshot().await)
}

async fn scan_open(State(state): State<AppState>) -> Json<ScanSnapshot> {
    Json(state.inventory.scan().open().await)
}

async fn scan_input(
    State(state): State<AppState>,
    Json(input): Json<ScanInput>,
) -> Result<Json<ScanSnapshot>, ApiError> {
    let scan = state.inventory.scan();
    if let Some(ip) = &input.target_ip {
        scan.set_target_ip(ip).await.map_err(scan_error)?;
    }
    if let Some(log) = &input.raw_log {
        scan.set_manual_log(log).await.map_err(scan_error)?;
    }
    Ok(Json(scan.snapshot().await))
}

/// Kick off the automated sequence; progress is read back via `GET /api/v1/scan`.
async fn scan_start(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ScanSnapshot>), ApiError> {
    state
        .inventory
        .spawn_scan()
        .await
        .map(|snap| (StatusCode::ACCEPTED, Json(snap)))
        .map_err(scan_error)
}

async fn scan_manual(
    State(state): State<AppState>,
    Json(body): Json<ManualParse>,
) -> Result<Json<ExtractionResult>, ApiError> {
    let scan = state.inventory.scan();
    scan.set_manual_log(&body.raw_log)
        .await
        .map_err(scan_error)?;
    scan.parse_manual().await.map(Json).map_err(scan_error)
}

async fn scan_discard(State(state): State<AppState>) -> Result<Json<ScanSnapshot>, ApiError> {
    state
        .inventory
        .scan()
        .discard()
        .await
        .map(Json)
        .map_err(scan_error)
}

async fn scan_cancel(State(state): State<AppState>) -> Json<ScanSnapshot> {
    Json(state.inventory.scan().cancel().await)
}

async fn scan_commit(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ServerRecord>), ApiError> {
    state
        .inventory
        .commit_scan()
        .await
        .map(|r| (StatusCode::CREATED, Json(r)))
        .map_err(scan_error)
}
