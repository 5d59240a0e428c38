// trajectory-service-rs/src/api.rs
// REST query surface over the loaded corpus
// Thin transport layer: parameter validation, error mapping, route wiring

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::model::{TaskType, Trajectory, TrajectoryStatus};
use crate::query::{TrajectoryFilter, TrajectoryStore};

pub static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 200;

/// Shared application state: the corpus store, read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TrajectoryStore>,
}

/// Trajectory list row: the summary fields only.
#[derive(Debug, Serialize)]
pub struct TrajectoryInfo {
    pub id: String,
    pub task: String,
    pub status: TrajectoryStatus,
    pub steps: usize,
    pub task_type: TaskType,
}

impl From<&Trajectory> for TrajectoryInfo {
    fn from(t: &Trajectory) -> Self {
        Self {
            id: t.id.clone(),
            task: t.task.clone(),
            status: t.status,
            steps: t.steps,
            task_type: t.task_type,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub trajectories_loaded: usize,
    pub uptime_seconds: i64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

fn bad_request(message: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { error: message, code: 400 }),
    )
}

/// Query parameters for the trajectory list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: usize,
    pub limit: Option<usize>,
    pub status: Option<String>,
    pub task_type: Option<String>,
    pub min_steps: Option<usize>,
    pub max_steps: Option<usize>,
}

impl ListParams {
    /// Validate and convert into an engine filter. Unknown status or task-type
    /// values are caller errors, reported as 400.
    fn to_filter(&self) -> Result<TrajectoryFilter, (StatusCode, Json<ErrorResponse>)> {
        let status = match &self.status {
            Some(raw) => Some(raw.parse::<TrajectoryStatus>().map_err(bad_request)?),
            None => None,
        };
        let task_type = match &self.task_type {
            Some(raw) => Some(raw.parse::<TaskType>().map_err(bad_request)?),
            None => None,
        };
        Ok(TrajectoryFilter {
            status,
            task_type,
            min_steps: self.min_steps,
            max_steps: self.max_steps,
        })
    }

    fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// GET / - Root endpoint
async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "Trajectory Viewer API",
        "version": "1.0.0",
        "endpoints": [
            "GET /health",
            "GET /api/trajectories",
            "GET /api/trajectories/{id}",
            "GET /api/statistics",
            "GET /api/data-sources"
        ]
    }))
}

/// GET /health - Health check endpoint
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        trajectories_loaded: state.store.len(),
        uptime_seconds: START_TIME.elapsed().as_secs() as i64,
    })
}

/// GET /api/trajectories - Paginated, filterable trajectory list
async fn list_trajectories_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<TrajectoryInfo>>, (StatusCode, Json<ErrorResponse>)> {
    let filter = params.to_filter()?;
    let rows = state
        .store
        .list(&filter, params.skip, params.effective_limit())
        .into_iter()
        .map(TrajectoryInfo::from)
        .collect();
    Ok(Json(rows))
}

/// GET /api/trajectories/{id} - Full trajectory detail
async fn trajectory_detail_handler(
    State(state): State<AppState>,
    Path(trajectory_id): Path<String>,
) -> Result<Json<Trajectory>, (StatusCode, Json<ErrorResponse>)> {
    match state.store.get(&trajectory_id) {
        Some(trajectory) => Ok(Json(trajectory.clone())),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Trajectory not found: {}", trajectory_id),
                code: 404,
            }),
        )),
    }
}

/// GET /api/statistics - Corpus-wide statistics
async fn statistics_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.statistics())
}

/// GET /api/data-sources - Per-source summaries
async fn data_sources_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.data_sources())
}

/// Build the service router with all routes and middleware.
pub fn create_router(store: Arc<TrajectoryStore>) -> Router {
    let state = AppState { store };
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/trajectories", get(list_trajectories_handler))
        .route("/api/trajectories/:id", get(trajectory_detail_handler))
        .route("/api/statistics", get(statistics_handler))
        .route("/api/data-sources", get(data_sources_handler))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}
