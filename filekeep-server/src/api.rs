use crate::poller::{PollState, SharedPollState};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use filekeep_core::{
    normalize_keyword, ChangeRecord, ConfigSource, Error, Repository, SharedRepository,
    StoreReport, Version,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub repository: SharedRepository,
    pub config: Arc<dyn ConfigSource>,
    pub poll_state: SharedPollState,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(get_status))
        .route("/store", post(store))
        .route("/versions", get(get_versions))
        .route("/versions/open", post(open_version))
        .route("/versions/restore", post(restore_version))
        .route(
            "/ignore",
            get(get_ignored).post(add_ignored).delete(remove_ignored),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn engine_error(e: Error) -> (StatusCode, String) {
    let status = match &e {
        Error::Version(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::InvalidDirectory(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

/// Run `f` against the locked repository on the blocking pool.
async fn with_repository<T, F>(state: &AppState, f: F) -> Result<T, (StatusCode, String)>
where
    F: FnOnce(&Repository) -> filekeep_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let repository = Arc::clone(&state.repository);
    tokio::task::spawn_blocking(move || {
        let repository = repository.lock().unwrap();
        f(&*repository)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    .map_err(engine_error)
}

/// Relative paths are taken from the repository root.
fn absolute(repository: &Repository, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        repository.workdir().join(path)
    }
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub root: PathBuf,
    pub state: PollState,
    pub changes: Vec<ChangeRecord>,
}

async fn get_status(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    let poll_state = *state.poll_state.lock().unwrap();
    let (root, changes) =
        with_repository(&state, |repo| Ok((repo.workdir().to_path_buf(), repo.scan()?))).await?;

    Ok(Json(StatusResponse {
        root,
        state: poll_state,
        changes,
    }))
}

async fn store(State(state): State<AppState>) -> ApiResult<StoreReport> {
    with_repository(&state, |repo| repo.store_changes())
        .await
        .map(Json)
}

#[derive(Deserialize)]
struct PathQuery {
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionEntry {
    pub number: usize,
    #[serde(flatten)]
    pub version: Version,
}

async fn get_versions(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> ApiResult<Vec<VersionEntry>> {
    let versions = with_repository(&state, move |repo| repo.versions(&query.path)).await?;

    Ok(Json(
        versions
            .into_iter()
            .enumerate()
            .map(|(i, version)| VersionEntry {
                number: i + 1,
                version,
            })
            .collect(),
    ))
}

#[derive(Deserialize)]
struct VersionRequest {
    path: PathBuf,
    version: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenResponse {
    pub path: PathBuf,
}

async fn open_version(
    State(state): State<AppState>,
    Json(req): Json<VersionRequest>,
) -> ApiResult<OpenResponse> {
    let config = Arc::clone(&state.config);
    let path = with_repository(&state, move |repo| {
        let temp_path = config.load()?.temp_path;
        repo.open_version(absolute(repo, req.path), req.version, temp_path)
    })
    .await?;

    Ok(Json(OpenResponse { path }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RestoreResponse {
    /// The new version, absent when the content was already current.
    pub restored: Option<Version>,
}

async fn restore_version(
    State(state): State<AppState>,
    Json(req): Json<VersionRequest>,
) -> ApiResult<RestoreResponse> {
    let restored = with_repository(&state, move |repo| {
        repo.restore_version(absolute(repo, req.path), req.version)
    })
    .await?;

    Ok(Json(RestoreResponse { restored }))
}

async fn get_ignored(State(state): State<AppState>) -> ApiResult<BTreeSet<String>> {
    with_repository(&state, |repo| repo.ignored())
        .await
        .map(Json)
}

#[derive(Deserialize)]
struct PatternRequest {
    pattern: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IgnoreResponse {
    pub pattern: String,
    pub changed: bool,
}

async fn add_ignored(
    State(state): State<AppState>,
    Json(req): Json<PatternRequest>,
) -> ApiResult<IgnoreResponse> {
    let pattern = normalize_keyword(&req.pattern).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            format!("{:?} is not a usable ignore keyword", req.pattern),
        )
    })?;

    let changed = with_repository(&state, {
        let pattern = pattern.clone();
        move |repo| repo.add_ignored(&pattern)
    })
    .await?;

    Ok(Json(IgnoreResponse { pattern, changed }))
}

async fn remove_ignored(
    State(state): State<AppState>,
    Json(req): Json<PatternRequest>,
) -> ApiResult<IgnoreResponse> {
    let pattern = req.pattern.trim().to_string();
    let changed = with_repository(&state, {
        let pattern = pattern.clone();
        move |repo| repo.remove_ignored(&pattern)
    })
    .await?;

    Ok(Json(IgnoreResponse { pattern, changed }))
}
