use anyhow::{Context, Result};
use axum::{extract::{Query, State}, http::StatusCode, response::{IntoResponse, Response}, routing::get, Json, Router};
use search_core::catalog::load_catalog;
use search_core::{search, Catalog, ProblemMeta, ScoredResult, DEFAULT_TOP_K};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

/// Upper bound on `k` accepted from a request.
pub const MAX_TOP_K: usize = 100;

/// Reads that land inside an index swap see a missing directory or artifacts of
/// two builds; retry this many times.
const SWAP_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(50);

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub user_query: String,
    pub difficulty: Option<String>,
    /// Comma-separated; every listed tag must be present.
    pub tags: Option<String>,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { DEFAULT_TOP_K }

#[derive(Serialize)]
pub struct SearchResponse {
    pub status: u8,
    pub total: usize,
    pub data: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub tags: Vec<String>,
    pub url: String,
    pub platform: Option<String>,
    pub score: f64,
}

#[derive(Clone)]
pub struct AppState {
    pub index_dir: PathBuf,
    pub catalog: Arc<Catalog>,
}

pub fn build_app(index_dir: impl Into<PathBuf>, catalog_path: &Path) -> Result<Router> {
    // The catalog is loaded once; the index is reloaded on every query.
    let catalog = load_catalog(catalog_path)
        .with_context(|| format!("loading catalog {}", catalog_path.display()))?;
    tracing::info!(problems = catalog.len(), "catalog loaded");
    let app_state = AppState { index_dir: index_dir.into(), catalog: Arc::new(catalog) };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/search", get(search_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

fn search_with_retry(index_dir: &Path, query: &str, k: usize) -> search_core::Result<Vec<ScoredResult>> {
    let mut attempt = 0;
    loop {
        match search(index_dir, query, k) {
            Err(e) if e.is_retryable() && attempt < SWAP_RETRIES => {
                attempt += 1;
                tracing::debug!(attempt, error = %e, "index not readable, retrying");
                std::thread::sleep(RETRY_DELAY);
            }
            other => return other,
        }
    }
}

fn failure(status: StatusCode, error: String) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(serde_json::json!({ "status": 0, "message": "Search failed", "error": error })))
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, (StatusCode, Json<serde_json::Value>)> {
    let index_dir = state.index_dir.clone();
    let query = params.user_query.clone();
    let k = params.k.min(MAX_TOP_K);
    let ranked = tokio::task::spawn_blocking(move || search_with_retry(&index_dir, &query, k))
        .await
        .map_err(|e| failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| {
            tracing::error!(error = %e, "search failed");
            let status = if e.is_retryable() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            failure(status, e.to_string())
        })?;

    if ranked.is_empty() {
        let body = serde_json::json!({ "status": 0, "message": "No problems found matching the search criteria" });
        return Ok(Json(body).into_response());
    }

    let difficulty = params.difficulty.as_deref().map(str::trim).filter(|d| !d.is_empty());
    let wanted_tags: Vec<String> = params
        .tags
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    let data: Vec<SearchHit> = ranked
        .into_iter()
        .filter_map(|r| {
            let meta = state.catalog.get(&r.doc_id)?;
            if difficulty.is_some_and(|d| meta.difficulty != d) {
                return None;
            }
            if !meta.has_all_tags(&wanted_tags) {
                return None;
            }
            Some(hit(meta, r.score))
        })
        .collect();

    tracing::debug!(query = %params.user_query, total = data.len(), "search served");
    Ok(Json(SearchResponse { status: 1, total: data.len(), data }).into_response())
}

fn hit(meta: &ProblemMeta, score: f64) -> SearchHit {
    SearchHit {
        id: meta.id.clone(),
        title: meta.title.clone(),
        description: meta.description.clone(),
        difficulty: meta.difficulty.clone(),
        tags: meta.tags.clone(),
        url: meta.url.clone(),
        platform: meta.platform.clone(),
        score,
    }
}
