use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use reelcore::category::CategoryAliases;
use reelcore::persist::{SledReelStore, StorePaths};
use reelcore::query::{SearchConfig, SearchEngine, SearchRequest, Suggestion};
use reelcore::render::{FfmpegEncoder, RenderConfig, VideoGenerator};
use reelcore::store::{ReelStore, SortOrder};
use reelcore::synonyms::SynonymTable;
use reelcore::{Reel, ReelError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_dir: PathBuf,
    /// Where generated videos are written.
    pub generated_dir: PathBuf,
    /// Optional JSON synonym table replacing the built-in one.
    pub synonyms: Option<PathBuf>,
    pub ffmpeg: PathBuf,
    pub encode_timeout: Option<Duration>,
    pub admin_token: Option<String>,
    /// Comma-separated allowed origins; any origin when unset.
    pub cors_allow_origin: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from("./store"),
            generated_dir: PathBuf::from("./uploads/generated"),
            synonyms: None,
            ffmpeg: PathBuf::from("ffmpeg"),
            encode_timeout: None,
            admin_token: None,
            cors_allow_origin: None,
        }
    }
}

impl AppConfig {
    /// Fill the settings that come from the environment: `ADMIN_TOKEN`,
    /// `CORS_ALLOW_ORIGIN`, and `FFMPEG_PATH` (only when no binary was given).
    pub fn with_env(mut self, ffmpeg_from_args: bool) -> Self {
        self.admin_token = std::env::var("ADMIN_TOKEN").ok();
        self.cors_allow_origin = std::env::var("CORS_ALLOW_ORIGIN").ok();
        if !ffmpeg_from_args {
            if let Ok(path) = std::env::var("FFMPEG_PATH") {
                self.ffmpeg = PathBuf::from(path);
            }
        }
        self
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
    pub sort: Option<String>,
}

#[derive(Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<Reel>,
    #[serde(rename = "isFallback")]
    pub is_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub images: Vec<PathBuf>,
    pub audio: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub video_url: String,
    pub thumbnail_url: String,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReelStore>,
    pub engine: Arc<SearchEngine>,
    pub generator: Arc<VideoGenerator<FfmpegEncoder>>,
    pub generated_dir: PathBuf,
    pub admin_token: Option<String>,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn build_app(config: AppConfig) -> Result<Router> {
    let store = SledReelStore::open(&StorePaths::new(&config.store_dir))?;
    build_app_with_store(Arc::new(store), config)
}

pub fn build_app_with_store(store: Arc<dyn ReelStore>, config: AppConfig) -> Result<Router> {
    let synonyms = match &config.synonyms {
        Some(path) => SynonymTable::from_json_file(path)?,
        None => SynonymTable::default(),
    };
    let engine = SearchEngine::new(synonyms, CategoryAliases::default(), SearchConfig::default());
    let render_config = RenderConfig { timeout: config.encode_timeout, ..RenderConfig::default() };
    let generator = VideoGenerator::new(FfmpegEncoder::new(&config.ffmpeg), render_config);

    let app_state = AppState {
        store,
        engine: Arc::new(engine),
        generator: Arc::new(generator),
        generated_dir: config.generated_dir.clone(),
        admin_token: config.admin_token.clone(),
    };

    // CORS: CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match &config.cors_allow_origin {
        Some(val) => {
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
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/search", get(search_handler))
        .route("/api/search/suggestions", get(suggestions_handler))
        .route("/api/search/trending", get(trending_handler))
        .route("/api/reels/feed", get(feed_handler))
        .route("/api/reels/batch", post(reels_batch))
        .route("/api/reels/generate", post(generate_handler))
        .route("/api/reels/:id", get(reel_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

fn api_error(e: ReelError) -> ApiError {
    match e {
        ReelError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": msg }))),
        ReelError::NotFound(msg) => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": msg }))),
        ReelError::StorageFailure(msg) => {
            tracing::error!(error = %msg, "storage failure");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": "Server Error" })))
        }
        ReelError::RenderFailure { diagnostics } => {
            tracing::error!(%diagnostics, "generation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": format!("Error generating reel: {diagnostics}") })))
        }
    }
}

/// Run a store-bound call on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> reelcore::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| api_error(ReelError::StorageFailure(format!("store task failed: {e}"))))?
        .map_err(api_error)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let request = SearchRequest {
        query: params.q,
        category: params.category,
        sort: SortOrder::from_param(params.sort.as_deref()),
    };
    let (engine, store) = (state.engine.clone(), state.store.clone());
    let result = blocking(move || engine.search(store.as_ref(), &request)).await?;
    Ok(Json(SearchResponse {
        results: result.reels,
        is_fallback: result.is_fallback,
        message: result.message,
    }))
}

pub async fn suggestions_handler(State(state): State<AppState>, Query(params): Query<SuggestParams>) -> Result<Json<Vec<Suggestion>>, ApiError> {
    let (engine, store) = (state.engine.clone(), state.store.clone());
    blocking(move || engine.suggestions(store.as_ref(), &params.q)).await.map(Json)
}

pub async fn trending_handler(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let (engine, store) = (state.engine.clone(), state.store.clone());
    blocking(move || engine.trending(store.as_ref())).await.map(Json)
}

pub async fn feed_handler(State(state): State<AppState>) -> Result<Json<Vec<Reel>>, ApiError> {
    let (engine, store) = (state.engine.clone(), state.store.clone());
    blocking(move || engine.feed(store.as_ref())).await.map(Json)
}

pub async fn reel_handler(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Reel>, ApiError> {
    let store = state.store.clone();
    let lookup = id.clone();
    match blocking(move || store.get(&lookup)).await? {
        Some(reel) => Ok(Json(reel)),
        None => Err(api_error(ReelError::NotFound(format!("reel {id}")))),
    }
}

/// Runs the encoder on server-side paths, so it sits behind the admin token.
pub async fn generate_handler(State(state): State<AppState>, headers: axum::http::HeaderMap, Json(req): Json<GenerateRequest>) -> Result<Json<GenerateResponse>, ApiError> {
    authorize(&state, &headers)?;
    let Some(first) = req.images.first().cloned() else {
        return Err(api_error(ReelError::InvalidInput("At least one image is required.".into())));
    };
    let output = state.generated_dir.join(next_output_name());
    let video = state
        .generator
        .build(&req.images, req.audio.as_deref(), &output)
        .await
        .map_err(api_error)?;
    tracing::info!(video = %video.display(), images = req.images.len(), "reel generated");
    Ok(Json(GenerateResponse {
        success: true,
        video_url: video.to_string_lossy().replace('\\', "/"),
        thumbnail_url: first.to_string_lossy().replace('\\', "/"),
    }))
}

fn next_output_name() -> String {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let millis = time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("reel_{millis}_{seq}.mp4")
}

// --- Admin endpoints ---
async fn reels_batch(State(state): State<AppState>, headers: axum::http::HeaderMap, Json(reels): Json<Vec<Reel>>) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    let store = state.store.clone();
    let count = reels.len();
    blocking(move || reels.into_iter().try_for_each(|reel| store.insert(reel))).await?;
    tracing::info!(count, "batch ingested");
    Ok(Json(serde_json::json!({ "inserted": count })))
}

fn authorize(state: &AppState, headers: &axum::http::HeaderMap) -> Result<(), ApiError> {
    let unauthorized = |msg: &str| (StatusCode::UNAUTHORIZED, Json(serde_json::json!({ "error": msg })));
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err(unauthorized("ADMIN_TOKEN not set")),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(unauthorized("invalid admin token"))
    }
}
