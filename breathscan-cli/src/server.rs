//! HTTP analyze endpoint.
//!
//! One route pair: `GET /api/health` for liveness and `POST /api/analyze`
//! taking raw WAV bytes in the request body. The upload is spooled to a
//! temp file (removed on every path by the tempfile guard) and run through
//! the same per-file pipeline the batch mode uses, on the blocking pool.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, warn};

use breathscan_core::{process_one_file, AnalysisSummary, BreathscanError, DetectorConfig};

#[derive(Clone)]
struct AppState {
    config: Arc<DetectorConfig>,
}

pub async fn serve(port: u16, config: DetectorConfig) -> anyhow::Result<()> {
    let state = AppState {
        config: Arc::new(config),
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "analyze endpoint listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "up" }))
}

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    /// Display name for the uploaded recording.
    name: Option<String>,
}

async fn analyze(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
    body: Bytes,
) -> Result<Json<AnalysisSummary>, (StatusCode, String)> {
    if body.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "empty upload".into()));
    }

    let name = params.name.unwrap_or_else(|| "upload.wav".into());
    let config = Arc::clone(&state.config);
    let worker_name = name.clone();

    let summary = tokio::task::spawn_blocking(move || analyze_bytes(&body, &worker_name, &config))
        .await
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "analysis worker panicked".to_string(),
            )
        })?
        .map_err(|e| match e {
            BreathscanError::MalformedContainer { .. } => {
                warn!(name = %name, error = %e, "rejecting malformed upload");
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        })?;

    info!(
        name = %name,
        pauses = summary.total_pauses,
        apnea_events = summary.apnea_event_count,
        "upload analyzed"
    );
    Ok(Json(summary))
}

/// Spools the uploaded bytes to disk and runs the file pipeline on them.
fn analyze_bytes(
    bytes: &[u8],
    name: &str,
    config: &DetectorConfig,
) -> Result<AnalysisSummary, BreathscanError> {
    let mut spool = tempfile::Builder::new()
        .prefix("breathscan-upload-")
        .suffix(".wav")
        .tempfile()
        .map_err(|e| BreathscanError::Other(e.into()))?;
    spool
        .write_all(bytes)
        .and_then(|()| spool.flush())
        .map_err(|e| BreathscanError::Other(e.into()))?;

    let pauses = process_one_file(spool.path(), config)?;
    Ok(AnalysisSummary::from_pauses(name, &pauses))
}
