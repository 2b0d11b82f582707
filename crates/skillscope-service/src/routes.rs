//! HTTP routes and handlers

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use skillscope_classifiers::ProgressAnalysis;
use skillscope_core::{ClassificationResult, Error, QuizAttempt};
use std::time::Instant;
use tracing::{debug, error};
use uuid::Uuid;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/analyze", post(analyze))
        .route("/progress/analyze", post(analyze_progress))
        .route("/metrics", get(metrics))
        .fallback(fallback)
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "ML Service is running",
        "model_loaded": state.analysis.model_loaded(),
    }))
}

/// Classify a partial metric record and attach a recommendation
async fn analyze(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ClassificationResult>, AppError> {
    let request_id = Uuid::new_v4();
    metrics::counter!("skillscope_requests_total", "endpoint" => "analyze").increment(1);

    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| Error::analysis(format!("invalid JSON body: {e}")))?;

    let start = Instant::now();
    let result = state.analysis.analyze_json(&value)?;
    let latency = start.elapsed();

    metrics::histogram!("skillscope_analyze_latency_us").record(latency.as_micros() as f64);
    metrics::counter!(
        "skillscope_classifications_total",
        "tier" => result.tier.as_str(),
        "confidence" => result.confidence.as_str()
    )
    .increment(1);

    debug!(
        %request_id,
        tier = %result.tier,
        latency_us = latency.as_micros() as u64,
        "Analyze request complete"
    );
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct ProgressRequest {
    #[serde(default)]
    attempts: Vec<QuizAttempt>,
}

/// Aggregate a learner's recent quiz attempts and classify the result
async fn analyze_progress(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ProgressAnalysis>, AppError> {
    metrics::counter!("skillscope_requests_total", "endpoint" => "progress").increment(1);

    let request: ProgressRequest = serde_json::from_slice(&body)
        .map_err(|e| Error::analysis(format!("invalid progress request: {e}")))?;

    let analysis = state
        .analysis
        .analyze_progress(&request.attempts, Utc::now())?;
    debug!(
        attempts = request.attempts.len(),
        tier = %analysis.tier,
        "Progress analysis complete"
    );
    Ok(Json(analysis))
}

async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics_handle {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "Metrics disabled").into_response(),
    }
}

async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Request failure; rendered as HTTP 500 with the cause in `message`
#[derive(Debug)]
pub enum AppError {
    /// The trained model failed on this request
    Classification(String),
    /// Decoding or orchestration failed
    Analysis(String),
}

impl AppError {
    fn kind(&self) -> &'static str {
        match self {
            AppError::Classification(_) => "classification",
            AppError::Analysis(_) => "analysis",
        }
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::Classification(msg) => AppError::Classification(msg),
            Error::Analysis(msg) => AppError::Analysis(msg),
            other => AppError::Analysis(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        metrics::counter!("skillscope_errors_total", "kind" => self.kind()).increment(1);

        let message = match self {
            AppError::Classification(msg) | AppError::Analysis(msg) => msg,
        };
        error!("Analysis failed: {}", message);

        let body = json!({
            "error": "Analysis failed",
            "message": message,
        });

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
