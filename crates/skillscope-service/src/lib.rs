//! SkillScope Service
//!
//! HTTP front end for learner performance analysis.
//!
//! Endpoints:
//! - `GET /health`: liveness and whether a trained model is loaded
//! - `POST /analyze`: classify a metric record and recommend next steps
//! - `POST /progress/analyze`: the same, starting from raw quiz attempts
//! - `GET /metrics`: Prometheus metrics

pub mod app;
pub mod config;
pub mod routes;
pub mod state;

pub use app::{build_app, run_server};
pub use config::{ConfigOverrides, CorsConfig, ServiceConfig};
pub use routes::{create_router, AppError};
pub use state::AppState;
