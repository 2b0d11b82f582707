//! Shared application state

use metrics_exporter_prometheus::PrometheusHandle;
use skillscope_classifiers::{AnalysisService, FileArtifactLoader};
use std::sync::Arc;
use tracing::info;

use crate::config::ServiceConfig;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Classifier strategy and recommendation table, fixed at startup
    pub analysis: Arc<AnalysisService>,

    /// Prometheus metrics handle for rendering, when metrics are enabled
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(analysis: AnalysisService, metrics_handle: Option<PrometheusHandle>) -> Self {
        Self {
            analysis: Arc::new(analysis),
            metrics_handle,
        }
    }

    /// Select the classifier from the configured artifact location
    pub fn from_config(config: &ServiceConfig, metrics_handle: Option<PrometheusHandle>) -> Self {
        let loader = FileArtifactLoader::new(&config.model_path);
        let analysis = AnalysisService::from_loader(&loader);
        info!(
            "Classifier strategy: {} (model loaded: {})",
            analysis.strategy().name(),
            analysis.model_loaded()
        );
        Self::new(analysis, metrics_handle)
    }
}
