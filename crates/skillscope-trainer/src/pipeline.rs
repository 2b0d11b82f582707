//! Training pipeline: generate, split, fit, evaluate, persist

use crate::dataset::Dataset;
use crate::evaluation::{ranked_importances, ClassificationReport, FeatureImportance};
use crate::synthetic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillscope_classifiers::{ClassWeight, ForestParams, ModelArtifact, RandomForest};
use skillscope_core::{Error, PerformanceTier, Result, FEATURE_NAMES};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Training run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of synthetic rows to generate
    #[serde(default = "default_n_samples")]
    pub n_samples: usize,

    /// Fraction of rows held out for evaluation
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,

    /// Seed for generation, splitting and fitting
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,

    /// `None` grows trees until leaves are pure
    #[serde(default = "default_max_depth")]
    pub max_depth: Option<usize>,
}

fn default_n_samples() -> usize {
    1000
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

fn default_n_estimators() -> usize {
    100
}

fn default_max_depth() -> Option<usize> {
    Some(10)
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_samples: default_n_samples(),
            test_fraction: default_test_fraction(),
            seed: default_seed(),
            n_estimators: default_n_estimators(),
            max_depth: default_max_depth(),
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_samples == 0 {
            return Err(Error::config("n_samples must be at least 1"));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(Error::config(format!(
                "test_fraction must be between 0 and 1, got {}",
                self.test_fraction
            )));
        }
        if self.n_estimators == 0 {
            return Err(Error::config("n_estimators must be at least 1"));
        }
        if self.max_depth == Some(0) {
            return Err(Error::config("max_depth must be at least 1"));
        }
        Ok(())
    }

    fn forest_params(&self) -> ForestParams {
        ForestParams::default()
            .with_n_estimators(self.n_estimators)
            .with_max_depth(self.max_depth)
            .with_class_weight(ClassWeight::Balanced)
            .with_seed(self.seed)
    }
}

/// Diagnostics from one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub config: TrainingConfig,
    /// Generated rows per tier label
    pub class_distribution: BTreeMap<String, usize>,
    pub train_size: usize,
    pub test_size: usize,
    pub accuracy: f64,
    pub classification: ClassificationReport,
    /// Most important first
    pub feature_importances: Vec<FeatureImportance>,
    pub trained_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// A fitted artifact and the report describing it
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    pub report: TrainingReport,
}

impl TrainingOutcome {
    /// Write the model artifact, and the JSON report when a path is given
    pub fn save(&self, model_path: &Path, report_path: Option<&Path>) -> Result<()> {
        self.artifact.save(model_path)?;

        if let Some(path) = report_path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, serde_json::to_vec_pretty(&self.report)?)?;
            info!("Saved training report to {}", path.display());
        }
        Ok(())
    }
}

/// Generate a synthetic dataset and train on it
pub fn train(config: &TrainingConfig) -> Result<TrainingOutcome> {
    config.validate()?;

    info!("Generating {} synthetic training samples", config.n_samples);
    let dataset = synthetic::generate(config.n_samples, config.seed);
    train_on(config, &dataset)
}

/// Train on an existing dataset
pub fn train_on(config: &TrainingConfig, dataset: &Dataset) -> Result<TrainingOutcome> {
    config.validate()?;
    let start = Instant::now();

    let class_distribution: BTreeMap<String, usize> = PerformanceTier::ALL
        .iter()
        .zip(dataset.class_distribution())
        .map(|(tier, count)| (tier.as_str().to_string(), count))
        .collect();
    for (label, count) in &class_distribution {
        info!("  {label}: {count}");
    }

    let (train_set, test_set) = dataset.stratified_split(config.test_fraction, config.seed)?;
    debug!(
        train = train_set.len(),
        test = test_set.len(),
        "Stratified split"
    );

    info!(
        "Training random forest ({} trees, max depth {:?})",
        config.n_estimators, config.max_depth
    );
    let forest = RandomForest::fit(
        config.forest_params(),
        train_set.features(),
        &train_set.label_indices(),
        PerformanceTier::COUNT,
    )?;

    let y_pred = test_set
        .features()
        .iter()
        .map(|row| forest.predict(row.as_slice()))
        .collect::<Result<Vec<usize>>>()?;
    let labels: Vec<&str> = PerformanceTier::ALL.iter().map(|t| t.as_str()).collect();
    let classification =
        ClassificationReport::compute(&test_set.label_indices(), &y_pred, &labels)?;

    let feature_importances = ranked_importances(&FEATURE_NAMES, forest.feature_importances());

    info!("Accuracy: {:.2}%", classification.accuracy * 100.0);
    for entry in &feature_importances {
        info!("  {:<20} {:.4}", entry.feature, entry.importance);
    }

    let artifact = ModelArtifact::new(forest);
    let report = TrainingReport {
        config: config.clone(),
        class_distribution,
        train_size: train_set.len(),
        test_size: test_set.len(),
        accuracy: classification.accuracy,
        classification,
        feature_importances,
        trained_at: artifact.trained_at,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    Ok(TrainingOutcome { artifact, report })
}
