//! SkillScope Trainer
//!
//! Offline training of the performance-tier random forest.
//!
//! The pipeline generates labelled synthetic learners, holds out a stratified
//! test split, fits a class-balanced forest, reports hold-out metrics and
//! feature importances, and writes the model artifact consumed by the service.

pub mod dataset;
pub mod evaluation;
pub mod pipeline;
pub mod synthetic;

pub use dataset::Dataset;
pub use evaluation::{
    accuracy, ranked_importances, AverageMetrics, ClassMetrics, ClassificationReport,
    FeatureImportance,
};
pub use pipeline::{train, train_on, TrainingConfig, TrainingOutcome, TrainingReport};
pub use synthetic::{SyntheticGenerator, TierProfile, FEATURE_RANGES};
