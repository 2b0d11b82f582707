//! SkillScope Core
//!
//! Core types and utilities shared across SkillScope components.
//!
//! This crate provides:
//! - The metric record, performance tier and classification result types
//! - The fixed-order feature contract shared by training and inference
//! - Error types and result handling
//! - Aggregation of raw quiz attempts into metric records

pub mod error;
pub mod features;
pub mod progress;
pub mod types;

pub use error::{Error, Result};
pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use progress::{ProgressStats, ProgressSummary, QuizAttempt, TopicPerformance, TopicScore};
pub use types::{ClassificationResult, Confidence, MetricRecord, PerformanceTier};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::features::{self, FeatureVector};
    pub use crate::types::{ClassificationResult, Confidence, MetricRecord, PerformanceTier};
}
