//! Deterministic threshold classifier (fallback when no model is loaded)

use crate::classifier::TierClassifier;
use skillscope_core::{FeatureVector, PerformanceTier, Result};

const ADVANCED_MIN_SCORE: f64 = 80.0;
const ADVANCED_MIN_DIVERSITY: f64 = 0.5;
const INTERMEDIATE_MIN_SCORE: f64 = 60.0;
const INTERMEDIATE_MIN_DIVERSITY: f64 = 0.3;

/// Threshold cascade over average score and topic diversity.
///
/// Pure function of its input; never fails.
#[derive(Debug, Clone)]
pub struct RuleBasedClassifier {
    name: String,
}

impl RuleBasedClassifier {
    pub fn new() -> Self {
        Self {
            name: "rule-based".to_string(),
        }
    }

    /// Classify without the `Result` wrapper
    pub fn tier_for(&self, features: &FeatureVector) -> PerformanceTier {
        let avg_score = features.avg_score();
        let topic_diversity = features.topic_diversity();

        if avg_score >= ADVANCED_MIN_SCORE && topic_diversity >= ADVANCED_MIN_DIVERSITY {
            PerformanceTier::Advanced
        } else if avg_score >= INTERMEDIATE_MIN_SCORE
            && topic_diversity >= INTERMEDIATE_MIN_DIVERSITY
        {
            PerformanceTier::Intermediate
        } else {
            PerformanceTier::Beginner
        }
    }
}

impl Default for RuleBasedClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TierClassifier for RuleBasedClassifier {
    fn classify(&self, features: &FeatureVector) -> Result<PerformanceTier> {
        Ok(self.tier_for(features))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
