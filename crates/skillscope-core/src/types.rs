//! Core types for SkillScope

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Learner performance tier, ordered from least to most proficient.
///
/// The discriminant order is the class-index order used by trained models:
/// index 0 is Beginner, 1 is Intermediate, 2 is Advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PerformanceTier {
    Beginner,
    Intermediate,
    Advanced,
}

impl PerformanceTier {
    /// All tiers in class-index order
    pub const ALL: [PerformanceTier; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    /// Number of tiers (model classes)
    pub const COUNT: usize = 3;

    /// Map a model class index to a tier
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Class index of this tier
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display label
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PerformanceTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| Error::analysis(format!("unknown performance tier '{s}'")))
    }
}

/// Which classification strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// The learned model classified the request
    High,
    /// The rule-based fallback classified the request
    Medium,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate behavioral metrics for one learner.
///
/// Every field is optional on input and defaults to zero. Values are not
/// range-checked at inference time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricRecord {
    /// Average quiz score, nominally 0-100
    pub avg_score: f64,

    /// Average minutes spent per quiz, nominally 10-120
    pub time_spent: f64,

    /// Fraction of started quizzes that were finished, nominally 0-1
    pub completion_rate: f64,

    /// Fraction of the topic catalog attempted, nominally 0-1
    pub topic_diversity: f64,

    /// Score delta between recent and older attempts, nominally -30 to 30
    pub recent_improvement: f64,
}

/// Result of classifying a metric record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Predicted performance tier
    #[serde(rename = "performance_level")]
    pub tier: PerformanceTier,

    /// Personalized recommendation text
    pub recommendation: String,

    /// `high` when the learned model produced the tier, `medium` otherwise
    pub confidence: Confidence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_index_mapping() {
        for (index, tier) in PerformanceTier::ALL.iter().enumerate() {
            assert_eq!(tier.index(), index);
            assert_eq!(PerformanceTier::from_index(index), Some(*tier));
        }
        assert_eq!(PerformanceTier::from_index(3), None);
    }

    #[test]
    fn test_tier_parse() {
        assert_eq!(
            "Advanced".parse::<PerformanceTier>().unwrap(),
            PerformanceTier::Advanced
        );
        assert!("Expert".parse::<PerformanceTier>().is_err());
        assert!("beginner".parse::<PerformanceTier>().is_err());
    }

    #[test]
    fn test_tier_ordering() {
        assert!(PerformanceTier::Beginner < PerformanceTier::Intermediate);
        assert!(PerformanceTier::Intermediate < PerformanceTier::Advanced);
    }

    #[test]
    fn test_result_serialization() {
        let result = ClassificationResult {
            tier: PerformanceTier::Intermediate,
            recommendation: "keep going".to_string(),
            confidence: Confidence::Medium,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["performance_level"], "Intermediate");
        assert_eq!(json["recommendation"], "keep going");
        assert_eq!(json["confidence"], "medium");
    }

    #[test]
    fn test_record_defaults_missing_fields() {
        let record: MetricRecord = serde_json::from_str(r#"{"avg_score": 72.5}"#).unwrap();
        assert_eq!(record.avg_score, 72.5);
        assert_eq!(record.time_spent, 0.0);
        assert_eq!(record.recent_improvement, 0.0);
    }
}
