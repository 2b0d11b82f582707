//! Analysis facade: feature vector, tier, recommendation and confidence in one call

use crate::classifier::{ArtifactLoader, ClassifierStrategy};
use crate::recommendation::RecommendationTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skillscope_core::progress::{
    ProgressStats, ProgressSummary, QuizAttempt, TopicPerformance, TopicScore,
};
use skillscope_core::{
    features, ClassificationResult, Confidence, Error, MetricRecord, PerformanceTier, Result,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Recommendation returned when a learner has no recent attempts
pub const NOT_ENOUGH_DATA_RECOMMENDATION: &str =
    "Take more quizzes to get personalized recommendations!";

/// Analysis of a learner's attempt history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressAnalysis {
    /// Set only when there was nothing to analyze
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(rename = "performance_level")]
    pub tier: PerformanceTier,

    pub recommendation: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ProgressStats>,

    #[serde(
        rename = "topicPerformance",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub topic_performance: BTreeMap<String, TopicPerformance>,

    #[serde(rename = "weakTopics", default)]
    pub weak_topics: Vec<TopicScore>,

    #[serde(rename = "strongTopics", default)]
    pub strong_topics: Vec<TopicScore>,
}

impl ProgressAnalysis {
    fn not_enough_data() -> Self {
        Self {
            message: Some("Not enough data for analysis".to_string()),
            tier: PerformanceTier::Beginner,
            recommendation: NOT_ENOUGH_DATA_RECOMMENDATION.to_string(),
            confidence: None,
            stats: Some(ProgressStats::default()),
            topic_performance: BTreeMap::new(),
            weak_topics: Vec::new(),
            strong_topics: Vec::new(),
        }
    }
}

/// Shared, read-only analysis service.
///
/// Holds the strategy selected at startup and the recommendation table;
/// safe to call from many request handlers at once.
pub struct AnalysisService {
    strategy: ClassifierStrategy,
    recommendations: Arc<RecommendationTable>,
}

impl AnalysisService {
    pub fn new(strategy: ClassifierStrategy, recommendations: Arc<RecommendationTable>) -> Self {
        Self {
            strategy,
            recommendations,
        }
    }

    /// Select the strategy from the loader and use the standard message table
    pub fn from_loader(loader: &dyn ArtifactLoader) -> Self {
        Self::new(
            ClassifierStrategy::select(loader),
            Arc::new(RecommendationTable::standard()),
        )
    }

    /// Whether a trained model is serving predictions
    pub fn model_loaded(&self) -> bool {
        self.strategy.is_learned()
    }

    pub fn strategy(&self) -> &ClassifierStrategy {
        &self.strategy
    }

    pub fn recommendations(&self) -> &RecommendationTable {
        &self.recommendations
    }

    /// Classify a metric record and attach a recommendation.
    ///
    /// Classification errors are returned as-is; anything else raised while
    /// classifying is reported as an analysis error.
    pub fn analyze(&self, record: &MetricRecord) -> Result<ClassificationResult> {
        let start = Instant::now();
        let vector = features::build(record);

        let tier = self.strategy.classify(&vector).map_err(|e| match e {
            Error::Classification(_) | Error::Analysis(_) => e,
            other => Error::analysis(other.to_string()),
        })?;

        let recommendation = self.recommendations.select(
            tier,
            record.avg_score,
            record.topic_diversity,
            record.recent_improvement,
        );

        let result = ClassificationResult {
            tier,
            recommendation: recommendation.to_string(),
            confidence: self.strategy.confidence(),
        };

        debug!(
            strategy = self.strategy.name(),
            tier = %result.tier,
            confidence = result.confidence.as_str(),
            latency_us = start.elapsed().as_micros() as u64,
            "Analysis complete"
        );
        Ok(result)
    }

    /// Decode a raw JSON body and analyze it
    pub fn analyze_json(&self, body: &Value) -> Result<ClassificationResult> {
        let record = features::record_from_json(body)?;
        self.analyze(&record)
    }

    /// Aggregate attempts from the recent window ending at `now` and analyze them
    pub fn analyze_progress(
        &self,
        attempts: &[QuizAttempt],
        now: DateTime<Utc>,
    ) -> Result<ProgressAnalysis> {
        let Some(summary) = ProgressSummary::from_recent(attempts, now) else {
            debug!("No recent attempts; returning default progress analysis");
            return Ok(ProgressAnalysis::not_enough_data());
        };

        let result = self.analyze(&summary.record)?;
        Ok(ProgressAnalysis {
            message: None,
            tier: result.tier,
            recommendation: result.recommendation,
            confidence: Some(result.confidence),
            stats: Some(summary.stats),
            topic_performance: summary.topic_performance,
            weak_topics: summary.weak_topics,
            strong_topics: summary.strong_topics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Predictor;
    use chrono::Duration;
    use serde_json::json;
    use skillscope_core::FeatureVector;

    struct Fixed(usize);

    impl Predictor for Fixed {
        fn predict(&self, _features: &FeatureVector) -> Result<usize> {
            Ok(self.0)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn rule_based() -> AnalysisService {
        AnalysisService::new(
            ClassifierStrategy::rule_based(),
            Arc::new(RecommendationTable::standard()),
        )
    }

    fn attempt(topic: &str, score: f64, days_ago: i64, now: DateTime<Utc>) -> QuizAttempt {
        QuizAttempt {
            topic: topic.to_string(),
            score,
            time_spent: 20.0,
            completed_at: now - Duration::days(days_ago),
        }
    }

    #[test]
    fn test_rule_based_analysis() {
        let service = rule_based();
        let record = MetricRecord {
            avg_score: 85.0,
            time_spent: 40.0,
            completion_rate: 0.9,
            topic_diversity: 0.7,
            recent_improvement: 5.0,
        };

        let result = service.analyze(&record).unwrap();
        assert_eq!(result.tier, PerformanceTier::Advanced);
        assert_eq!(result.confidence, Confidence::Medium);
        assert!(result.recommendation.starts_with("Excellent work!"));
        assert!(!service.model_loaded());
    }

    #[test]
    fn test_learned_analysis_reports_high_confidence() {
        let service = AnalysisService::new(
            ClassifierStrategy::learned(Arc::new(Fixed(1))),
            Arc::new(RecommendationTable::standard()),
        );
        let result = service.analyze(&MetricRecord::default()).unwrap();
        assert_eq!(result.tier, PerformanceTier::Intermediate);
        assert_eq!(result.confidence, Confidence::High);
        assert!(service.model_loaded());
    }

    #[test]
    fn test_analyze_json_rejects_non_numeric_fields() {
        let err = rule_based()
            .analyze_json(&json!({"avg_score": "high"}))
            .unwrap_err();
        assert!(matches!(err, Error::Analysis(_)));
    }

    #[test]
    fn test_empty_body_is_beginner() {
        let result = rule_based().analyze_json(&json!({})).unwrap();
        assert_eq!(result.tier, PerformanceTier::Beginner);
        assert_eq!(
            result.recommendation,
            "Focus on building strong fundamentals. Review basic concepts and practice regularly."
        );
    }

    #[test]
    fn test_progress_without_recent_attempts() {
        let now = Utc::now();
        let stale = vec![attempt("algebra", 90.0, 45, now)];

        let analysis = rule_based().analyze_progress(&stale, now).unwrap();
        assert_eq!(analysis.message.as_deref(), Some("Not enough data for analysis"));
        assert_eq!(analysis.tier, PerformanceTier::Beginner);
        assert_eq!(analysis.recommendation, NOT_ENOUGH_DATA_RECOMMENDATION);

        let body = serde_json::to_value(&analysis).unwrap();
        assert_eq!(body["stats"]["totalQuizzes"], 0);
        assert_eq!(body["stats"]["avgScore"], 0);
        assert_eq!(body["stats"]["totalTimeSpent"], 0.0);
        assert_eq!(body["stats"]["completionRate"], 0);
        assert_eq!(body["weakTopics"], json!([]));
        assert!(body.get("topicPerformance").is_none());
    }

    #[test]
    fn test_progress_analysis_carries_breakdown() {
        let now = Utc::now();
        let attempts = vec![
            attempt("algebra", 92.0, 1, now),
            attempt("geometry", 88.0, 2, now),
            attempt("calculus", 55.0, 3, now),
            attempt("algebra", 84.0, 4, now),
        ];

        let analysis = rule_based().analyze_progress(&attempts, now).unwrap();
        assert!(analysis.message.is_none());
        assert_eq!(analysis.confidence, Some(Confidence::Medium));
        assert_eq!(analysis.stats.as_ref().map(|s| s.total_quizzes), Some(4));
        assert_eq!(analysis.topic_performance.len(), 3);
        assert_eq!(analysis.weak_topics.len(), 1);
        assert_eq!(analysis.weak_topics[0].topic, "calculus");

        let body = serde_json::to_value(&analysis).unwrap();
        assert!(body.get("performance_level").is_some());
        assert!(body.get("message").is_none());
        assert_eq!(body["topicPerformance"]["algebra"]["count"], 2);
        assert_eq!(body["weakTopics"][0]["topic"], "calculus");
        assert_eq!(body["strongTopics"].as_array().map(Vec::len), Some(2));
        assert!(body.get("weak_topics").is_none());
    }
}
