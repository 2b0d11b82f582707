//! Classifier traits and the process-wide classification strategy

use crate::learned::LearnedClassifier;
use crate::rule_based::RuleBasedClassifier;
use skillscope_core::{Confidence, Error, FeatureVector, PerformanceTier, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// A trained model that maps a feature vector to a class index
pub trait Predictor: Send + Sync {
    /// Predict the class index for one feature vector
    fn predict(&self, features: &FeatureVector) -> Result<usize>;

    /// Get the predictor name
    fn name(&self) -> &str;
}

/// Source of a trained predictor.
///
/// `load` returns [`Error::ArtifactNotFound`] when no artifact exists; any
/// other error means the artifact exists but is unusable.
pub trait ArtifactLoader {
    fn load(&self) -> Result<Arc<dyn Predictor>>;

    /// Human-readable artifact location for logs
    fn location(&self) -> String;
}

/// Trait for tier classifiers
pub trait TierClassifier: Send + Sync {
    /// Classify the given feature vector
    fn classify(&self, features: &FeatureVector) -> Result<PerformanceTier>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// The classifier used for every request in this process.
///
/// Chosen once at startup from artifact availability and never re-evaluated.
/// A learned classifier failure is reported to the caller; it does not fall
/// back to the rule-based variant.
pub enum ClassifierStrategy {
    Learned(LearnedClassifier),
    RuleBased(RuleBasedClassifier),
}

impl ClassifierStrategy {
    /// Select the strategy from whatever the loader can provide
    pub fn select(loader: &dyn ArtifactLoader) -> Self {
        match loader.load() {
            Ok(predictor) => {
                info!(
                    "Loaded model '{}' from {}",
                    predictor.name(),
                    loader.location()
                );
                Self::learned(predictor)
            }
            Err(Error::ArtifactNotFound(path)) => {
                warn!(
                    "Model not found at {}; using rule-based classification",
                    path.display()
                );
                Self::rule_based()
            }
            Err(e) => {
                warn!(
                    "Failed to load model from {}: {}; using rule-based classification",
                    loader.location(),
                    e
                );
                Self::rule_based()
            }
        }
    }

    pub fn learned(predictor: Arc<dyn Predictor>) -> Self {
        Self::Learned(LearnedClassifier::new(predictor))
    }

    pub fn rule_based() -> Self {
        Self::RuleBased(RuleBasedClassifier::new())
    }

    pub fn classify(&self, features: &FeatureVector) -> Result<PerformanceTier> {
        self.as_classifier().classify(features)
    }

    /// Confidence reported with every result this strategy produces
    pub fn confidence(&self) -> Confidence {
        match self {
            Self::Learned(_) => Confidence::High,
            Self::RuleBased(_) => Confidence::Medium,
        }
    }

    pub fn is_learned(&self) -> bool {
        matches!(self, Self::Learned(_))
    }

    pub fn name(&self) -> &str {
        self.as_classifier().name()
    }

    fn as_classifier(&self) -> &dyn TierClassifier {
        match self {
            Self::Learned(classifier) => classifier as &dyn TierClassifier,
            Self::RuleBased(classifier) => classifier as &dyn TierClassifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct ConstantPredictor(usize);

    impl Predictor for ConstantPredictor {
        fn predict(&self, _features: &FeatureVector) -> Result<usize> {
            Ok(self.0)
        }

        fn name(&self) -> &str {
            "constant"
        }
    }

    struct MissingLoader;

    impl ArtifactLoader for MissingLoader {
        fn load(&self) -> Result<Arc<dyn Predictor>> {
            Err(Error::ArtifactNotFound(PathBuf::from("missing.json")))
        }

        fn location(&self) -> String {
            "missing.json".to_string()
        }
    }

    struct CorruptLoader;

    impl ArtifactLoader for CorruptLoader {
        fn load(&self) -> Result<Arc<dyn Predictor>> {
            Err(Error::artifact("unexpected end of file"))
        }

        fn location(&self) -> String {
            "corrupt.json".to_string()
        }
    }

    struct PresentLoader;

    impl ArtifactLoader for PresentLoader {
        fn load(&self) -> Result<Arc<dyn Predictor>> {
            Ok(Arc::new(ConstantPredictor(2)))
        }

        fn location(&self) -> String {
            "memory".to_string()
        }
    }

    #[test]
    fn test_missing_artifact_selects_rule_based() {
        let strategy = ClassifierStrategy::select(&MissingLoader);
        assert!(!strategy.is_learned());
        assert_eq!(strategy.confidence(), Confidence::Medium);
        assert_eq!(strategy.name(), "rule-based");
    }

    #[test]
    fn test_corrupt_artifact_selects_rule_based() {
        let strategy = ClassifierStrategy::select(&CorruptLoader);
        assert!(!strategy.is_learned());
    }

    #[test]
    fn test_present_artifact_selects_learned() {
        let strategy = ClassifierStrategy::select(&PresentLoader);
        assert!(strategy.is_learned());
        assert_eq!(strategy.confidence(), Confidence::High);
        assert_eq!(
            strategy.classify(&FeatureVector::default()).unwrap(),
            PerformanceTier::Advanced
        );
    }
}
