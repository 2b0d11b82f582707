//! Classifier backed by a trained model artifact

use crate::classifier::{Predictor, TierClassifier};
use skillscope_core::{Error, FeatureVector, PerformanceTier, Result};
use std::sync::Arc;

/// Wraps a shared, read-only predictor and maps class indices to tiers
#[derive(Clone)]
pub struct LearnedClassifier {
    predictor: Arc<dyn Predictor>,
}

impl LearnedClassifier {
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self { predictor }
    }

    pub fn predictor(&self) -> &Arc<dyn Predictor> {
        &self.predictor
    }
}

impl TierClassifier for LearnedClassifier {
    fn classify(&self, features: &FeatureVector) -> Result<PerformanceTier> {
        let index = self.predictor.predict(features).map_err(|e| match e {
            Error::Classification(_) => e,
            other => Error::classification(other.to_string()),
        })?;

        PerformanceTier::from_index(index).ok_or_else(|| {
            Error::classification(format!(
                "model '{}' returned class index {} outside 0..{}",
                self.predictor.name(),
                index,
                PerformanceTier::COUNT
            ))
        })
    }

    fn name(&self) -> &str {
        self.predictor.name()
    }
}
