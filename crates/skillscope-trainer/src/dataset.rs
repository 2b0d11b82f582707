//! Labelled feature rows and stratified splitting

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use skillscope_core::{Error, FeatureVector, PerformanceTier, Result};

/// Feature rows with their tier labels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    features: Vec<FeatureVector>,
    labels: Vec<PerformanceTier>,
}

impl Dataset {
    pub fn new(features: Vec<FeatureVector>, labels: Vec<PerformanceTier>) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(Error::training(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        Ok(Self { features, labels })
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            features: Vec::with_capacity(capacity),
            labels: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, features: FeatureVector, label: PerformanceTier) {
        self.features.push(features);
        self.labels.push(label);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn features(&self) -> &[FeatureVector] {
        &self.features
    }

    pub fn labels(&self) -> &[PerformanceTier] {
        &self.labels
    }

    /// Labels as class indices for model fitting
    pub fn label_indices(&self) -> Vec<usize> {
        self.labels.iter().map(|tier| tier.index()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FeatureVector, PerformanceTier)> + '_ {
        self.features.iter().zip(self.labels.iter().copied())
    }

    /// Row count per tier, indexed by class index
    pub fn class_distribution(&self) -> [usize; PerformanceTier::COUNT] {
        let mut counts = [0; PerformanceTier::COUNT];
        for tier in &self.labels {
            counts[tier.index()] += 1;
        }
        counts
    }

    /// Split into train and test sets, preserving each tier's proportion.
    ///
    /// Every tier contributes `round(count * test_fraction)` rows to the test
    /// set. The split is deterministic for a given seed.
    pub fn stratified_split(&self, test_fraction: f64, seed: u64) -> Result<(Dataset, Dataset)> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(Error::training(format!(
                "test fraction must be between 0 and 1, got {test_fraction}"
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut train_idx = Vec::new();
        let mut test_idx = Vec::new();

        for tier in PerformanceTier::ALL {
            let mut members: Vec<usize> = self
                .labels
                .iter()
                .enumerate()
                .filter(|&(_, &label)| label == tier)
                .map(|(i, _)| i)
                .collect();
            members.shuffle(&mut rng);

            let n_test = (members.len() as f64 * test_fraction).round() as usize;
            test_idx.extend_from_slice(&members[..n_test]);
            train_idx.extend_from_slice(&members[n_test..]);
        }

        if train_idx.is_empty() || test_idx.is_empty() {
            return Err(Error::training(format!(
                "cannot split {} rows with test fraction {test_fraction}",
                self.len()
            )));
        }

        train_idx.shuffle(&mut rng);
        test_idx.shuffle(&mut rng);
        Ok((self.subset(&train_idx), self.subset(&test_idx)))
    }

    fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i]).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }
}
