//! Synthetic learner generation
//!
//! Each sample picks a tier uniformly, draws every feature from that tier's
//! normal distribution and clamps it to the feature's nominal range.

use crate::dataset::Dataset;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skillscope_core::{FeatureVector, PerformanceTier, FEATURE_COUNT};
use std::f64::consts::TAU;

/// Inclusive nominal range per feature, in feature order
pub const FEATURE_RANGES: [(f64, f64); FEATURE_COUNT] = [
    (0.0, 100.0),
    (10.0, 120.0),
    (0.0, 1.0),
    (0.0, 1.0),
    (-30.0, 30.0),
];

/// Normal distribution parameters for one tier, in feature order
#[derive(Debug, Clone, Copy)]
pub struct TierProfile {
    pub means: [f64; FEATURE_COUNT],
    pub std_devs: [f64; FEATURE_COUNT],
}

impl TierProfile {
    pub fn for_tier(tier: PerformanceTier) -> Self {
        match tier {
            PerformanceTier::Beginner => Self {
                means: [45.0, 60.0, 0.6, 0.25, 5.0],
                std_devs: [15.0, 20.0, 0.15, 0.1, 10.0],
            },
            PerformanceTier::Intermediate => Self {
                means: [70.0, 45.0, 0.8, 0.5, 8.0],
                std_devs: [10.0, 15.0, 0.1, 0.15, 8.0],
            },
            PerformanceTier::Advanced => Self {
                means: [88.0, 35.0, 0.95, 0.7, 3.0],
                std_devs: [8.0, 10.0, 0.05, 0.15, 5.0],
            },
        }
    }
}

/// Seeded generator of labelled learner records
pub struct SyntheticGenerator {
    rng: StdRng,
}

impl SyntheticGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw one labelled sample
    pub fn sample(&mut self) -> (FeatureVector, PerformanceTier) {
        let index = self.rng.gen_range(0..PerformanceTier::COUNT);
        let tier = PerformanceTier::from_index(index).unwrap_or(PerformanceTier::Beginner);
        let profile = TierProfile::for_tier(tier);

        let mut values = [0.0; FEATURE_COUNT];
        for (i, value) in values.iter_mut().enumerate() {
            let raw = profile.means[i] + profile.std_devs[i] * self.standard_normal();
            let (low, high) = FEATURE_RANGES[i];
            *value = raw.clamp(low, high);
        }

        (FeatureVector::new(values), tier)
    }

    /// Draw `n_samples` labelled samples
    pub fn generate(&mut self, n_samples: usize) -> Dataset {
        let mut dataset = Dataset::with_capacity(n_samples);
        for _ in 0..n_samples {
            let (features, tier) = self.sample();
            dataset.push(features, tier);
        }
        dataset
    }

    // Box-Muller transform
    fn standard_normal(&mut self) -> f64 {
        // gen() is in [0, 1); shift to (0, 1] so ln never sees zero
        let u1 = 1.0 - self.rng.gen::<f64>();
        let u2 = self.rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
    }
}

/// Generate a synthetic dataset with a fixed seed
pub fn generate(n_samples: usize, seed: u64) -> Dataset {
    SyntheticGenerator::new(seed).generate(n_samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mean(values: impl Iterator<Item = f64>) -> f64 {
        let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
        sum / count as f64
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = generate(200, 42);
        let b = generate(200, 42);
        assert_eq!(a.features(), b.features());
        assert_eq!(a.labels(), b.labels());
    }

    #[test]
    fn test_different_seed_different_data() {
        let a = generate(50, 1);
        let b = generate(50, 2);
        assert_ne!(a.features(), b.features());
    }

    #[test]
    fn test_tiers_are_roughly_uniform() {
        let dataset = generate(3000, 42);
        for count in dataset.class_distribution() {
            assert!((800..=1200).contains(&count), "count {count}");
        }
    }

    #[test]
    fn test_feature_means_follow_tier_profiles() {
        let dataset = generate(6000, 7);
        for tier in PerformanceTier::ALL {
            let profile = TierProfile::for_tier(tier);
            let rows: Vec<&FeatureVector> = dataset
                .iter()
                .filter(|(_, t)| *t == tier)
                .map(|(f, _)| f)
                .collect();

            let score = mean(rows.iter().map(|f| f.avg_score()));
            assert!(
                (score - profile.means[0]).abs() < 2.0,
                "{tier}: mean score {score}"
            );
        }
    }

    #[test]
    fn test_standard_normal_moments() {
        let mut generator = SyntheticGenerator::new(3);
        let draws: Vec<f64> = (0..20_000).map(|_| generator.standard_normal()).collect();
        let m = mean(draws.iter().copied());
        let var = mean(draws.iter().map(|x| (x - m) * (x - m)));
        assert!(m.abs() < 0.05, "mean {m}");
        assert!((var - 1.0).abs() < 0.05, "variance {var}");
    }

    proptest! {
        #[test]
        fn prop_samples_stay_in_range(seed in any::<u64>()) {
            let dataset = generate(64, seed);
            for (features, _) in dataset.iter() {
                for (value, (low, high)) in features.values().iter().zip(FEATURE_RANGES) {
                    prop_assert!(*value >= low && *value <= high);
                }
            }
        }
    }
}
