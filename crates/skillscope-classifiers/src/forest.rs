//! Random forest classifier.
//!
//! A bagged ensemble of Gini decision trees. Each tree is grown on a bootstrap
//! sample with a random subset of `sqrt(n_features)` candidate features per
//! split. Prediction averages the per-tree class distributions and takes the
//! arg-max, resolving ties toward the lower class index.
//!
//! Training is fully determined by [`ForestParams::seed`]: tree `i` draws from
//! a generator seeded with `seed + i`.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use skillscope_core::{Error, Result};
use tracing::debug;

/// Minimum weighted impurity decrease for a split to be kept
const MIN_IMPURITY_DECREASE: f64 = 1e-12;

/// Per-class sample weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    /// Every sample weighs 1
    Uniform,
    /// Weights inversely proportional to class frequency
    Balanced,
}

impl ClassWeight {
    /// Weight for each class given the training labels.
    ///
    /// Balanced weights are `n_samples / (n_present_classes * class_count)`.
    /// Fails when a label is not in `0..n_classes`.
    pub fn weights(self, y: &[usize], n_classes: usize) -> Result<Vec<f64>> {
        if let Some(&label) = y.iter().find(|&&label| label >= n_classes) {
            return Err(Error::training(format!(
                "label {label} outside 0..{n_classes}"
            )));
        }

        match self {
            Self::Uniform => Ok(vec![1.0; n_classes]),
            Self::Balanced => {
                let mut counts = vec![0usize; n_classes];
                for &label in y {
                    counts[label] += 1;
                }
                let present = counts.iter().filter(|&&c| c > 0).count().max(1);
                Ok(counts
                    .iter()
                    .map(|&count| {
                        if count == 0 {
                            1.0
                        } else {
                            y.len() as f64 / (present * count) as f64
                        }
                    })
                    .collect())
            }
        }
    }
}

/// Hyperparameters for fitting a [`RandomForest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub class_weight: ClassWeight,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: Some(10),
            min_samples_split: 2,
            class_weight: ClassWeight::Balanced,
            seed: 42,
        }
    }
}

impl ForestParams {
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A node in a decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Samples with `row[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    /// Normalized class distribution of the training samples that reached it
    Leaf { distribution: Vec<f64> },
}

impl TreeNode {
    fn distribution_for(&self, row: &[f64]) -> &[f64] {
        let mut node = self;
        loop {
            match node {
                Self::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
                Self::Leaf { distribution } => return distribution,
            }
        }
    }

    /// Depth of the subtree; a lone leaf has depth 0
    pub fn depth(&self) -> usize {
        match self {
            Self::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
            Self::Leaf { .. } => 0,
        }
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<()> {
        match self {
            Self::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= n_features {
                    return Err(Error::artifact(format!(
                        "split on feature {feature} but model has {n_features} features"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(Error::artifact("split threshold is not finite"));
                }
                left.validate(n_features, n_classes)?;
                right.validate(n_features, n_classes)
            }
            Self::Leaf { distribution } => {
                if distribution.len() != n_classes {
                    return Err(Error::artifact(format!(
                        "leaf has {} class probabilities, expected {n_classes}",
                        distribution.len()
                    )));
                }
                Ok(())
            }
        }
    }
}

/// A single fitted tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: TreeNode,
}

impl DecisionTree {
    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

/// Fitted random forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    n_features: usize,
    n_classes: usize,
    trees: Vec<DecisionTree>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    /// Fit a forest on rows `x` with labels `y` in `0..n_classes`.
    pub fn fit<R: AsRef<[f64]>>(
        params: ForestParams,
        x: &[R],
        y: &[usize],
        n_classes: usize,
    ) -> Result<Self> {
        if x.is_empty() {
            return Err(Error::training("cannot fit a forest on an empty dataset"));
        }
        if x.len() != y.len() {
            return Err(Error::training(format!(
                "{} feature rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        if params.n_estimators == 0 {
            return Err(Error::training("n_estimators must be at least 1"));
        }
        if n_classes == 0 {
            return Err(Error::training("n_classes must be at least 1"));
        }

        let rows: Vec<&[f64]> = x.iter().map(|row| row.as_ref()).collect();
        let n_features = rows[0].len();
        if n_features == 0 {
            return Err(Error::training("feature rows are empty"));
        }
        if let Some(idx) = rows.iter().position(|row| row.len() != n_features) {
            return Err(Error::training(format!(
                "row {idx} has {} features, expected {n_features}",
                rows[idx].len()
            )));
        }
        if let Some(idx) = rows.iter().position(|row| row.iter().any(|v| !v.is_finite())) {
            return Err(Error::training(format!("row {idx} contains a non-finite value")));
        }
        let class_weights = params.class_weight.weights(y, n_classes)?;

        let builder = TreeBuilder {
            rows: &rows,
            labels: y,
            class_weights,
            n_classes,
            n_features,
            max_features: ((n_features as f64).sqrt() as usize).max(1),
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split.max(2),
        };

        let n_samples = rows.len();
        let mut trees = Vec::with_capacity(params.n_estimators);
        let mut importances = vec![0.0; n_features];

        for i in 0..params.n_estimators {
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(i as u64));
            let sample: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();

            let mut tree_importances = vec![0.0; n_features];
            let root = builder.grow(&sample, 0, &mut rng, &mut tree_importances);
            normalize(&mut tree_importances);
            for (total, value) in importances.iter_mut().zip(&tree_importances) {
                *total += value;
            }

            trees.push(DecisionTree { root });
        }
        normalize(&mut importances);

        debug!(
            trees = trees.len(),
            samples = n_samples,
            features = n_features,
            "Fitted random forest"
        );

        Ok(Self {
            params,
            n_features,
            n_classes,
            trees,
            feature_importances: importances,
        })
    }

    /// Mean class distribution over all trees
    pub fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>> {
        self.check_row(row)?;

        let mut probabilities = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (p, v) in probabilities
                .iter_mut()
                .zip(tree.root.distribution_for(row))
            {
                *p += v;
            }
        }

        let n_trees = self.trees.len() as f64;
        for p in &mut probabilities {
            *p /= n_trees;
        }
        Ok(probabilities)
    }

    /// Most probable class index
    pub fn predict(&self, row: &[f64]) -> Result<usize> {
        let probabilities = self.predict_proba(row)?;
        Ok(argmax(&probabilities))
    }

    /// Check structural consistency, e.g. after deserialization
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::artifact("forest has no trees"));
        }
        if self.feature_importances.len() != self.n_features {
            return Err(Error::artifact(format!(
                "{} feature importances for {} features",
                self.feature_importances.len(),
                self.n_features
            )));
        }
        for tree in &self.trees {
            tree.root.validate(self.n_features, self.n_classes)?;
        }
        Ok(())
    }

    fn check_row(&self, row: &[f64]) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::classification("forest has no trees"));
        }
        if row.len() != self.n_features {
            return Err(Error::classification(format!(
                "model expects {} features, got {}",
                self.n_features,
                row.len()
            )));
        }
        if let Some(idx) = row.iter().position(|v| !v.is_finite()) {
            return Err(Error::classification(format!(
                "feature {idx} is not finite ({})",
                row[idx]
            )));
        }
        Ok(())
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Mean decrease in weighted Gini impurity per feature, summing to 1
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}

struct Split {
    feature: usize,
    threshold: f64,
    /// Sum of child weights times child impurities
    children_impurity: f64,
}

struct TreeBuilder<'a> {
    rows: &'a [&'a [f64]],
    labels: &'a [usize],
    class_weights: Vec<f64>,
    n_classes: usize,
    n_features: usize,
    max_features: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
}

impl TreeBuilder<'_> {
    fn grow(
        &self,
        indices: &[usize],
        depth: usize,
        rng: &mut StdRng,
        importances: &mut [f64],
    ) -> TreeNode {
        let totals = self.class_totals(indices);
        let total_weight: f64 = totals.iter().sum();
        let impurity = gini(totals.iter().copied(), total_weight);

        let depth_reached = self.max_depth.is_some_and(|max| depth >= max);
        if depth_reached || indices.len() < self.min_samples_split || impurity <= 0.0 {
            return leaf(&totals, total_weight);
        }

        let Some(split) = self.best_split(indices, &totals, total_weight, rng) else {
            return leaf(&totals, total_weight);
        };

        let decrease = total_weight * impurity - split.children_impurity;
        if decrease <= MIN_IMPURITY_DECREASE {
            return leaf(&totals, total_weight);
        }
        importances[split.feature] += decrease;

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| self.rows[i][split.feature] <= split.threshold);

        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.grow(&left, depth + 1, rng, importances)),
            right: Box::new(self.grow(&right, depth + 1, rng, importances)),
        }
    }

    /// Search a random subset of features; keep drawing past the subset only
    /// while no valid split has been found.
    fn best_split(
        &self,
        indices: &[usize],
        totals: &[f64],
        total_weight: f64,
        rng: &mut StdRng,
    ) -> Option<Split> {
        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(rng);

        let mut best: Option<Split> = None;
        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.max_features && best.is_some() {
                break;
            }
            if let Some(candidate) = self.best_split_on(feature, indices, totals, total_weight) {
                if best
                    .as_ref()
                    .map_or(true, |b| candidate.children_impurity < b.children_impurity)
                {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn best_split_on(
        &self,
        feature: usize,
        indices: &[usize],
        totals: &[f64],
        total_weight: f64,
    ) -> Option<Split> {
        let mut order = indices.to_vec();
        order.sort_by(|&a, &b| self.rows[a][feature].total_cmp(&self.rows[b][feature]));

        let mut left = vec![0.0; self.n_classes];
        let mut left_weight = 0.0;
        let mut best: Option<Split> = None;

        for pos in 0..order.len().saturating_sub(1) {
            let sample = order[pos];
            let weight = self.class_weights[self.labels[sample]];
            left[self.labels[sample]] += weight;
            left_weight += weight;

            let current = self.rows[sample][feature];
            let next = self.rows[order[pos + 1]][feature];
            if next <= current {
                continue;
            }

            let right_weight = total_weight - left_weight;
            if left_weight <= 0.0 || right_weight <= 0.0 {
                continue;
            }

            let left_gini = gini(left.iter().copied(), left_weight);
            let right_gini = gini(
                totals.iter().zip(&left).map(|(t, l)| t - l),
                right_weight,
            );
            let children_impurity = left_weight * left_gini + right_weight * right_gini;

            if best
                .as_ref()
                .map_or(true, |b| children_impurity < b.children_impurity)
            {
                let mut threshold = current + (next - current) / 2.0;
                if threshold >= next {
                    threshold = current;
                }
                best = Some(Split {
                    feature,
                    threshold,
                    children_impurity,
                });
            }
        }
        best
    }

    fn class_totals(&self, indices: &[usize]) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_classes];
        for &i in indices {
            totals[self.labels[i]] += self.class_weights[self.labels[i]];
        }
        totals
    }
}

fn leaf(totals: &[f64], total_weight: f64) -> TreeNode {
    let distribution = if total_weight > 0.0 {
        totals.iter().map(|t| t / total_weight).collect()
    } else {
        vec![1.0 / totals.len() as f64; totals.len()]
    };
    TreeNode::Leaf { distribution }
}

/// Gini impurity `1 - sum(p_i^2)` over weighted class counts
fn gini(counts: impl Iterator<Item = f64>, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts.map(|c| (c / total) * (c / total)).sum::<f64>()
}

fn normalize(values: &mut [f64]) {
    let sum: f64 = values.iter().sum();
    if sum > 0.0 {
        for v in values.iter_mut() {
            *v /= sum;
        }
    }
}

/// Index of the largest value; ties resolve to the lowest index
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (idx, &value) in values.iter().enumerate().skip(1) {
        if value > values[best] {
            best = idx;
        }
    }
    best
}
