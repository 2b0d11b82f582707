//! Hold-out evaluation metrics

use serde::{Deserialize, Serialize};
use skillscope_core::{Error, Result};
use std::fmt;

/// Fraction of predictions equal to the true label
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Precision, recall and F1 for one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Unweighted or support-weighted averages across classes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

/// Per-class metrics with accuracy and macro/weighted averages.
///
/// Ratios with a zero denominator are reported as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub support: usize,
}

impl ClassificationReport {
    /// Build a report; `labels[i]` names class index `i`
    pub fn compute(y_true: &[usize], y_pred: &[usize], labels: &[&str]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(Error::training(format!(
                "{} true labels but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }
        let n_classes = labels.len();
        if let Some(&bad) = y_true.iter().chain(y_pred).find(|&&c| c >= n_classes) {
            return Err(Error::training(format!(
                "class index {bad} outside 0..{n_classes}"
            )));
        }

        let mut true_positive = vec![0usize; n_classes];
        let mut predicted = vec![0usize; n_classes];
        let mut actual = vec![0usize; n_classes];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            actual[t] += 1;
            predicted[p] += 1;
            if t == p {
                true_positive[t] += 1;
            }
        }

        let classes: Vec<ClassMetrics> = labels
            .iter()
            .enumerate()
            .map(|(c, label)| {
                let precision = ratio(true_positive[c], predicted[c]);
                let recall = ratio(true_positive[c], actual[c]);
                let f1_score = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label: label.to_string(),
                    precision,
                    recall,
                    f1_score,
                    support: actual[c],
                }
            })
            .collect();

        let support = y_true.len();
        let macro_avg = average(&classes, |_| 1.0);
        let weighted_avg = average(&classes, |m| m.support as f64);

        Ok(Self {
            classes,
            accuracy: accuracy(y_true, y_pred),
            macro_avg,
            weighted_avg,
            support,
        })
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for m in &self.classes {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label, m.precision, m.recall, m.f1_score, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.support
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1_score, self.support
            )?;
        }
        Ok(())
    }
}

/// One feature's share of the total impurity decrease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Pair names with importances, most important first
pub fn ranked_importances(names: &[&str], importances: &[f64]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = names
        .iter()
        .zip(importances)
        .map(|(name, &importance)| FeatureImportance {
            feature: name.to_string(),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn average(classes: &[ClassMetrics], weight: impl Fn(&ClassMetrics) -> f64) -> AverageMetrics {
    let total: f64 = classes.iter().map(&weight).sum();
    if total == 0.0 {
        return AverageMetrics {
            precision: 0.0,
            recall: 0.0,
            f1_score: 0.0,
        };
    }
    let weighted = |value: fn(&ClassMetrics) -> f64| {
        classes.iter().map(|m| weight(m) * value(m)).sum::<f64>() / total
    };
    AverageMetrics {
        precision: weighted(|m| m.precision),
        recall: weighted(|m| m.recall),
        f1_score: weighted(|m| m.f1_score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [&str; 3] = ["Beginner", "Intermediate", "Advanced"];

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_accuracy() {
        assert!(close(accuracy(&[0, 1, 2, 2], &[0, 1, 1, 2]), 0.75));
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_report_per_class_metrics() {
        let y_true = [0, 0, 1, 1, 2, 2];
        let y_pred = [0, 1, 1, 1, 2, 0];
        let report = ClassificationReport::compute(&y_true, &y_pred, &LABELS).unwrap();

        // Beginner: predicted twice, one right; two actual, one found
        assert!(close(report.classes[0].precision, 0.5));
        assert!(close(report.classes[0].recall, 0.5));
        // Intermediate: predicted three times, two right
        assert!(close(report.classes[1].precision, 2.0 / 3.0));
        assert!(close(report.classes[1].recall, 1.0));
        assert!(close(report.classes[1].f1_score, 0.8));
        // Advanced: one prediction, right
        assert!(close(report.classes[2].precision, 1.0));
        assert!(close(report.classes[2].recall, 0.5));

        assert_eq!(report.support, 6);
        assert!(close(report.accuracy, 4.0 / 6.0));
        assert!(close(report.macro_avg.recall, (0.5 + 1.0 + 0.5) / 3.0));
    }

    #[test]
    fn test_unpredicted_class_scores_zero() {
        let report = ClassificationReport::compute(&[0, 1, 2], &[0, 0, 0], &LABELS).unwrap();
        assert_eq!(report.classes[2].precision, 0.0);
        assert_eq!(report.classes[2].f1_score, 0.0);
        assert_eq!(report.classes[2].support, 1);
    }

    #[test]
    fn test_report_rejects_bad_input() {
        assert!(ClassificationReport::compute(&[0, 1], &[0], &LABELS).is_err());
        assert!(ClassificationReport::compute(&[0, 5], &[0, 1], &LABELS).is_err());
    }

    #[test]
    fn test_report_renders_every_class() {
        let report = ClassificationReport::compute(&[0, 1, 2], &[0, 1, 2], &LABELS).unwrap();
        let text = report.to_string();
        for label in LABELS {
            assert!(text.contains(label));
        }
        assert!(text.contains("macro avg"));
    }

    #[test]
    fn test_importances_sorted_descending() {
        let ranked = ranked_importances(&["a", "b", "c"], &[0.2, 0.5, 0.3]);
        let order: Vec<&str> = ranked.iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(order, ["b", "c", "a"]);
    }
}
