//! Feature vector construction.
//!
//! Trained models consume features positionally, so the column order here is
//! part of the artifact contract and must never change independently of the
//! training pipeline.

use crate::error::{Error, Result};
use crate::types::MetricRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of model input features
pub const FEATURE_COUNT: usize = 5;

/// Feature names in model column order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "avg_score",
    "time_spent",
    "completion_rate",
    "topic_diversity",
    "recent_improvement",
];

/// Fixed-order numeric feature tuple
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        self.0
    }

    /// Look up a feature by name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.0[idx])
    }

    pub fn avg_score(&self) -> f64 {
        self.0[0]
    }

    pub fn time_spent(&self) -> f64 {
        self.0[1]
    }

    pub fn completion_rate(&self) -> f64 {
        self.0[2]
    }

    pub fn topic_diversity(&self) -> f64 {
        self.0[3]
    }

    pub fn recent_improvement(&self) -> f64 {
        self.0[4]
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl From<&MetricRecord> for FeatureVector {
    fn from(record: &MetricRecord) -> Self {
        build(record)
    }
}

/// Build the model input vector from a metric record.
///
/// Values pass through unchanged; inference applies no clamping.
pub fn build(record: &MetricRecord) -> FeatureVector {
    FeatureVector([
        record.avg_score,
        record.time_spent,
        record.completion_rate,
        record.topic_diversity,
        record.recent_improvement,
    ])
}

/// Decode a metric record from a raw JSON request body.
///
/// Absent fields default to zero and unknown keys are ignored. A present
/// field that is not a JSON number is rejected.
pub fn record_from_json(value: &Value) -> Result<MetricRecord> {
    let object = value.as_object().ok_or_else(|| {
        Error::analysis(format!(
            "request body must be a JSON object, got {}",
            json_kind(value)
        ))
    })?;

    let mut values = [0.0; FEATURE_COUNT];
    for (slot, name) in values.iter_mut().zip(FEATURE_NAMES) {
        if let Some(raw) = object.get(name) {
            *slot = raw.as_f64().ok_or_else(|| {
                Error::analysis(format!(
                    "field '{name}' must be a number, got {}",
                    json_kind(raw)
                ))
            })?;
        }
    }

    let [avg_score, time_spent, completion_rate, topic_diversity, recent_improvement] = values;
    Ok(MetricRecord {
        avg_score,
        time_spent,
        completion_rate,
        topic_diversity,
        recent_improvement,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
