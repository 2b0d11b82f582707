//! End-to-end tests from a fitted forest on disk to an analysis result

use serde_json::json;
use skillscope_classifiers::{
    AnalysisService, ArtifactLoader, FileArtifactLoader, ForestParams, ModelArtifact,
    RandomForest,
};
use skillscope_core::{Confidence, FeatureVector, PerformanceTier};
use tempfile::TempDir;

/// Learners whose score and diversity grow with their tier
fn tiered_rows() -> (Vec<FeatureVector>, Vec<usize>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for i in 0..90 {
        let tier = i % 3;
        let jitter = (i / 3) as f64 * 0.3;
        x.push(FeatureVector::new([
            45.0 + tier as f64 * 22.0 + jitter,
            30.0 + tier as f64 * 10.0,
            0.6 + tier as f64 * 0.1,
            0.2 + tier as f64 * 0.25,
            -5.0 + tier as f64 * 8.0,
        ]));
        y.push(tier);
    }
    (x, y)
}

fn write_artifact(dir: &TempDir) -> std::path::PathBuf {
    let (x, y) = tiered_rows();
    let params = ForestParams::default().with_n_estimators(15).with_seed(7);
    let forest = RandomForest::fit(params, &x, &y, PerformanceTier::COUNT).unwrap();

    let path = dir.path().join("model.json");
    ModelArtifact::new(forest).save(&path).unwrap();
    path
}

#[test]
fn test_saved_artifact_drives_learned_analysis() {
    let dir = TempDir::new().unwrap();
    let path = write_artifact(&dir);

    let service = AnalysisService::from_loader(&FileArtifactLoader::new(&path));
    assert!(service.model_loaded());
    assert_eq!(service.strategy().name(), "random-forest");

    let strong = service
        .analyze_json(&json!({
            "avg_score": 90,
            "time_spent": 50,
            "completion_rate": 0.8,
            "topic_diversity": 0.7,
            "recent_improvement": 11
        }))
        .unwrap();
    assert_eq!(strong.tier, PerformanceTier::Advanced);
    assert_eq!(strong.confidence, Confidence::High);

    let weak = service
        .analyze_json(&json!({
            "avg_score": 46,
            "time_spent": 30,
            "completion_rate": 0.6,
            "topic_diversity": 0.2,
            "recent_improvement": -5
        }))
        .unwrap();
    assert_eq!(weak.tier, PerformanceTier::Beginner);
    assert_eq!(weak.confidence, Confidence::High);
}

#[test]
fn test_missing_artifact_falls_back_to_rules() {
    let dir = TempDir::new().unwrap();
    let loader = FileArtifactLoader::new(dir.path().join("model.json"));

    let service = AnalysisService::from_loader(&loader);
    assert!(!service.model_loaded());
    assert_eq!(service.strategy().name(), "rule-based");

    let result = service.analyze_json(&json!({})).unwrap();
    assert_eq!(result.confidence, Confidence::Medium);
}

#[test]
fn test_truncated_artifact_falls_back_to_rules() {
    let dir = TempDir::new().unwrap();
    let path = write_artifact(&dir);
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    let loader = FileArtifactLoader::new(&path);
    assert!(loader.load().is_err());

    let service = AnalysisService::from_loader(&loader);
    assert!(!service.model_loaded());
}

#[test]
fn test_every_prediction_is_a_known_tier() {
    let dir = TempDir::new().unwrap();
    let path = write_artifact(&dir);
    let service = AnalysisService::from_loader(&FileArtifactLoader::new(&path));

    for score in (0..=100).step_by(10) {
        for diversity in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let result = service
                .analyze_json(&json!({"avg_score": score, "topic_diversity": diversity}))
                .unwrap();
            assert!(PerformanceTier::ALL.contains(&result.tier));
        }
    }
}
