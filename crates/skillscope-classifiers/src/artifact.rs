//! Model artifact persistence and loading

use crate::classifier::{ArtifactLoader, Predictor};
use crate::forest::RandomForest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillscope_core::{Error, FeatureVector, PerformanceTier, Result, FEATURE_NAMES};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Bumped whenever the on-disk layout changes incompatibly
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// A trained forest together with the feature and class contract it was fit on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub classes: Vec<String>,
    pub trained_at: DateTime<Utc>,
    forest: RandomForest,
}

impl ModelArtifact {
    /// Wrap a forest trained on the standard feature order and tier classes
    pub fn new(forest: RandomForest) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            classes: PerformanceTier::ALL
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
            trained_at: Utc::now(),
            forest,
        }
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Write the artifact as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec(self)?;
        fs::write(path, json)?;
        info!("Saved model artifact to {}", path.display());
        Ok(())
    }

    /// Read and validate an artifact.
    ///
    /// A missing file yields [`Error::ArtifactNotFound`]; anything unreadable
    /// or incompatible yields [`Error::Artifact`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::ArtifactNotFound(path.to_path_buf()));
            }
            Err(e) => {
                return Err(Error::artifact(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        let artifact: Self = serde_json::from_slice(&bytes).map_err(|e| {
            Error::artifact(format!("failed to decode {}: {e}", path.display()))
        })?;
        artifact.validate()?;

        debug!(
            trees = artifact.forest.trees().len(),
            trained_at = %artifact.trained_at,
            "Model artifact validated"
        );
        Ok(artifact)
    }

    /// Check the artifact matches the inference-time feature and class contract
    pub fn validate(&self) -> Result<()> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(Error::artifact(format!(
                "unsupported artifact format version {} (expected {})",
                self.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        if !self.feature_names.iter().map(String::as_str).eq(FEATURE_NAMES) {
            return Err(Error::artifact(format!(
                "artifact feature order {:?} does not match {:?}",
                self.feature_names, FEATURE_NAMES
            )));
        }

        let tiers = PerformanceTier::ALL.iter().map(|t| t.as_str());
        if !self.classes.iter().map(String::as_str).eq(tiers) {
            return Err(Error::artifact(format!(
                "artifact classes {:?} do not match the performance tiers",
                self.classes
            )));
        }

        if self.forest.n_features() != self.feature_names.len() {
            return Err(Error::artifact(format!(
                "forest expects {} features but artifact lists {}",
                self.forest.n_features(),
                self.feature_names.len()
            )));
        }
        if self.forest.n_classes() != self.classes.len() {
            return Err(Error::artifact(format!(
                "forest has {} classes but artifact lists {}",
                self.forest.n_classes(),
                self.classes.len()
            )));
        }

        self.forest.validate()
    }
}

impl Predictor for ModelArtifact {
    fn predict(&self, features: &FeatureVector) -> Result<usize> {
        self.forest.predict(features.as_slice())
    }

    fn name(&self) -> &str {
        "random-forest"
    }
}

/// Loads a [`ModelArtifact`] from a JSON file
#[derive(Debug, Clone)]
pub struct FileArtifactLoader {
    path: PathBuf,
}

impl FileArtifactLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArtifactLoader for FileArtifactLoader {
    fn load(&self) -> Result<Arc<dyn Predictor>> {
        let artifact = ModelArtifact::load(&self.path)?;
        Ok(Arc::new(artifact))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
