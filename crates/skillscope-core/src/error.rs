//! Error types for SkillScope

use std::path::PathBuf;

/// Result type alias using SkillScope's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for SkillScope operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No model artifact exists at the configured location
    #[error("model artifact not found at {}", .0.display())]
    ArtifactNotFound(PathBuf),

    /// The artifact exists but could not be decoded or is incompatible
    #[error("artifact error: {0}")]
    Artifact(String),

    /// The learned model rejected a feature vector
    #[error("classification error: {0}")]
    Classification(String),

    /// Request decoding or orchestration failure
    #[error("analysis error: {0}")]
    Analysis(String),

    /// Offline training failure
    #[error("training error: {0}")]
    Training(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new artifact error
    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }

    /// Create a new classification error
    pub fn classification(msg: impl Into<String>) -> Self {
        Self::Classification(msg.into())
    }

    /// Create a new analysis error
    pub fn analysis(msg: impl Into<String>) -> Self {
        Self::Analysis(msg.into())
    }

    /// Create a new training error
    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short, stable label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ArtifactNotFound(_) => "artifact_not_found",
            Self::Artifact(_) => "artifact",
            Self::Classification(_) => "classification",
            Self::Analysis(_) => "analysis",
            Self::Training(_) => "training",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}
