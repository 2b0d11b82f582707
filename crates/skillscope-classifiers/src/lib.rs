//! SkillScope Classifiers
//!
//! Performance-tier classification and recommendation selection.
//!
//! Two interchangeable strategies are available:
//! - Learned: a random forest loaded from a JSON model artifact (high confidence)
//! - Rule-based: fixed score and diversity thresholds (medium confidence)
//!
//! The strategy is selected once at startup from artifact availability and
//! shared read-only by every request through [`AnalysisService`].

pub mod analysis;
pub mod artifact;
pub mod classifier;
pub mod forest;
pub mod learned;
pub mod recommendation;
pub mod rule_based;

pub use analysis::{AnalysisService, ProgressAnalysis, NOT_ENOUGH_DATA_RECOMMENDATION};
pub use artifact::{FileArtifactLoader, ModelArtifact, ARTIFACT_FORMAT_VERSION};
pub use classifier::{ArtifactLoader, ClassifierStrategy, Predictor, TierClassifier};
pub use forest::{ClassWeight, ForestParams, RandomForest};
pub use learned::LearnedClassifier;
pub use recommendation::{select_key, RecommendationKey, RecommendationTable};
pub use rule_based::RuleBasedClassifier;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analysis::AnalysisService;
    pub use crate::artifact::{FileArtifactLoader, ModelArtifact};
    pub use crate::classifier::{ArtifactLoader, ClassifierStrategy, Predictor, TierClassifier};
    pub use crate::recommendation::RecommendationTable;
}
