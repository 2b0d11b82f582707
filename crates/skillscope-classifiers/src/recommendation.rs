//! Recommendation selection.
//!
//! Each tier has two ordered conditions and a default. The first matching
//! condition wins, so exactly one message is chosen per input.

use skillscope_core::PerformanceTier;
use tracing::debug;

/// Condition keys of the recommendation table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecommendationKey {
    LowScore,
    LowDiversity,
    Improving,
    Stagnant,
    HighDiversity,
    Specialized,
    Default,
}

impl RecommendationKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LowScore => "low_score",
            Self::LowDiversity => "low_diversity",
            Self::Improving => "improving",
            Self::Stagnant => "stagnant",
            Self::HighDiversity => "high_diversity",
            Self::Specialized => "specialized",
            Self::Default => "default",
        }
    }
}

/// Pick the condition key for a tier from the secondary signals
pub fn select_key(
    tier: PerformanceTier,
    avg_score: f64,
    topic_diversity: f64,
    recent_improvement: f64,
) -> RecommendationKey {
    match tier {
        PerformanceTier::Beginner => {
            if avg_score < 50.0 {
                RecommendationKey::LowScore
            } else if topic_diversity < 0.3 {
                RecommendationKey::LowDiversity
            } else {
                RecommendationKey::Default
            }
        }
        PerformanceTier::Intermediate => {
            if recent_improvement > 10.0 {
                RecommendationKey::Improving
            } else if recent_improvement.abs() < 5.0 {
                RecommendationKey::Stagnant
            } else {
                RecommendationKey::Default
            }
        }
        PerformanceTier::Advanced => {
            if topic_diversity >= 0.6 {
                RecommendationKey::HighDiversity
            } else if topic_diversity < 0.4 {
                RecommendationKey::Specialized
            } else {
                RecommendationKey::Default
            }
        }
    }
}

#[derive(Debug, Clone)]
struct TierMessages {
    conditions: Vec<(RecommendationKey, &'static str)>,
    default: &'static str,
}

impl TierMessages {
    fn get(&self, key: RecommendationKey) -> &'static str {
        self.conditions
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, message)| *message)
            .unwrap_or(self.default)
    }
}

/// Immutable per-tier message table
#[derive(Debug, Clone)]
pub struct RecommendationTable {
    beginner: TierMessages,
    intermediate: TierMessages,
    advanced: TierMessages,
}

impl RecommendationTable {
    /// The built-in message table
    pub fn standard() -> Self {
        Self {
            beginner: TierMessages {
                conditions: vec![
                    (
                        RecommendationKey::LowScore,
                        "Focus on building strong fundamentals. Review basic concepts and practice regularly.",
                    ),
                    (
                        RecommendationKey::LowDiversity,
                        "Try exploring different topics to broaden your knowledge base.",
                    ),
                ],
                default: "Keep practicing! Consistency is key to improvement. Start with easier topics and gradually increase difficulty.",
            },
            intermediate: TierMessages {
                conditions: vec![
                    (
                        RecommendationKey::Improving,
                        "Great progress! Keep up the momentum and tackle more challenging topics.",
                    ),
                    (
                        RecommendationKey::Stagnant,
                        "You're doing well overall. Try varying your study topics or increasing difficulty to keep improving.",
                    ),
                ],
                default: "You have a solid foundation. Focus on mastering advanced concepts in your weaker areas.",
            },
            advanced: TierMessages {
                conditions: vec![
                    (
                        RecommendationKey::HighDiversity,
                        "Excellent work! Consider mentoring others or contributing to learning communities.",
                    ),
                    (
                        RecommendationKey::Specialized,
                        "You excel in your focus areas. Consider exploring related advanced topics or teaching others.",
                    ),
                ],
                default: "Outstanding performance! Challenge yourself with expert-level content or real-world projects.",
            },
        }
    }

    fn tier(&self, tier: PerformanceTier) -> &TierMessages {
        match tier {
            PerformanceTier::Beginner => &self.beginner,
            PerformanceTier::Intermediate => &self.intermediate,
            PerformanceTier::Advanced => &self.advanced,
        }
    }

    /// Message for a tier and condition key; unknown keys map to the tier default
    pub fn message(&self, tier: PerformanceTier, key: RecommendationKey) -> &'static str {
        self.tier(tier).get(key)
    }

    /// Choose the recommendation for a classified learner
    pub fn select(
        &self,
        tier: PerformanceTier,
        avg_score: f64,
        topic_diversity: f64,
        recent_improvement: f64,
    ) -> &'static str {
        let key = select_key(tier, avg_score, topic_diversity, recent_improvement);
        self.message(tier, key)
    }

    /// Like [`select`](Self::select) for a tier given by label.
    ///
    /// Labels outside the known tiers use the Beginner table.
    pub fn select_by_label(
        &self,
        label: &str,
        avg_score: f64,
        topic_diversity: f64,
        recent_improvement: f64,
    ) -> &'static str {
        let tier = label.parse().unwrap_or_else(|_| {
            debug!("Unknown tier label '{}', using Beginner recommendations", label);
            PerformanceTier::Beginner
        });
        self.select(tier, avg_score, topic_diversity, recent_improvement)
    }

    /// Every message in the table, in tier order
    pub fn messages(&self) -> Vec<&'static str> {
        PerformanceTier::ALL
            .iter()
            .flat_map(|&tier| {
                let messages = self.tier(tier);
                messages
                    .conditions
                    .iter()
                    .map(|(_, m)| *m)
                    .chain(std::iter::once(messages.default))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

impl Default for RecommendationTable {
    fn default() -> Self {
        Self::standard()
    }
}
