//! Aggregation of raw quiz attempts into a metric record.

use crate::types::MetricRecord;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Number of topics in the quiz catalog; topic diversity is relative to it
pub const TOPIC_CATALOG_SIZE: usize = 8;

/// Attempts older than this many days are ignored by [`ProgressSummary::from_recent`]
pub const RECENT_WINDOW_DAYS: i64 = 30;

/// Topics averaging below this score are reported as weak
pub const WEAK_TOPIC_THRESHOLD: f64 = 70.0;

/// Topics averaging at or above this score are reported as strong
pub const STRONG_TOPIC_THRESHOLD: f64 = 80.0;

const TOPIC_HIGHLIGHT_LIMIT: usize = 3;

/// A single completed quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub topic: String,
    pub score: f64,
    pub time_spent: f64,
    pub completed_at: DateTime<Utc>,
}

/// Rounded statistics reported alongside a progress analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub total_quizzes: usize,
    pub avg_score: i64,
    pub total_time_spent: f64,
    pub avg_time_per_quiz: i64,
    /// Percent
    pub completion_rate: i64,
    /// Percent
    pub topic_diversity: i64,
    pub recent_improvement: i64,
}

/// Per-topic score aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicPerformance {
    pub count: usize,
    pub total_score: f64,
    pub avg_score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicScore {
    pub topic: String,
    pub avg_score: i64,
}

/// Everything derived from a learner's attempt history
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSummary {
    /// Model input derived from the attempts
    pub record: MetricRecord,
    pub stats: ProgressStats,
    pub topic_performance: BTreeMap<String, TopicPerformance>,
    /// Up to three topics below 70, weakest first
    pub weak_topics: Vec<TopicScore>,
    /// Up to three topics at or above 80, strongest first
    pub strong_topics: Vec<TopicScore>,
}

impl ProgressSummary {
    /// Summarize attempts completed within the recent window ending at `now`.
    pub fn from_recent(attempts: &[QuizAttempt], now: DateTime<Utc>) -> Option<Self> {
        let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
        let recent: Vec<QuizAttempt> = attempts
            .iter()
            .filter(|a| a.completed_at >= cutoff)
            .cloned()
            .collect();

        debug!(
            total = attempts.len(),
            recent = recent.len(),
            "Filtered attempts to recent window"
        );
        Self::from_attempts(&recent)
    }

    /// Summarize a set of attempts. Returns `None` when there are none.
    pub fn from_attempts(attempts: &[QuizAttempt]) -> Option<Self> {
        if attempts.is_empty() {
            return None;
        }

        let mut ordered: Vec<&QuizAttempt> = attempts.iter().collect();
        ordered.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));

        let total = ordered.len();
        let avg_score = round_half_up(mean(ordered.iter().map(|a| a.score)));
        let total_time_spent: f64 = ordered.iter().map(|a| a.time_spent).sum();
        let avg_time_per_quiz = round_half_up(total_time_spent / total as f64);

        // Every submitted attempt counts as completed.
        let completion_rate = 1.0;

        let topic_performance = topic_breakdown(&ordered);
        let topic_diversity = topic_performance.len() as f64 / TOPIC_CATALOG_SIZE as f64;

        // Newest first: the first floor(n/2) attempts are the recent half.
        let mid = total / 2;
        let (newer, older) = ordered.split_at(mid);
        let recent_improvement = if newer.is_empty() || older.is_empty() {
            0.0
        } else {
            mean(newer.iter().map(|a| a.score)) - mean(older.iter().map(|a| a.score))
        };

        let record = MetricRecord {
            avg_score: avg_score as f64,
            time_spent: avg_time_per_quiz as f64,
            completion_rate,
            topic_diversity,
            recent_improvement,
        };

        let stats = ProgressStats {
            total_quizzes: total,
            avg_score,
            total_time_spent,
            avg_time_per_quiz,
            completion_rate: round_half_up(completion_rate * 100.0),
            topic_diversity: round_half_up(topic_diversity * 100.0),
            recent_improvement: round_half_up(recent_improvement),
        };

        // Ties keep first-seen order, newest attempt first.
        let seen = first_seen_topics(&ordered);
        let highlights = |keep: fn(f64) -> bool| -> Vec<TopicScore> {
            seen.iter()
                .filter_map(|topic| topic_performance.get_key_value(*topic))
                .filter(|(_, perf)| keep(perf.avg_score as f64))
                .map(|(topic, perf)| TopicScore {
                    topic: topic.clone(),
                    avg_score: perf.avg_score,
                })
                .collect()
        };

        let mut weak_topics = highlights(|avg| avg < WEAK_TOPIC_THRESHOLD);
        weak_topics.sort_by_key(|t| t.avg_score);
        weak_topics.truncate(TOPIC_HIGHLIGHT_LIMIT);

        let mut strong_topics = highlights(|avg| avg >= STRONG_TOPIC_THRESHOLD);
        strong_topics.sort_by_key(|t| std::cmp::Reverse(t.avg_score));
        strong_topics.truncate(TOPIC_HIGHLIGHT_LIMIT);

        Some(Self {
            record,
            stats,
            topic_performance,
            weak_topics,
            strong_topics,
        })
    }
}

fn first_seen_topics<'a>(attempts: &[&'a QuizAttempt]) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for &attempt in attempts {
        if !seen.contains(&attempt.topic.as_str()) {
            seen.push(&attempt.topic);
        }
    }
    seen
}

fn topic_breakdown(attempts: &[&QuizAttempt]) -> BTreeMap<String, TopicPerformance> {
    let mut topics: BTreeMap<String, TopicPerformance> = BTreeMap::new();
    for attempt in attempts {
        let entry = topics
            .entry(attempt.topic.clone())
            .or_insert(TopicPerformance {
                count: 0,
                total_score: 0.0,
                avg_score: 0,
            });
        entry.count += 1;
        entry.total_score += attempt.score;
    }

    for perf in topics.values_mut() {
        perf.avg_score = round_half_up(perf.total_score / perf.count as f64);
    }
    topics
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Round to the nearest integer, with halves rounded toward positive infinity
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn attempt(topic: &str, score: f64, time_spent: f64, day: u32) -> QuizAttempt {
        QuizAttempt {
            topic: topic.to_string(),
            score,
            time_spent,
            completed_at: Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_no_attempts_yields_none() {
        assert!(ProgressSummary::from_attempts(&[]).is_none());
    }

    #[test]
    fn test_record_aggregation() {
        // Chronological: older attempts scored lower than newer ones.
        let attempts = vec![
            attempt("algebra", 50.0, 20.0, 1),
            attempt("geometry", 60.0, 30.0, 2),
            attempt("algebra", 80.0, 40.0, 3),
            attempt("calculus", 90.0, 50.0, 4),
        ];

        let summary = ProgressSummary::from_attempts(&attempts).unwrap();
        assert_eq!(summary.record.avg_score, 70.0);
        assert_eq!(summary.record.time_spent, 35.0);
        assert_eq!(summary.record.completion_rate, 1.0);
        assert_eq!(summary.record.topic_diversity, 3.0 / 8.0);
        // Newer half (90, 80) averages 85, older half (60, 50) averages 55.
        assert_eq!(summary.record.recent_improvement, 30.0);

        assert_eq!(summary.stats.total_quizzes, 4);
        assert_eq!(summary.stats.total_time_spent, 140.0);
        assert_eq!(summary.stats.completion_rate, 100);
        assert_eq!(summary.stats.topic_diversity, 38);
    }

    #[test]
    fn test_single_attempt_has_no_improvement() {
        let summary = ProgressSummary::from_attempts(&[attempt("algebra", 77.0, 12.0, 5)]).unwrap();
        assert_eq!(summary.record.recent_improvement, 0.0);
        assert_eq!(summary.stats.avg_score, 77);
    }

    #[test]
    fn test_odd_count_splits_older_half_larger() {
        let attempts = vec![
            attempt("a", 40.0, 10.0, 1),
            attempt("a", 50.0, 10.0, 2),
            attempt("a", 60.0, 10.0, 3),
        ];
        // Newer half is [60], older half is [50, 40].
        let summary = ProgressSummary::from_attempts(&attempts).unwrap();
        assert_eq!(summary.record.recent_improvement, 15.0);
    }

    #[test]
    fn test_weak_and_strong_topics() {
        let attempts = vec![
            attempt("a", 40.0, 10.0, 1),
            attempt("b", 65.0, 10.0, 2),
            attempt("c", 69.0, 10.0, 3),
            attempt("d", 10.0, 10.0, 4),
            attempt("e", 95.0, 10.0, 5),
            attempt("f", 80.0, 10.0, 6),
            attempt("g", 85.0, 10.0, 7),
            attempt("h", 99.0, 10.0, 8),
            attempt("i", 75.0, 10.0, 9),
        ];

        let summary = ProgressSummary::from_attempts(&attempts).unwrap();
        let weak: Vec<&str> = summary.weak_topics.iter().map(|t| t.topic.as_str()).collect();
        let strong: Vec<&str> = summary.strong_topics.iter().map(|t| t.topic.as_str()).collect();

        assert_eq!(weak, vec!["d", "a", "b"]);
        assert_eq!(strong, vec!["h", "e", "g"]);
        assert_eq!(summary.topic_performance.len(), 9);
        // More topics than the catalog size is passed through unclamped.
        assert!(summary.record.topic_diversity > 1.0);
    }

    #[test]
    fn test_tied_topics_keep_newest_first_order() {
        let attempts = vec![
            attempt("zoology", 90.0, 10.0, 1),
            attempt("algebra", 50.0, 10.0, 2),
            attempt("music", 90.0, 10.0, 3),
            attempt("biology", 50.0, 10.0, 4),
        ];

        let summary = ProgressSummary::from_attempts(&attempts).unwrap();
        let weak: Vec<&str> = summary.weak_topics.iter().map(|t| t.topic.as_str()).collect();
        let strong: Vec<&str> = summary.strong_topics.iter().map(|t| t.topic.as_str()).collect();

        assert_eq!(weak, vec!["biology", "algebra"]);
        assert_eq!(strong, vec!["music", "zoology"]);
    }

    #[test]
    fn test_recent_window_filters_old_attempts() {
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap();
        let mut old = attempt("history", 10.0, 10.0, 1);
        old.completed_at = now - Duration::days(45);
        let attempts = vec![old, attempt("math", 90.0, 10.0, 20)];

        let summary = ProgressSummary::from_recent(&attempts, now).unwrap();
        assert_eq!(summary.stats.total_quizzes, 1);
        assert_eq!(summary.record.avg_score, 90.0);

        let stale_only = vec![attempts[0].clone()];
        assert!(ProgressSummary::from_recent(&stale_only, now).is_none());
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(37.5), 38);
    }
}
