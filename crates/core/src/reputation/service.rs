//! Reputation aggregation rules.

use super::types::{Achievements, ProfileStats, ReadingLevel, MIN_RATINGS_FOR_LEADERBOARD};

/// Stateless reputation service.
pub struct ReputationService;

impl ReputationService {
    /// Arithmetic mean of received scores, 0.0 when none exist.
    #[must_use]
    pub fn average_rating(scores: &[i16]) -> f64 {
        if scores.is_empty() {
            return 0.0;
        }
        let sum: i64 = scores.iter().map(|&s| i64::from(s)).sum();
        sum as f64 / scores.len() as f64
    }

    /// Whether a user has received enough ratings to rank.
    #[must_use]
    pub fn qualifies_for_leaderboard(rating_count: u64) -> bool {
        rating_count >= MIN_RATINGS_FOR_LEADERBOARD
    }

    /// Level for a completed-loan count.
    #[must_use]
    pub fn reading_level(completed_loans: u64) -> ReadingLevel {
        ReadingLevel::from_completed(completed_loans)
    }

    /// Full achievement evaluation.
    #[must_use]
    pub fn achievements(stats: ProfileStats) -> Achievements {
        Achievements::from_stats(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_empty() {
        assert_eq!(ReputationService::average_rating(&[]), 0.0);
    }

    #[test]
    fn test_average() {
        assert!((ReputationService::average_rating(&[4, 5, 3]) - 4.0).abs() < f64::EPSILON);
        assert!((ReputationService::average_rating(&[1, 2]) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_leaderboard_threshold() {
        assert!(!ReputationService::qualifies_for_leaderboard(0));
        assert!(!ReputationService::qualifies_for_leaderboard(2));
        assert!(ReputationService::qualifies_for_leaderboard(3));
        assert!(ReputationService::qualifies_for_leaderboard(40));
    }
}
