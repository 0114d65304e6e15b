//! Reputation types.

use serde::{Deserialize, Serialize};

/// Ratings a user must have received before appearing on a leaderboard.
pub const MIN_RATINGS_FOR_LEADERBOARD: u64 = 3;

/// Reading level derived from the count of completed loans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingLevel {
    /// 0 to 5 completed loans.
    Novice,
    /// 6 to 15 completed loans.
    Applied,
    /// 16 to 30 completed loans.
    Advanced,
    /// 31 or more completed loans.
    Master,
}

impl ReadingLevel {
    /// Level for a given count of completed loans.
    #[must_use]
    pub fn from_completed(completed_loans: u64) -> Self {
        match completed_loans {
            0..=5 => Self::Novice,
            6..=15 => Self::Applied,
            16..=30 => Self::Advanced,
            _ => Self::Master,
        }
    }

    /// Display label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Novice => "novice",
            Self::Applied => "applied",
            Self::Advanced => "advanced",
            Self::Master => "master",
        }
    }
}

/// Activity counters an achievement evaluation reads from storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileStats {
    /// Completed loans as borrower.
    pub completed_loans: u64,
    /// Books donated to the pool.
    pub donations: u64,
    /// Current credit balance.
    pub balance: i32,
    /// Returns made on or before the due date.
    pub punctual_returns: u64,
    /// Days since the account was created.
    pub member_days: i64,
}

/// Fixed achievement set, each independently earned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievements {
    /// Completed at least one loan.
    pub first_loan: bool,
    /// Completed 5 loans.
    pub reader_5: bool,
    /// Completed 10 loans.
    pub reader_10: bool,
    /// Completed 25 loans.
    pub reader_25: bool,
    /// Completed 50 loans.
    pub reader_50: bool,
    /// Donated at least one book.
    pub first_donation: bool,
    /// Donated 5 books.
    pub donor_5: bool,
    /// Donated 10 books.
    pub donor_10: bool,
    /// Donated 20 books.
    pub donor_gold: bool,
    /// Balance of 100 credits or more.
    pub saver: bool,
    /// Balance of 500 credits or more.
    pub high_roller: bool,
    /// 10 or more punctual returns.
    pub punctual: bool,
    /// Member for a year or more.
    pub veteran: bool,
}

impl Achievements {
    /// Evaluate the full set against current counters.
    #[must_use]
    pub fn from_stats(stats: ProfileStats) -> Self {
        Self {
            first_loan: stats.completed_loans >= 1,
            reader_5: stats.completed_loans >= 5,
            reader_10: stats.completed_loans >= 10,
            reader_25: stats.completed_loans >= 25,
            reader_50: stats.completed_loans >= 50,
            first_donation: stats.donations >= 1,
            donor_5: stats.donations >= 5,
            donor_10: stats.donations >= 10,
            donor_gold: stats.donations >= 20,
            saver: stats.balance >= 100,
            high_roller: stats.balance >= 500,
            punctual: stats.punctual_returns >= 10,
            veteran: stats.member_days >= 365,
        }
    }

    /// Number of achievements earned.
    #[must_use]
    pub fn earned(&self) -> u32 {
        [
            self.first_loan,
            self.reader_5,
            self.reader_10,
            self.reader_25,
            self.reader_50,
            self.first_donation,
            self.donor_5,
            self.donor_10,
            self.donor_gold,
            self.saver,
            self.high_roller,
            self.punctual,
            self.veteran,
        ]
        .iter()
        .filter(|&&earned| earned)
        .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_level_boundaries() {
        assert_eq!(ReadingLevel::from_completed(0), ReadingLevel::Novice);
        assert_eq!(ReadingLevel::from_completed(5), ReadingLevel::Novice);
        assert_eq!(ReadingLevel::from_completed(6), ReadingLevel::Applied);
        assert_eq!(ReadingLevel::from_completed(15), ReadingLevel::Applied);
        assert_eq!(ReadingLevel::from_completed(16), ReadingLevel::Advanced);
        assert_eq!(ReadingLevel::from_completed(30), ReadingLevel::Advanced);
        assert_eq!(ReadingLevel::from_completed(31), ReadingLevel::Master);
        assert_eq!(ReadingLevel::from_completed(500), ReadingLevel::Master);
    }

    #[test]
    fn test_achievements_cumulative_tiers() {
        let stats = ProfileStats {
            completed_loans: 25,
            ..Default::default()
        };
        let a = Achievements::from_stats(stats);
        assert!(a.first_loan && a.reader_5 && a.reader_10 && a.reader_25);
        assert!(!a.reader_50);
    }

    #[test]
    fn test_achievements_balance_and_tenure() {
        let stats = ProfileStats {
            balance: 500,
            punctual_returns: 10,
            member_days: 400,
            ..Default::default()
        };
        let a = Achievements::from_stats(stats);
        assert!(a.saver && a.high_roller && a.punctual && a.veteran);
        assert_eq!(a.earned(), 4);
    }

    #[test]
    fn test_donor_tiers() {
        let a = Achievements::from_stats(ProfileStats {
            donations: 19,
            ..Default::default()
        });
        assert!(a.first_donation && a.donor_5 && a.donor_10);
        assert!(!a.donor_gold);

        let a = Achievements::from_stats(ProfileStats {
            donations: 20,
            ..Default::default()
        });
        assert!(a.donor_gold);
        assert_eq!(a.earned(), 4);
    }

    #[test]
    fn test_fresh_account_earns_nothing() {
        assert_eq!(Achievements::from_stats(ProfileStats::default()).earned(), 0);
    }
}
