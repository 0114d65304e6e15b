//! Rating types.

use serde::{Deserialize, Serialize};

/// Lowest accepted score.
pub const MIN_SCORE: i16 = 1;
/// Highest accepted score.
pub const MAX_SCORE: i16 = 5;

/// What a score grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingCategory {
    /// Physical state and accuracy of the book listing.
    Book,
    /// Responsiveness of the donor during the loan.
    Communication,
}

impl RatingCategory {
    /// Storage string for this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Communication => "communication",
        }
    }

    /// Parse a storage string back into a category.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "book" => Some(Self::Book),
            "communication" => Some(Self::Communication),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip() {
        for category in [RatingCategory::Book, RatingCategory::Communication] {
            assert_eq!(RatingCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(RatingCategory::parse("overall"), None);
    }
}
