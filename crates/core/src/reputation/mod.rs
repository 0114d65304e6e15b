//! Reputation: reading levels, achievements and rating aggregates.

mod service;
mod types;

pub use service::ReputationService;
pub use types::{Achievements, ProfileStats, ReadingLevel, MIN_RATINGS_FOR_LEADERBOARD};
