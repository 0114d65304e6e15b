//! Reputation repository: profiles, book rating summaries, leaderboards.
//!
//! Everything here is a read-only derivation; aggregation runs in
//! process over fetched rows, which is comfortably within a campus
//! library's data volume.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use uuid::Uuid;

use shelfshare_core::loan::LoanState;
use shelfshare_core::rating::RatingCategory;
use shelfshare_core::reputation::{Achievements, ProfileStats, ReadingLevel, ReputationService};

use crate::entities::{books, loans, ratings, users};

use super::is_contention;

/// Error types for reputation reads.
#[derive(Debug, thiserror::Error)]
pub enum ReputationError {
    /// User not found.
    #[error("user not found: {0}")]
    UserNotFound(Uuid),

    /// Book not found.
    #[error("book not found: {0}")]
    BookNotFound(Uuid),

    /// Lock or serialization conflict, retryable.
    #[error("concurrent update, please retry")]
    Contention,

    /// Database error.
    #[error("database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for ReputationError {
    fn from(err: DbErr) -> Self {
        if is_contention(&err) {
            Self::Contention
        } else {
            Self::Database(err)
        }
    }
}

impl ReputationError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::BookNotFound(_) => "BOOK_NOT_FOUND",
            Self::Contention => "CONTENTION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::UserNotFound(_) | Self::BookNotFound(_) => 404,
            Self::Contention => 409,
            Self::Database(_) => 500,
        }
    }

    /// Whether the caller may retry the same call.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Contention)
    }
}

/// A user's derived reputation profile.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    /// Profile owner.
    pub user_id: Uuid,
    /// Display name.
    pub full_name: String,
    /// Current credit balance.
    pub credit_balance: i32,
    /// Stored account status.
    pub account_status: String,
    /// Completed loans as borrower.
    pub completed_loans: u64,
    /// Books donated.
    pub donations: u64,
    /// Derived reading level.
    pub reading_level: ReadingLevel,
    /// Average received communication rating, 0 when none.
    pub average_communication: f64,
    /// Average received book rating, 0 when none.
    pub average_book: f64,
    /// Ratings received across categories.
    pub ratings_received: u64,
    /// The fixed achievement set.
    pub achievements: Achievements,
}

/// Aggregate score summary for one book.
#[derive(Debug, Clone, Serialize)]
pub struct BookRatingSummary {
    /// The rated book.
    pub book_id: Uuid,
    /// Mean score across categories, 0 when unrated.
    pub average_score: f64,
    /// Ratings on record.
    pub rating_count: u64,
}

/// One leaderboard row.
#[derive(Debug, Clone, Serialize)]
pub struct RankEntry {
    /// Ranked user.
    pub user_id: Uuid,
    /// Display name.
    pub full_name: String,
    /// Count or average backing the rank; counts are whole numbers.
    pub score: f64,
}

/// The three leaderboards served by `/rankings`.
#[derive(Debug, Clone, Serialize)]
pub struct Leaderboards {
    /// Most books donated.
    pub top_donors: Vec<RankEntry>,
    /// Most loans completed.
    pub top_readers: Vec<RankEntry>,
    /// Best average communication rating, minimum 3 ratings received.
    pub top_reputation: Vec<RankEntry>,
}

const LEADERBOARD_SIZE: usize = 10;

/// Reputation repository.
#[derive(Debug, Clone)]
pub struct ReputationRepository {
    db: DatabaseConnection,
}

impl ReputationRepository {
    /// Creates a new reputation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Builds a user's full reputation profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or a query fails.
    pub async fn profile(&self, user_id: Uuid) -> Result<ProfileView, ReputationError> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(ReputationError::UserNotFound(user_id))?;

        let completed: Vec<loans::Model> = loans::Entity::find()
            .filter(loans::Column::BorrowerId.eq(user_id))
            .filter(loans::Column::Status.eq(LoanState::Completed.as_str()))
            .all(&self.db)
            .await?;

        let punctual_returns = completed
            .iter()
            .filter(|loan| {
                loan.returned_at
                    .is_some_and(|ts| ts.date_naive() <= loan.due_date)
            })
            .count() as u64;

        let donations = books::Entity::find()
            .filter(books::Column::DonorId.eq(user_id))
            .count(&self.db)
            .await?;

        let received: Vec<ratings::Model> = ratings::Entity::find()
            .filter(ratings::Column::RateeId.eq(user_id))
            .all(&self.db)
            .await?;

        let comm_scores: Vec<i16> = received
            .iter()
            .filter(|r| r.category == RatingCategory::Communication.as_str())
            .map(|r| r.score)
            .collect();
        let book_scores: Vec<i16> = received
            .iter()
            .filter(|r| r.category == RatingCategory::Book.as_str())
            .map(|r| r.score)
            .collect();

        let completed_loans = completed.len() as u64;
        let stats = ProfileStats {
            completed_loans,
            donations,
            balance: user.credit_balance,
            punctual_returns,
            member_days: (Utc::now() - user.created_at.with_timezone(&Utc)).num_days(),
        };

        Ok(ProfileView {
            user_id,
            full_name: user.full_name,
            credit_balance: user.credit_balance,
            account_status: user.account_status,
            completed_loans,
            donations,
            reading_level: ReputationService::reading_level(completed_loans),
            average_communication: ReputationService::average_rating(&comm_scores),
            average_book: ReputationService::average_rating(&book_scores),
            ratings_received: received.len() as u64,
            achievements: ReputationService::achievements(stats),
        })
    }

    /// Aggregate rating summary for one book.
    ///
    /// # Errors
    ///
    /// Returns an error if the book does not exist or a query fails.
    pub async fn book_summary(&self, book_id: Uuid) -> Result<BookRatingSummary, ReputationError> {
        books::Entity::find_by_id(book_id)
            .one(&self.db)
            .await?
            .ok_or(ReputationError::BookNotFound(book_id))?;

        let scores: Vec<i16> = ratings::Entity::find()
            .filter(ratings::Column::BookId.eq(book_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|r| r.score)
            .collect();

        Ok(BookRatingSummary {
            book_id,
            average_score: ReputationService::average_rating(&scores),
            rating_count: scores.len() as u64,
        })
    }

    /// Builds the three leaderboards.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn rankings(&self) -> Result<Leaderboards, ReputationError> {
        let top_readers: Vec<RankEntry> = users::Entity::find()
            .filter(users::Column::CompletedLoans.gt(0))
            .order_by_desc(users::Column::CompletedLoans)
            .limit(LEADERBOARD_SIZE as u64)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| RankEntry {
                user_id: u.id,
                full_name: u.full_name,
                score: f64::from(u.completed_loans),
            })
            .collect();

        let donor_ids: Vec<Option<Uuid>> = books::Entity::find()
            .select_only()
            .column(books::Column::DonorId)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut donation_counts: HashMap<Uuid, u64> = HashMap::new();
        for donor in donor_ids.into_iter().flatten() {
            *donation_counts.entry(donor).or_insert(0) += 1;
        }

        let comm_ratings: Vec<ratings::Model> = ratings::Entity::find()
            .filter(ratings::Column::Category.eq(RatingCategory::Communication.as_str()))
            .all(&self.db)
            .await?;

        let mut received: HashMap<Uuid, Vec<i16>> = HashMap::new();
        for rating in comm_ratings {
            received.entry(rating.ratee_id).or_default().push(rating.score);
        }

        let mut reputation: Vec<(Uuid, f64)> = received
            .into_iter()
            .filter(|(_, scores)| {
                ReputationService::qualifies_for_leaderboard(scores.len() as u64)
            })
            .map(|(user, scores)| (user, ReputationService::average_rating(&scores)))
            .collect();
        reputation.sort_by(|a, b| b.1.total_cmp(&a.1));
        reputation.truncate(LEADERBOARD_SIZE);

        let mut donors: Vec<(Uuid, u64)> = donation_counts.into_iter().collect();
        donors.sort_by(|a, b| b.1.cmp(&a.1));
        donors.truncate(LEADERBOARD_SIZE);

        let names = self
            .display_names(
                donors
                    .iter()
                    .map(|(id, _)| *id)
                    .chain(reputation.iter().map(|(id, _)| *id))
                    .collect(),
            )
            .await?;

        let top_donors = donors
            .into_iter()
            .map(|(user_id, count)| RankEntry {
                user_id,
                full_name: names.get(&user_id).cloned().unwrap_or_default(),
                score: count as f64,
            })
            .collect();

        let top_reputation = reputation
            .into_iter()
            .map(|(user_id, average)| RankEntry {
                user_id,
                full_name: names.get(&user_id).cloned().unwrap_or_default(),
                score: average,
            })
            .collect();

        Ok(Leaderboards {
            top_donors,
            top_readers,
            top_reputation,
        })
    }

    async fn display_names(
        &self,
        ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, String>, ReputationError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|u| (u.id, u.full_name)).collect())
    }
}
