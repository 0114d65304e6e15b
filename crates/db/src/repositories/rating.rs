//! Rating repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use shelfshare_core::loan::LoanState;
use shelfshare_core::rating::{RatingCategory, RatingError, RatingService};

use crate::entities::{loans, ratings};

use super::is_contention;

/// Error types for rating operations.
#[derive(Debug, thiserror::Error)]
pub enum RatingRepoError {
    /// The category string is not a known category.
    #[error("unknown rating category: {0}")]
    UnknownCategory(String),

    /// A rating rule was violated.
    #[error(transparent)]
    Rule(#[from] RatingError),

    /// Lock or serialization conflict, retryable.
    #[error("concurrent rating submission, please retry")]
    Contention,

    /// Database error.
    #[error("database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for RatingRepoError {
    fn from(err: DbErr) -> Self {
        if is_contention(&err) {
            Self::Contention
        } else {
            Self::Database(err)
        }
    }
}

impl RatingRepoError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCategory(_) => "UNKNOWN_CATEGORY",
            Self::Rule(err) => err.error_code(),
            Self::Contention => "CONTENTION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::UnknownCategory(_) => 400,
            Self::Rule(err) => err.http_status_code(),
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

/// Input for submitting a rating.
#[derive(Debug, Clone)]
pub struct SubmitRatingInput {
    /// Completed loan being rated.
    pub loan_id: Uuid,
    /// Who submits the score; must be the borrower.
    pub rater_id: Uuid,
    /// `book` or `communication`.
    pub category: String,
    /// 1 to 5 inclusive.
    pub score: i16,
    /// Optional free-text comment.
    pub comment: Option<String>,
}

/// Rating repository.
#[derive(Debug, Clone)]
pub struct RatingRepository {
    db: DatabaseConnection,
}

impl RatingRepository {
    /// Creates a new rating repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Submits a rating for a completed loan. The ratee is the loan's
    /// donor of record.
    ///
    /// # Errors
    ///
    /// Returns an error when the loan is missing or active, the rater is
    /// not the borrower, the score is out of range, the category was
    /// already rated, or the loan has no donor.
    pub async fn submit(&self, input: SubmitRatingInput) -> Result<ratings::Model, RatingRepoError> {
        let category = RatingCategory::parse(&input.category)
            .ok_or_else(|| RatingRepoError::UnknownCategory(input.category.clone()))?;

        let txn = self.db.begin().await?;

        let loan = loans::Entity::find_by_id(input.loan_id)
            .one(&txn)
            .await?
            .ok_or(RatingError::LoanNotFound(input.loan_id))?;

        let already_rated = ratings::Entity::find()
            .filter(ratings::Column::LoanId.eq(input.loan_id))
            .filter(ratings::Column::RaterId.eq(input.rater_id))
            .filter(ratings::Column::Category.eq(category.as_str()))
            .count(&txn)
            .await?
            > 0;

        let state = LoanState::parse(&loan.status).unwrap_or(LoanState::Active);
        let ratee_id = RatingService::validate_submission(
            input.score,
            state,
            loan.borrower_id,
            input.rater_id,
            already_rated,
            loan.donor_id,
        )?;

        let rating = ratings::ActiveModel {
            id: Set(Uuid::new_v4()),
            loan_id: Set(input.loan_id),
            book_id: Set(loan.book_id),
            rater_id: Set(input.rater_id),
            ratee_id: Set(ratee_id),
            category: Set(category.as_str().to_owned()),
            score: Set(input.score),
            comment: Set(input.comment.clone()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(rating_id = %rating.id, loan_id = %input.loan_id, "rating submitted");
        Ok(rating)
    }

    /// Lists a book's ratings, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn for_book(&self, book_id: Uuid) -> Result<Vec<ratings::Model>, RatingRepoError> {
        let rows = ratings::Entity::find()
            .filter(ratings::Column::BookId.eq(book_id))
            .order_by_desc(ratings::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows)
    }
}
