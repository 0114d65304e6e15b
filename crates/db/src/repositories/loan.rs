//! Loan repository: renewals, returns and listings.
//!
//! Renew and return serialize on the book row, and on the user row
//! whenever credits move, so each lifecycle step commits with its
//! ledger posting or not at all.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use shelfshare_core::credit::CreditError as CreditRuleError;
use shelfshare_core::loan::{
    BookCondition, EffectiveLoanState, LoanError, LoanService, LoanState, RenewalActor,
    RENEWAL_COST,
};
use shelfshare_core::reservation::{ReservationService, ReservationState};
use shelfshare_shared::types::{PageRequest, PageResponse};

use crate::entities::{books, loans, reservations, users};

use super::credit::{CreditError, CreditRepository, PostCreditInput};
use super::is_contention;

/// Error types for loan operations.
#[derive(Debug, thiserror::Error)]
pub enum LoanRepoError {
    /// Book not found.
    #[error("book not found: {0}")]
    BookNotFound(Uuid),

    /// User not found.
    #[error("user not found: {0}")]
    UserNotFound(Uuid),

    /// The return condition string is not a known grade.
    #[error("unknown book condition: {0}")]
    UnknownCondition(String),

    /// Only the borrower or an administrator may renew a loan.
    #[error("only the borrower may renew this loan")]
    NotBorrower,

    /// A loan rule was violated.
    #[error(transparent)]
    Rule(#[from] LoanError),

    /// The ledger posting attached to this operation failed.
    #[error(transparent)]
    Ledger(#[from] CreditRuleError),

    /// Lock or serialization conflict, retryable.
    #[error("concurrent loan update, please retry")]
    Contention,

    /// Database error.
    #[error("database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for LoanRepoError {
    fn from(err: DbErr) -> Self {
        if is_contention(&err) {
            Self::Contention
        } else {
            Self::Database(err)
        }
    }
}

impl From<CreditError> for LoanRepoError {
    fn from(err: CreditError) -> Self {
        match err {
            CreditError::UserNotFound(id) => Self::UserNotFound(id),
            CreditError::Rule(rule) => Self::Ledger(rule),
            CreditError::Contention => Self::Contention,
            CreditError::Database(db) => Self::Database(db),
        }
    }
}

impl LoanRepoError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BookNotFound(_) => "BOOK_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::UnknownCondition(_) => "UNKNOWN_CONDITION",
            Self::NotBorrower => "NOT_BORROWER",
            Self::Rule(err) => err.error_code(),
            Self::Ledger(err) => err.error_code(),
            Self::Contention => "CONTENTION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::BookNotFound(_) | Self::UserNotFound(_) => 404,
            Self::UnknownCondition(_) => 400,
            Self::NotBorrower => 403,
            Self::Rule(err) => err.http_status_code(),
            Self::Ledger(err) => err.http_status_code(),
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

/// Input for a renewal.
#[derive(Debug, Clone)]
pub struct RenewLoanInput {
    /// Loan to renew.
    pub loan_id: Uuid,
    /// Who asked for the renewal.
    pub actor_id: Uuid,
}

/// Input for processing a return.
#[derive(Debug, Clone)]
pub struct ProcessReturnInput {
    /// Loan being returned.
    pub loan_id: Uuid,
    /// Administrator receiving the book.
    pub admin_id: Uuid,
    /// Grade assigned at the return desk.
    pub condition: String,
    /// Free-text notes when the book came back damaged.
    pub damage_notes: Option<String>,
}

/// A loan with its observation-time state.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoanView {
    /// The stored row.
    #[serde(flatten)]
    pub loan: loans::Model,
    /// `active`, `overdue` or `completed` as of now.
    pub effective_state: EffectiveLoanState,
}

/// Loan repository.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    db: DatabaseConnection,
}

impl LoanRepository {
    /// Creates a new loan repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Renews a loan, charging students the renewal fee.
    ///
    /// # Errors
    ///
    /// Returns an error when the loan is completed, the renewal cap is
    /// reached, the book has waiting reservations, or a student actor
    /// cannot afford the fee.
    pub async fn renew(&self, input: RenewLoanInput) -> Result<loans::Model, LoanRepoError> {
        let txn = self.db.begin().await?;

        let loan = loans::Entity::find_by_id(input.loan_id)
            .one(&txn)
            .await?
            .ok_or(LoanError::LoanNotFound(input.loan_id))?;

        // Serialize against enqueue/cancel on the same book.
        books::Entity::find_by_id(loan.book_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LoanRepoError::BookNotFound(loan.book_id))?;

        let actor = users::Entity::find_by_id(input.actor_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LoanRepoError::UserNotFound(input.actor_id))?;

        let waiting = reservations::Entity::find()
            .filter(reservations::Column::BookId.eq(loan.book_id))
            .filter(reservations::Column::Status.eq(ReservationState::Active.as_str()))
            .count(&txn)
            .await?;

        let renewal_actor = if actor.role == "admin" {
            RenewalActor::Admin
        } else if actor.id == loan.borrower_id {
            RenewalActor::Student {
                balance: actor.credit_balance,
            }
        } else {
            return Err(LoanRepoError::NotBorrower);
        };

        let state = LoanState::parse(&loan.status).unwrap_or(LoanState::Active);
        let charge = LoanService::validate_renew(state, loan.renewals, waiting, renewal_actor)?;

        if let Some(cost) = charge {
            CreditRepository::post_in(
                &txn,
                &PostCreditInput {
                    user_id: loan.borrower_id,
                    amount: -cost,
                    reason: format!("Loan renewal fee ({RENEWAL_COST} credits)"),
                    loan_id: Some(loan.id),
                    acting_admin: None,
                },
            )
            .await?;
        }

        let now = Utc::now().into();
        let new_due = LoanService::renewed_due_date(loan.due_date);
        let renewals = loan.renewals + 1;

        let mut renewed: loans::ActiveModel = loan.into();
        renewed.due_date = Set(new_due);
        renewed.renewals = Set(renewals);
        renewed.updated_at = Set(now);
        let updated = renewed.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(loan_id = %updated.id, renewals, "loan renewed");
        Ok(updated)
    }

    /// Processes a return: closes the loan, reshelves the book, posts the
    /// credit delta and notifies the queue head.
    ///
    /// # Errors
    ///
    /// Returns an error when the loan is already completed, the condition
    /// grade is unknown, or the database operation fails.
    pub async fn process_return(
        &self,
        input: ProcessReturnInput,
    ) -> Result<LoanView, LoanRepoError> {
        let condition = BookCondition::parse(&input.condition)
            .ok_or_else(|| LoanRepoError::UnknownCondition(input.condition.clone()))?;

        let txn = self.db.begin().await?;

        let loan = loans::Entity::find_by_id(input.loan_id)
            .one(&txn)
            .await?
            .ok_or(LoanError::LoanNotFound(input.loan_id))?;

        let book = books::Entity::find_by_id(loan.book_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LoanRepoError::BookNotFound(loan.book_id))?;

        let state = LoanState::parse(&loan.status).unwrap_or(LoanState::Active);
        LoanService::validate_return(state)?;

        let now = Utc::now();
        let today = now.date_naive();
        let now_tz = now.into();

        let delta = LoanService::return_credit_delta(loan.due_date, today, condition);
        if delta != 0 {
            CreditRepository::post_in(
                &txn,
                &PostCreditInput {
                    user_id: loan.borrower_id,
                    amount: delta,
                    reason: LoanService::return_reason(loan.due_date, today, condition),
                    loan_id: Some(loan.id),
                    acting_admin: Some(input.admin_id),
                },
            )
            .await?;
        }

        Self::bump_completed_counter(&txn, loan.borrower_id).await?;

        let mut reshelved: books::ActiveModel = book.into();
        reshelved.available = Set(true);
        if condition.degrades_book() {
            reshelved.condition = Set(condition.as_str().to_owned());
        }
        reshelved.updated_at = Set(now_tz);
        reshelved.update(&txn).await?;

        let book_id = loan.book_id;
        let due_date = loan.due_date;
        let mut completed: loans::ActiveModel = loan.into();
        completed.status = Set(LoanState::Completed.as_str().to_owned());
        completed.returned_at = Set(Some(now_tz));
        completed.returned_by = Set(Some(input.admin_id));
        completed.return_condition = Set(Some(condition.as_str().to_owned()));
        completed.damage_notes = Set(input.damage_notes.clone());
        completed.updated_at = Set(now_tz);
        let updated = completed.update(&txn).await?;

        Self::promote_queue_head(&txn, book_id).await?;

        txn.commit().await?;

        tracing::info!(loan_id = %updated.id, delta, "loan returned");
        Ok(LoanView {
            effective_state: LoanService::effective_state(LoanState::Completed, due_date, today),
            loan: updated,
        })
    }

    /// Lists all loans, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self, page: &PageRequest) -> Result<PageResponse<LoanView>, LoanRepoError> {
        let total = loans::Entity::find().count(&self.db).await?;
        let rows = loans::Entity::find()
            .order_by_desc(loans::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(Self::into_views(rows), page, total))
    }

    /// Lists one user's loans, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the query fails.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> Result<PageResponse<LoanView>, LoanRepoError> {
        users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(LoanRepoError::UserNotFound(user_id))?;

        let base = loans::Entity::find().filter(loans::Column::BorrowerId.eq(user_id));
        let total = base.clone().count(&self.db).await?;
        let rows = base
            .order_by_desc(loans::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(Self::into_views(rows), page, total))
    }

    fn into_views(rows: Vec<loans::Model>) -> Vec<LoanView> {
        let today = Utc::now().date_naive();
        rows.into_iter()
            .map(|loan| {
                let state = LoanState::parse(&loan.status).unwrap_or(LoanState::Active);
                LoanView {
                    effective_state: LoanService::effective_state(state, loan.due_date, today),
                    loan,
                }
            })
            .collect()
    }

    async fn bump_completed_counter(
        txn: &DatabaseTransaction,
        borrower_id: Uuid,
    ) -> Result<(), LoanRepoError> {
        // The borrower row is already locked when a credit delta was
        // posted; a zero-delta return locks it here instead.
        let borrower = users::Entity::find_by_id(borrower_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(LoanRepoError::UserNotFound(borrower_id))?;

        let completed = borrower.completed_loans + 1;
        let mut account: users::ActiveModel = borrower.into();
        account.completed_loans = Set(completed);
        account.updated_at = Set(Utc::now().into());
        account.update(txn).await?;
        Ok(())
    }

    /// Moves the lowest-position active reservation to notified with a
    /// fresh confirmation window. No-op when the queue is empty.
    async fn promote_queue_head(
        txn: &DatabaseTransaction,
        book_id: Uuid,
    ) -> Result<(), LoanRepoError> {
        let head = reservations::Entity::find()
            .filter(reservations::Column::BookId.eq(book_id))
            .filter(reservations::Column::Status.eq(ReservationState::Active.as_str()))
            .order_by_asc(reservations::Column::Position)
            .one(txn)
            .await?;

        let Some(head) = head else {
            return Ok(());
        };

        let now = Utc::now();
        let head_id = head.id;
        let mut notified: reservations::ActiveModel = head.into();
        notified.status = Set(ReservationState::Notified.as_str().to_owned());
        notified.notified_at = Set(Some(now.into()));
        notified.expires_at = Set(Some(ReservationService::notification_expiry(now).into()));
        notified.updated_at = Set(now.into());
        notified.update(txn).await?;

        tracing::info!(reservation_id = %head_id, book_id = %book_id, "queue head notified");
        Ok(())
    }
}
