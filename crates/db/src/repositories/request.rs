//! Loan request repository: submission and approval arbitration.
//!
//! Approval takes `FOR UPDATE` locks on the book row and on the
//! requester's user row, then re-checks eligibility on the locked
//! snapshot. Standing violations reject the request in the same
//! transaction; stale-state failures roll everything back and leave
//! the request pending.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use shelfshare_core::arbitration::{
    ArbitrationError, ArbitrationService, Decision, EligibilityInput, RequestState,
};
use shelfshare_core::loan::{LoanError, LoanService, LoanState};
use shelfshare_shared::types::{PageRequest, PageResponse};

use crate::entities::{books, loan_requests, loans, users};

use super::is_contention;

/// Error types for request operations.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Book not found.
    #[error("book not found: {0}")]
    BookNotFound(Uuid),

    /// User not found.
    #[error("user not found: {0}")]
    UserNotFound(Uuid),

    /// A pending request by this user for this book already exists.
    #[error("a pending request for this book already exists")]
    DuplicateRequest,

    /// An arbitration check failed.
    #[error(transparent)]
    Arbitration(#[from] ArbitrationError),

    /// A loan rule was violated at submission.
    #[error(transparent)]
    Loan(#[from] LoanError),

    /// Lock or serialization conflict, retryable.
    #[error("concurrent request processing, please retry")]
    Contention,

    /// Database error.
    #[error("database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for RequestError {
    fn from(err: DbErr) -> Self {
        if is_contention(&err) {
            Self::Contention
        } else {
            Self::Database(err)
        }
    }
}

impl RequestError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BookNotFound(_) => "BOOK_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::DuplicateRequest => "DUPLICATE_REQUEST",
            Self::Arbitration(err) => err.error_code(),
            Self::Loan(err) => err.error_code(),
            Self::Contention => "CONTENTION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::BookNotFound(_) | Self::UserNotFound(_) => 404,
            Self::DuplicateRequest => 422,
            Self::Arbitration(err) => err.http_status_code(),
            Self::Loan(err) => err.http_status_code(),
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

/// Result of a successful approval.
#[derive(Debug, Clone)]
pub struct ApproveOutcome {
    /// The accepted request.
    pub request: loan_requests::Model,
    /// The loan opened for it.
    pub loan: loans::Model,
}

/// Loan request repository.
#[derive(Debug, Clone)]
pub struct RequestRepository {
    db: DatabaseConnection,
}

impl RequestRepository {
    /// Creates a new request repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Submits a loan request for a book.
    ///
    /// # Errors
    ///
    /// Returns an error if the book or requester does not exist, the book
    /// is unavailable or already on loan, or a pending request already
    /// exists.
    pub async fn create(
        &self,
        book_id: Uuid,
        requester_id: Uuid,
    ) -> Result<loan_requests::Model, RequestError> {
        let txn = self.db.begin().await?;

        let book = books::Entity::find_by_id(book_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RequestError::BookNotFound(book_id))?;

        users::Entity::find_by_id(requester_id)
            .one(&txn)
            .await?
            .ok_or(RequestError::UserNotFound(requester_id))?;

        let book_on_loan = loans::Entity::find()
            .filter(loans::Column::BookId.eq(book_id))
            .filter(loans::Column::Status.ne(LoanState::Completed.as_str()))
            .count(&txn)
            .await?
            > 0;
        LoanService::validate_open(book.available, book_on_loan)?;

        let duplicate = loan_requests::Entity::find()
            .filter(loan_requests::Column::BookId.eq(book_id))
            .filter(loan_requests::Column::RequesterId.eq(requester_id))
            .filter(loan_requests::Column::Status.eq(RequestState::Pending.as_str()))
            .count(&txn)
            .await?;
        if duplicate > 0 {
            return Err(RequestError::DuplicateRequest);
        }

        let now = Utc::now().into();
        let request = loan_requests::ActiveModel {
            id: Set(Uuid::new_v4()),
            book_id: Set(book_id),
            requester_id: Set(requester_id),
            status: Set(RequestState::Pending.as_str().to_owned()),
            rejection_reason: Set(None),
            processed_by: Set(None),
            processed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(request_id = %request.id, book_id = %book_id, "loan request submitted");
        Ok(request)
    }

    /// Lists pending requests, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_pending(
        &self,
        page: &PageRequest,
    ) -> Result<PageResponse<loan_requests::Model>, RequestError> {
        let base = loan_requests::Entity::find()
            .filter(loan_requests::Column::Status.eq(RequestState::Pending.as_str()));

        let total = base.clone().count(&self.db).await?;
        let requests = base
            .order_by_asc(loan_requests::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(requests, page, total))
    }

    /// Approves a pending request, opening a loan on success.
    ///
    /// When the requester's standing fails arbitration, the request is
    /// rejected with the generated reason and any status demotion is
    /// persisted, all in the same transaction. Stale-state denials leave
    /// the request untouched.
    ///
    /// # Errors
    ///
    /// Returns an error for missing rows, failed arbitration checks, or
    /// database failures.
    pub async fn approve(
        &self,
        request_id: Uuid,
        admin_id: Uuid,
    ) -> Result<ApproveOutcome, RequestError> {
        let txn = self.db.begin().await?;

        let request = loan_requests::Entity::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or(RequestError::Arbitration(ArbitrationError::RequestNotFound(
                request_id,
            )))?;

        // Lock order: book first, then user, everywhere a call takes both.
        let book = books::Entity::find_by_id(request.book_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RequestError::BookNotFound(request.book_id))?;

        let requester = users::Entity::find_by_id(request.requester_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RequestError::UserNotFound(request.requester_id))?;

        let book_on_loan = loans::Entity::find()
            .filter(loans::Column::BookId.eq(book.id))
            .filter(loans::Column::Status.ne(LoanState::Completed.as_str()))
            .count(&txn)
            .await?
            > 0;

        let open_loans_held = loans::Entity::find()
            .filter(loans::Column::BorrowerId.eq(requester.id))
            .filter(loans::Column::Status.ne(LoanState::Completed.as_str()))
            .count(&txn)
            .await?;

        let status = shelfshare_core::credit::AccountStatus::parse(&requester.account_status)
            .unwrap_or(shelfshare_core::credit::AccountStatus::Active);

        let input = EligibilityInput {
            request_pending: RequestState::parse(&request.status) == Some(RequestState::Pending),
            book_on_loan,
            book_available: book.available,
            requester_status: status,
            balance: requester.credit_balance,
            open_loans_held,
        };

        match ArbitrationService::evaluate(input) {
            Decision::Approve => {
                let outcome = Self::open_loan(&txn, request, book, admin_id).await?;
                txn.commit().await?;
                tracing::info!(
                    request_id = %outcome.request.id,
                    loan_id = %outcome.loan.id,
                    "loan request accepted"
                );
                Ok(outcome)
            }
            Decision::Deny { error, demote_to } if error.is_terminal() => {
                let now = Utc::now().into();

                if let Some(new_status) = demote_to {
                    let mut account: users::ActiveModel = requester.into();
                    account.account_status = Set(new_status.as_str().to_owned());
                    account.updated_at = Set(now);
                    account.update(&txn).await?;
                }

                let mut rejected: loan_requests::ActiveModel = request.into();
                rejected.status = Set(RequestState::Rejected.as_str().to_owned());
                rejected.rejection_reason = Set(Some(error.to_string()));
                rejected.processed_by = Set(Some(admin_id));
                rejected.processed_at = Set(Some(now));
                rejected.updated_at = Set(now);
                rejected.update(&txn).await?;

                txn.commit().await?;
                tracing::info!(request_id = %request_id, reason = %error, "loan request rejected by arbitration");
                Err(error.into())
            }
            // Stale state: drop the transaction, nothing persists.
            Decision::Deny { error, .. } => Err(error.into()),
        }
    }

    /// Rejects a pending request with an explicit reason.
    ///
    /// # Errors
    ///
    /// Returns an error when the reason is blank, the request is not
    /// pending, or the database operation fails.
    pub async fn reject(
        &self,
        request_id: Uuid,
        admin_id: Uuid,
        reason: &str,
    ) -> Result<loan_requests::Model, RequestError> {
        ArbitrationService::validate_reject(reason)?;

        let txn = self.db.begin().await?;

        let request = loan_requests::Entity::find_by_id(request_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RequestError::Arbitration(ArbitrationError::RequestNotFound(
                request_id,
            )))?;

        if RequestState::parse(&request.status) != Some(RequestState::Pending) {
            return Err(ArbitrationError::RequestNotPending.into());
        }

        let now = Utc::now().into();
        let mut rejected: loan_requests::ActiveModel = request.into();
        rejected.status = Set(RequestState::Rejected.as_str().to_owned());
        rejected.rejection_reason = Set(Some(reason.trim().to_owned()));
        rejected.processed_by = Set(Some(admin_id));
        rejected.processed_at = Set(Some(now));
        rejected.updated_at = Set(now);
        let updated = rejected.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(request_id = %request_id, "loan request rejected");
        Ok(updated)
    }

    /// Opens a loan for an accepted request.
    async fn open_loan(
        txn: &DatabaseTransaction,
        request: loan_requests::Model,
        book: books::Model,
        admin_id: Uuid,
    ) -> Result<ApproveOutcome, RequestError> {
        let now = Utc::now();
        let today = now.date_naive();
        let now_tz = now.into();

        let loan = loans::ActiveModel {
            id: Set(Uuid::new_v4()),
            book_id: Set(book.id),
            borrower_id: Set(request.requester_id),
            donor_id: Set(book.donor_id),
            request_id: Set(Some(request.id)),
            issued_by: Set(admin_id),
            returned_by: Set(None),
            status: Set(LoanState::Active.as_str().to_owned()),
            due_date: Set(LoanService::due_date(today)),
            renewals: Set(0),
            returned_at: Set(None),
            return_condition: Set(None),
            damage_notes: Set(None),
            created_at: Set(now_tz),
            updated_at: Set(now_tz),
        }
        .insert(txn)
        .await?;

        let mut shelved: books::ActiveModel = book.into();
        shelved.available = Set(false);
        shelved.updated_at = Set(now_tz);
        shelved.update(txn).await?;

        let mut accepted: loan_requests::ActiveModel = request.into();
        accepted.status = Set(RequestState::Accepted.as_str().to_owned());
        accepted.processed_by = Set(Some(admin_id));
        accepted.processed_at = Set(Some(now_tz));
        accepted.updated_at = Set(now_tz);
        let request = accepted.update(txn).await?;

        Ok(ApproveOutcome { request, loan })
    }
}
