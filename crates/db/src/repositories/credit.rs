//! Credit ledger repository.
//!
//! Postings are serialized per user by a `FOR UPDATE` lock on the user
//! row: the balance update, the status re-derivation and the log append
//! commit together or not at all.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use shelfshare_core::credit::{CreditError as CreditRuleError, CreditService, ReplayEntry};
use shelfshare_shared::types::{PageRequest, PageResponse};

use crate::entities::{credit_transactions, users};

use super::is_contention;

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum CreditError {
    /// User not found.
    #[error("user not found: {0}")]
    UserNotFound(Uuid),

    /// A posting rule was violated.
    #[error(transparent)]
    Rule(#[from] CreditRuleError),

    /// Lock or serialization conflict, retryable.
    #[error("concurrent ledger update, please retry")]
    Contention,

    /// Database error.
    #[error("database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for CreditError {
    fn from(err: DbErr) -> Self {
        if is_contention(&err) {
            Self::Contention
        } else {
            Self::Database(err)
        }
    }
}

impl CreditError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::Rule(err) => err.error_code(),
            Self::Contention => "CONTENTION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::UserNotFound(_) => 404,
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

/// Input for posting a ledger transaction.
#[derive(Debug, Clone)]
pub struct PostCreditInput {
    /// Account to post against.
    pub user_id: Uuid,
    /// Signed amount, never zero.
    pub amount: i32,
    /// Human-readable reason, kept in the log.
    pub reason: String,
    /// Loan that caused the posting, if any.
    pub loan_id: Option<Uuid>,
    /// Administrator acting on behalf of the system, if any.
    pub acting_admin: Option<Uuid>,
}

/// Credit ledger repository.
#[derive(Debug, Clone)]
pub struct CreditRepository {
    db: DatabaseConnection,
}

impl CreditRepository {
    /// Creates a new credit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts one ledger transaction in its own database transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist, the amount is zero,
    /// or the database operation fails.
    pub async fn post(
        &self,
        input: PostCreditInput,
    ) -> Result<credit_transactions::Model, CreditError> {
        let txn = self.db.begin().await?;
        let record = Self::post_in(&txn, &input).await?;
        txn.commit().await?;
        Ok(record)
    }

    /// Posts a ledger transaction inside an already-open transaction.
    ///
    /// Used by the loan and request repositories so a posting commits
    /// together with the state change that caused it.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist, the amount is zero,
    /// or the database operation fails.
    pub(crate) async fn post_in(
        txn: &DatabaseTransaction,
        input: &PostCreditInput,
    ) -> Result<credit_transactions::Model, CreditError> {
        let user = users::Entity::find_by_id(input.user_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(CreditError::UserNotFound(input.user_id))?;

        let outcome = CreditService::prepare_post(user.credit_balance, input.amount)?;
        let now = Utc::now().into();

        let record = credit_transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(input.user_id),
            amount: Set(outcome.amount),
            kind: Set(outcome.kind.as_str().to_owned()),
            balance_before: Set(outcome.balance_before),
            balance_after: Set(outcome.balance_after),
            reason: Set(input.reason.clone()),
            loan_id: Set(input.loan_id),
            acting_admin: Set(input.acting_admin),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;

        let mut account: users::ActiveModel = user.into();
        account.credit_balance = Set(outcome.balance_after);
        account.account_status = Set(outcome.new_status.as_str().to_owned());
        account.updated_at = Set(now);
        account.update(txn).await?;

        Ok(record)
    }

    /// Lists a user's postings, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the query fails.
    pub async fn history(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> Result<PageResponse<credit_transactions::Model>, CreditError> {
        ensure_user_exists(&self.db, user_id).await?;

        let total = credit_transactions::Entity::find()
            .filter(credit_transactions::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;

        let records = credit_transactions::Entity::find()
            .filter(credit_transactions::Column::UserId.eq(user_id))
            .order_by_desc(credit_transactions::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(records, page, total))
    }

    /// Replays a user's full log from zero and checks it against the
    /// stored balance.
    ///
    /// # Errors
    ///
    /// Returns a rule error when the chain is broken or inconsistent,
    /// and a database error when the rows cannot be read.
    pub async fn verify_ledger(&self, user_id: Uuid) -> Result<i32, CreditError> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(CreditError::UserNotFound(user_id))?;

        let entries: Vec<ReplayEntry> = credit_transactions::Entity::find()
            .filter(credit_transactions::Column::UserId.eq(user_id))
            .order_by_asc(credit_transactions::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| ReplayEntry {
                amount: row.amount,
                balance_before: row.balance_before,
                balance_after: row.balance_after,
            })
            .collect();

        let replayed = CreditService::replay(&entries)?;
        if replayed != user.credit_balance {
            return Err(CreditRuleError::BrokenChain {
                index: entries.len(),
                expected: user.credit_balance,
                actual: replayed,
            }
            .into());
        }
        Ok(replayed)
    }
}

/// Looks a user up without locking, for read paths.
pub(crate) async fn ensure_user_exists(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<users::Model, CreditError> {
    users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(CreditError::UserNotFound(user_id))
}
