//! Reservation repository: enqueue, cancel, confirm and listings.
//!
//! All queue mutations serialize on the book row so positions stay
//! dense under concurrent enqueues and cancellations.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use shelfshare_core::arbitration::RequestState;
use shelfshare_core::credit::AccountStatus;
use shelfshare_core::reservation::{ConfirmOutcome, ReservationError, ReservationService, ReservationState};
use shelfshare_shared::types::{PageRequest, PageResponse};

use crate::entities::{books, loan_requests, reservations, users};

use super::is_contention;

/// Error types for reservation operations.
#[derive(Debug, thiserror::Error)]
pub enum ReservationRepoError {
    /// Book not found.
    #[error("book not found: {0}")]
    BookNotFound(Uuid),

    /// User not found.
    #[error("user not found: {0}")]
    UserNotFound(Uuid),

    /// Only the reservation's owner may act on it.
    #[error("reservation belongs to another user")]
    NotOwner,

    /// A queue rule was violated.
    #[error(transparent)]
    Rule(#[from] ReservationError),

    /// Lock or serialization conflict, retryable.
    #[error("concurrent queue update, please retry")]
    Contention,

    /// Database error.
    #[error("database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for ReservationRepoError {
    fn from(err: DbErr) -> Self {
        if is_contention(&err) {
            Self::Contention
        } else {
            Self::Database(err)
        }
    }
}

impl ReservationRepoError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BookNotFound(_) => "BOOK_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::NotOwner => "NOT_OWNER",
            Self::Rule(err) => err.error_code(),
            Self::Contention => "CONTENTION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::BookNotFound(_) | Self::UserNotFound(_) => 404,
            Self::NotOwner => 403,
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

/// Reservation repository.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    db: DatabaseConnection,
}

impl ReservationRepository {
    /// Creates a new reservation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Joins a book's waiting queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the book is available, the user already holds
    /// a live entry, or the account is restricted.
    pub async fn enqueue(
        &self,
        book_id: Uuid,
        user_id: Uuid,
    ) -> Result<reservations::Model, ReservationRepoError> {
        let txn = self.db.begin().await?;

        let book = books::Entity::find_by_id(book_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(ReservationRepoError::BookNotFound(book_id))?;

        let user = users::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or(ReservationRepoError::UserNotFound(user_id))?;

        let has_live = reservations::Entity::find()
            .filter(reservations::Column::BookId.eq(book_id))
            .filter(reservations::Column::UserId.eq(user_id))
            .filter(reservations::Column::Status.is_in(live_statuses()))
            .count(&txn)
            .await?
            > 0;

        let status = AccountStatus::parse(&user.account_status).unwrap_or(AccountStatus::Active);
        ReservationService::validate_enqueue(book.available, has_live, status)?;

        let active_count = reservations::Entity::find()
            .filter(reservations::Column::BookId.eq(book_id))
            .filter(reservations::Column::Status.eq(ReservationState::Active.as_str()))
            .count(&txn)
            .await?;

        let now = Utc::now().into();
        let entry = reservations::ActiveModel {
            id: Set(Uuid::new_v4()),
            book_id: Set(book_id),
            user_id: Set(user_id),
            status: Set(ReservationState::Active.as_str().to_owned()),
            position: Set(ReservationService::next_position(active_count)),
            notified_at: Set(None),
            expires_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(reservation_id = %entry.id, book_id = %book_id, position = entry.position, "reservation enqueued");
        Ok(entry)
    }

    /// Cancels a live reservation and closes the gap it leaves.
    ///
    /// # Errors
    ///
    /// Returns an error when the entry is missing, terminal, or owned by
    /// someone else.
    pub async fn cancel(
        &self,
        reservation_id: Uuid,
        user_id: Uuid,
    ) -> Result<reservations::Model, ReservationRepoError> {
        let txn = self.db.begin().await?;

        let entry = Self::find_locking_book(&txn, reservation_id).await?;
        if entry.user_id != user_id {
            return Err(ReservationRepoError::NotOwner);
        }

        let state = ReservationState::parse(&entry.status).unwrap_or(ReservationState::Active);
        ReservationService::validate_cancel(state)?;

        let now = Utc::now().into();

        // Active entries behind the leaver shift forward one place. This
        // also applies when a notified head cancels, closing its gap.
        Self::close_gap(&txn, entry.book_id, entry.position, now).await?;

        let mut cancelled: reservations::ActiveModel = entry.into();
        cancelled.status = Set(ReservationState::Cancelled.as_str().to_owned());
        cancelled.updated_at = Set(now);
        let updated = cancelled.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(reservation_id = %updated.id, "reservation cancelled");
        Ok(updated)
    }

    /// Confirms a notified reservation, converting it into a pending loan
    /// request. A lapsed window marks the entry expired instead.
    ///
    /// # Errors
    ///
    /// Returns `ReservationExpired` when the window has lapsed (the expiry
    /// is persisted), and state errors for non-notified entries.
    pub async fn confirm(
        &self,
        reservation_id: Uuid,
        user_id: Uuid,
    ) -> Result<(reservations::Model, loan_requests::Model), ReservationRepoError> {
        let txn = self.db.begin().await?;

        let entry = Self::find_locking_book(&txn, reservation_id).await?;
        if entry.user_id != user_id {
            return Err(ReservationRepoError::NotOwner);
        }

        let state = ReservationState::parse(&entry.status).unwrap_or(ReservationState::Active);
        let now = Utc::now();
        let expires_at = entry.expires_at.map(|ts| ts.with_timezone(&Utc));

        let outcome = ReservationService::confirm_outcome(state, expires_at, now)?;
        let now_tz = now.into();

        // Either way the entry leaves the queue; active entries behind it
        // shift forward so positions stay dense for later enqueues.
        Self::close_gap(&txn, entry.book_id, entry.position, now_tz).await?;

        match outcome {
            ConfirmOutcome::Confirmed => {
                let book_id = entry.book_id;
                let mut confirmed: reservations::ActiveModel = entry.into();
                confirmed.status = Set(ReservationState::Confirmed.as_str().to_owned());
                confirmed.updated_at = Set(now_tz);
                let updated = confirmed.update(&txn).await?;

                let request = loan_requests::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    book_id: Set(book_id),
                    requester_id: Set(user_id),
                    status: Set(RequestState::Pending.as_str().to_owned()),
                    rejection_reason: Set(None),
                    processed_by: Set(None),
                    processed_at: Set(None),
                    created_at: Set(now_tz),
                    updated_at: Set(now_tz),
                }
                .insert(&txn)
                .await?;

                txn.commit().await?;

                tracing::info!(
                    reservation_id = %updated.id,
                    request_id = %request.id,
                    "reservation confirmed"
                );
                Ok((updated, request))
            }
            ConfirmOutcome::Expired => {
                // The lapse is persisted even though the call fails. No
                // promotion happens here; the next member must wait for
                // the book's next return.
                let mut expired: reservations::ActiveModel = entry.into();
                expired.status = Set(ReservationState::Expired.as_str().to_owned());
                expired.updated_at = Set(now_tz);
                expired.update(&txn).await?;

                txn.commit().await?;
                Err(ReservationError::ReservationExpired.into())
            }
        }
    }

    /// Lists one user's reservations, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the query fails.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> Result<PageResponse<reservations::Model>, ReservationRepoError> {
        users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(ReservationRepoError::UserNotFound(user_id))?;

        let base = reservations::Entity::find().filter(reservations::Column::UserId.eq(user_id));
        let total = base.clone().count(&self.db).await?;
        let rows = base
            .order_by_desc(reservations::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(rows, page, total))
    }

    /// Shifts the active entries behind a vacated position forward one
    /// place, keeping the book's active positions dense.
    async fn close_gap(
        txn: &DatabaseTransaction,
        book_id: Uuid,
        vacated_position: i32,
        now: DateTimeWithTimeZone,
    ) -> Result<(), ReservationRepoError> {
        let behind = reservations::Entity::find()
            .filter(reservations::Column::BookId.eq(book_id))
            .filter(reservations::Column::Status.eq(ReservationState::Active.as_str()))
            .filter(reservations::Column::Position.gt(vacated_position))
            .all(txn)
            .await?;

        for follower in behind {
            let shifted =
                ReservationService::position_after_cancel(follower.position, vacated_position);
            let mut model: reservations::ActiveModel = follower.into();
            model.position = Set(shifted);
            model.updated_at = Set(now);
            model.update(txn).await?;
        }

        Ok(())
    }

    /// Loads a reservation after locking its book row, preserving the
    /// book-then-user lock order used everywhere else.
    async fn find_locking_book(
        txn: &DatabaseTransaction,
        reservation_id: Uuid,
    ) -> Result<reservations::Model, ReservationRepoError> {
        let entry = reservations::Entity::find_by_id(reservation_id)
            .one(txn)
            .await?
            .ok_or(ReservationError::ReservationNotFound(reservation_id))?;

        books::Entity::find_by_id(entry.book_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(ReservationRepoError::BookNotFound(entry.book_id))?;

        // Re-read under the lock; a concurrent call may have advanced it.
        let entry = reservations::Entity::find_by_id(reservation_id)
            .one(txn)
            .await?
            .ok_or(ReservationError::ReservationNotFound(reservation_id))?;

        Ok(entry)
    }
}

fn live_statuses() -> [&'static str; 2] {
    [
        ReservationState::Active.as_str(),
        ReservationState::Notified.as_str(),
    ]
}
