//! Initial database migration.
//!
//! Creates all engine tables plus the partial unique indexes that back
//! the single-open-loan and single-live-reservation invariants.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(BOOKS_SQL).await?;
        db.execute_unprepared(LOAN_REQUESTS_SQL).await?;
        db.execute_unprepared(LOANS_SQL).await?;
        db.execute_unprepared(RESERVATIONS_SQL).await?;
        db.execute_unprepared(CREDIT_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(RATINGS_SQL).await?;
        db.execute_unprepared(INDEXES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            r"
            DROP TABLE IF EXISTS ratings CASCADE;
            DROP TABLE IF EXISTS credit_transactions CASCADE;
            DROP TABLE IF EXISTS reservations CASCADE;
            DROP TABLE IF EXISTS loans CASCADE;
            DROP TABLE IF EXISTS loan_requests CASCADE;
            DROP TABLE IF EXISTS books CASCADE;
            DROP TABLE IF EXISTS users CASCADE;
            ",
        )
        .await?;

        Ok(())
    }
}

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    full_name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    role VARCHAR(20) NOT NULL DEFAULT 'student'
        CHECK (role IN ('student', 'admin')),
    credit_balance INTEGER NOT NULL DEFAULT 0,
    account_status VARCHAR(20) NOT NULL DEFAULT 'active'
        CHECK (account_status IN ('active', 'suspended', 'blocked')),
    completed_loans INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const BOOKS_SQL: &str = r"
CREATE TABLE books (
    id UUID PRIMARY KEY,
    title VARCHAR(500) NOT NULL,
    author VARCHAR(255) NOT NULL,
    donor_id UUID REFERENCES users(id),
    condition VARCHAR(20) NOT NULL DEFAULT 'good'
        CHECK (condition IN ('excellent', 'very_good', 'good', 'fair', 'damaged')),
    available BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const LOAN_REQUESTS_SQL: &str = r"
CREATE TABLE loan_requests (
    id UUID PRIMARY KEY,
    book_id UUID NOT NULL REFERENCES books(id),
    requester_id UUID NOT NULL REFERENCES users(id),
    status VARCHAR(20) NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'accepted', 'rejected')),
    rejection_reason TEXT,
    processed_by UUID REFERENCES users(id),
    processed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const LOANS_SQL: &str = r"
CREATE TABLE loans (
    id UUID PRIMARY KEY,
    book_id UUID NOT NULL REFERENCES books(id),
    borrower_id UUID NOT NULL REFERENCES users(id),
    donor_id UUID REFERENCES users(id),
    request_id UUID REFERENCES loan_requests(id),
    issued_by UUID NOT NULL REFERENCES users(id),
    returned_by UUID REFERENCES users(id),
    status VARCHAR(20) NOT NULL DEFAULT 'active'
        CHECK (status IN ('active', 'completed')),
    due_date DATE NOT NULL,
    renewals SMALLINT NOT NULL DEFAULT 0 CHECK (renewals BETWEEN 0 AND 2),
    returned_at TIMESTAMPTZ,
    return_condition VARCHAR(20)
        CHECK (return_condition IN ('excellent', 'very_good', 'good', 'fair', 'damaged')),
    damage_notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const RESERVATIONS_SQL: &str = r"
CREATE TABLE reservations (
    id UUID PRIMARY KEY,
    book_id UUID NOT NULL REFERENCES books(id),
    user_id UUID NOT NULL REFERENCES users(id),
    status VARCHAR(20) NOT NULL DEFAULT 'active'
        CHECK (status IN ('active', 'notified', 'confirmed', 'cancelled', 'expired')),
    position INTEGER NOT NULL CHECK (position >= 1),
    notified_at TIMESTAMPTZ,
    expires_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const CREDIT_TRANSACTIONS_SQL: &str = r"
CREATE TABLE credit_transactions (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id),
    amount INTEGER NOT NULL CHECK (amount <> 0),
    kind VARCHAR(10) NOT NULL CHECK (kind IN ('earn', 'spend')),
    balance_before INTEGER NOT NULL,
    balance_after INTEGER NOT NULL CHECK (balance_after = balance_before + amount),
    reason TEXT NOT NULL,
    loan_id UUID REFERENCES loans(id),
    acting_admin UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const RATINGS_SQL: &str = r"
CREATE TABLE ratings (
    id UUID PRIMARY KEY,
    loan_id UUID NOT NULL REFERENCES loans(id),
    book_id UUID NOT NULL REFERENCES books(id),
    rater_id UUID NOT NULL REFERENCES users(id),
    ratee_id UUID NOT NULL REFERENCES users(id),
    category VARCHAR(20) NOT NULL CHECK (category IN ('book', 'communication')),
    score SMALLINT NOT NULL CHECK (score BETWEEN 1 AND 5),
    comment TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (loan_id, rater_id, category)
);
";

const INDEXES_SQL: &str = r"
-- At most one non-completed loan per book.
CREATE UNIQUE INDEX idx_loans_one_open_per_book
    ON loans(book_id) WHERE status <> 'completed';

-- At most one pending request per (book, requester).
CREATE UNIQUE INDEX idx_requests_one_pending
    ON loan_requests(book_id, requester_id) WHERE status = 'pending';

-- At most one live reservation per (book, user).
CREATE UNIQUE INDEX idx_reservations_one_live
    ON reservations(book_id, user_id) WHERE status IN ('active', 'notified');

CREATE INDEX idx_loans_borrower ON loans(borrower_id);
CREATE INDEX idx_reservations_book_status ON reservations(book_id, status);
CREATE INDEX idx_credit_transactions_user ON credit_transactions(user_id, created_at);
CREATE INDEX idx_ratings_book ON ratings(book_id);
CREATE INDEX idx_ratings_ratee ON ratings(ratee_id);
";
