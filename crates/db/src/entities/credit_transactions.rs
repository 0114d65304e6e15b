//! `SeaORM` Entity for the credit_transactions table.
//!
//! The ledger is append-only: rows are never updated or deleted, and
//! replaying a user's rows from zero reproduces the stored balance.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "credit_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    /// Signed, never zero.
    pub amount: i32,
    /// `earn` or `spend`, derived from the sign of `amount`.
    pub kind: String,
    pub balance_before: i32,
    pub balance_after: i32,
    pub reason: String,
    pub loan_id: Option<Uuid>,
    pub acting_admin: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::loans::Entity",
        from = "Column::LoanId",
        to = "super::loans::Column::Id"
    )]
    Loan,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
