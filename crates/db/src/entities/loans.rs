//! `SeaORM` Entity for the loans table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "loans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub book_id: Uuid,
    pub borrower_id: Uuid,
    /// Donor of record, copied from the book when the loan opens.
    pub donor_id: Option<Uuid>,
    pub request_id: Option<Uuid>,
    pub issued_by: Uuid,
    pub returned_by: Option<Uuid>,
    /// `active` or `completed`; overdue is derived, never stored.
    pub status: String,
    pub due_date: Date,
    pub renewals: i16,
    pub returned_at: Option<DateTimeWithTimeZone>,
    pub return_condition: Option<String>,
    pub damage_notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::books::Entity",
        from = "Column::BookId",
        to = "super::books::Column::Id"
    )]
    Book,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::BorrowerId",
        to = "super::users::Column::Id"
    )]
    Borrower,
    #[sea_orm(
        belongs_to = "super::loan_requests::Entity",
        from = "Column::RequestId",
        to = "super::loan_requests::Column::Id"
    )]
    Request,
    #[sea_orm(has_many = "super::ratings::Entity")]
    Ratings,
}

impl Related<super::books::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Borrower.def()
    }
}

impl Related<super::ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
