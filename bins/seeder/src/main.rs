//! Database seeder for Shelfshare development and testing.
//!
//! Seeds an admin, a couple of students and a handful of donated books
//! for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use shelfshare_db::entities::{books, users};

/// Admin user ID (consistent for all seeds)
const ADMIN_ID: &str = "00000000-0000-0000-0000-000000000001";
/// First student ID (consistent for all seeds)
const STUDENT_A_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Second student ID (consistent for all seeds)
const STUDENT_B_ID: &str = "00000000-0000-0000-0000-000000000003";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = shelfshare_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding users...");
    seed_users(&db).await;

    println!("Seeding books...");
    seed_books(&db).await;

    println!("Seeding complete!");
}

fn admin_id() -> Uuid {
    Uuid::parse_str(ADMIN_ID).unwrap()
}

fn student_a_id() -> Uuid {
    Uuid::parse_str(STUDENT_A_ID).unwrap()
}

fn student_b_id() -> Uuid {
    Uuid::parse_str(STUDENT_B_ID).unwrap()
}

/// Seeds the admin and two students.
async fn seed_users(db: &DatabaseConnection) {
    let seeds = [
        (admin_id(), "Library Admin", "admin@shelfshare.dev", "admin"),
        (student_a_id(), "Ana Torres", "ana@shelfshare.dev", "student"),
        (student_b_id(), "Ben Osei", "ben@shelfshare.dev", "student"),
    ];

    for (id, name, email, role) in seeds {
        if users::Entity::find_by_id(id)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  User {email} already exists, skipping...");
            continue;
        }

        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(id),
            full_name: Set(name.to_string()),
            email: Set(email.to_string()),
            role: Set(role.to_string()),
            credit_balance: Set(0),
            account_status: Set("active".to_string()),
            completed_loans: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match user.insert(db).await {
            Ok(_) => println!("  Created user: {email}"),
            Err(e) => eprintln!("Failed to insert user {email}: {e}"),
        }
    }
}

/// Seeds a few donated books, all available.
async fn seed_books(db: &DatabaseConnection) {
    let seeds = [
        (
            "00000000-0000-0000-0000-000000000101",
            "The Rust Programming Language",
            "Klabnik & Nichols",
            "excellent",
        ),
        (
            "00000000-0000-0000-0000-000000000102",
            "Designing Data-Intensive Applications",
            "Martin Kleppmann",
            "good",
        ),
        (
            "00000000-0000-0000-0000-000000000103",
            "Structure and Interpretation of Computer Programs",
            "Abelson & Sussman",
            "fair",
        ),
        (
            "00000000-0000-0000-0000-000000000104",
            "The Pragmatic Programmer",
            "Hunt & Thomas",
            "very_good",
        ),
    ];

    for (id, title, author, condition) in seeds {
        let id = Uuid::parse_str(id).unwrap();
        if books::Entity::find_by_id(id)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  Book '{title}' already exists, skipping...");
            continue;
        }

        let now = Utc::now().into();
        let book = books::ActiveModel {
            id: Set(id),
            title: Set(title.to_string()),
            author: Set(author.to_string()),
            donor_id: Set(Some(student_a_id())),
            condition: Set(condition.to_string()),
            available: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match book.insert(db).await {
            Ok(_) => println!("  Created book: {title}"),
            Err(e) => eprintln!("Failed to insert book {title}: {e}"),
        }
    }
}
