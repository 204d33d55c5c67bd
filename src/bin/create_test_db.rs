use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use expense_tracker::{
    Expense, ExpenseStore, PasswordHash, SqliteExpenseStore, ValidatedPassword, create_user,
    initialize_db,
};

/// A utility for creating a test database for the expense tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user("Test User", &"test@example.com".parse()?, password_hash, &conn)?;

    println!("Creating sample expenses...");

    let store = SqliteExpenseStore::new(Arc::new(Mutex::new(conn)));
    let today = OffsetDateTime::now_utc().date();

    let samples = [
        (42.9, 0, "food", "Groceries"),
        (4.5, 1, "transport", "Bus fare"),
        (18.0, 3, "leisure", "Cinema"),
        (12.75, 35, "food", "Lunch with friends"),
        (60.0, 40, "transport", "Fuel"),
        (25.0, 70, "leisure", "Concert tickets"),
        (9.99, 72, "subscriptions", "Music streaming"),
    ];

    for (amount, days_ago, category, description) in samples {
        store.insert(
            Expense::build(
                amount,
                today - Duration::days(days_ago),
                category,
                description,
            )
            .owner(Some(user.id)),
        )?;
    }

    println!("Log in as test@example.com with the password \"test\".");
    println!("Success!");

    Ok(())
}
