//! The expense model, input coercion helpers and the `despesas` table.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{auth::UserID, database_id::ExpenseId};

/// Categories offered as suggestions in the expense form. Any label is accepted.
pub const SUGGESTED_CATEGORIES: [&str; 3] = ["food", "transport", "leisure"];

/// The category given to expenses entered without one.
pub const DEFAULT_CATEGORY: &str = "uncategorized";

/// Money spent on a given day.
///
/// To create a new `Expense`, use [Expense::build] and insert the builder
/// into an [ExpenseStore](crate::expense::ExpenseStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID assigned by the store.
    pub id: ExpenseId,
    /// When the money was spent.
    pub date: Date,
    /// A free-form label such as "food". Never empty.
    pub category: String,
    /// Optional notes, empty when not given.
    pub description: String,
    /// The amount spent. Never negative.
    pub amount: f64,
    /// The user who recorded the expense. Always `None` for the CSV store.
    pub owner: Option<UserID>,
}

impl Expense {
    /// Start building a new expense.
    ///
    /// The category and description are trimmed and an empty category is
    /// replaced with [DEFAULT_CATEGORY].
    pub fn build(amount: f64, date: Date, category: &str, description: &str) -> ExpenseBuilder {
        ExpenseBuilder {
            amount,
            date,
            category: normalize_category(category),
            description: description.trim().to_owned(),
            owner: None,
        }
    }
}

/// The fields of an expense that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseBuilder {
    /// See [Expense::amount].
    pub amount: f64,
    /// See [Expense::date].
    pub date: Date,
    /// See [Expense::category].
    pub category: String,
    /// See [Expense::description].
    pub description: String,
    /// See [Expense::owner].
    pub owner: Option<UserID>,
}

impl ExpenseBuilder {
    /// Set the user the expense belongs to.
    pub fn owner(mut self, owner: Option<UserID>) -> Self {
        self.owner = owner;
        self
    }

    /// Attach an ID, producing a stored expense.
    pub(crate) fn finalize(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            date: self.date,
            category: self.category,
            description: self.description,
            amount: self.amount,
            owner: self.owner,
        }
    }
}

/// Parse a user-entered amount such as "12.50", " 7 " or "3,99".
///
/// A single comma is read as the decimal separator when there is no period.
/// Input that is not a finite, non-negative number becomes `0.0` and a
/// warning is logged, so a typo never stops an expense from being saved.
pub fn parse_amount(raw: &str) -> f64 {
    let trimmed = raw.trim();

    let normalized = if !trimmed.contains('.') && trimmed.matches(',').count() == 1 {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_owned()
    };

    match normalized.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => amount,
        Ok(amount) => {
            tracing::warn!("Amount {amount} is not a valid expense amount, using 0.0");
            0.0
        }
        Err(error) => {
            tracing::warn!("Could not parse amount {raw:?} ({error}), using 0.0");
            0.0
        }
    }
}

/// The year and month of `date` as "YYYY-MM", used to group expenses by month.
pub fn month_key(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

pub(crate) fn normalize_category(category: &str) -> String {
    let category = category.trim();

    if category.is_empty() {
        DEFAULT_CATEGORY.to_owned()
    } else {
        category.to_owned()
    }
}

/// Create the `despesas` table. Requires the `usuarios` table.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS despesas (
                id INTEGER PRIMARY KEY,
                data TEXT NOT NULL,
                descricao TEXT NOT NULL,
                categoria TEXT NOT NULL,
                valor REAL NOT NULL,
                usuario_id INTEGER REFERENCES usuarios(id) ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_despesas_usuario ON despesas(usuario_id);",
        (),
    )?;

    Ok(())
}

/// Map a `SELECT id, data, categoria, descricao, valor, usuario_id` row to an [Expense].
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let date = row.get(1)?;
    let category = row.get(2)?;
    let description = row.get(3)?;
    let amount = row.get(4)?;
    let owner = row.get::<_, Option<i64>>(5)?.map(UserID::new);

    Ok(Expense {
        id,
        date,
        category,
        description,
        amount,
        owner,
    })
}

#[cfg(test)]
mod parse_amount_tests {
    use super::parse_amount;

    #[test]
    fn parses_plain_and_padded_numbers() {
        assert_eq!(parse_amount("12.50"), 12.5);
        assert_eq!(parse_amount("  7 "), 7.0);
        assert_eq!(parse_amount("0"), 0.0);
    }

    #[test]
    fn accepts_decimal_comma() {
        assert_eq!(parse_amount("3,99"), 3.99);
    }

    #[test]
    fn rejects_ambiguous_separators() {
        assert_eq!(parse_amount("1,234.5"), 0.0);
        assert_eq!(parse_amount("1,2,3"), 0.0);
    }

    #[test]
    fn invalid_input_becomes_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("twelve"), 0.0);
        assert_eq!(parse_amount("-5"), 0.0);
        assert_eq!(parse_amount("NaN"), 0.0);
        assert_eq!(parse_amount("inf"), 0.0);
    }
}
