//! Expenses: the model, the SQLite and CSV stores, and the pages and
//! endpoints for adding, editing and deleting them.

mod core;
mod create_endpoint;
mod csv;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;
mod list_page;
mod sqlite;
mod state;
mod store;

pub use core::{
    Expense, ExpenseBuilder, SUGGESTED_CATEGORIES, create_expense_table, map_expense_row,
    month_key, parse_amount,
};
pub use create_endpoint::create_expense_endpoint;
pub use self::csv::CsvExpenseStore;
pub use delete_endpoint::delete_expense_endpoint;
pub use edit_endpoint::edit_expense_endpoint;
pub use edit_page::get_edit_expense_page;
pub use list_page::{NOTHING_TO_EXPORT_NOTICE, get_expenses_page};
pub use sqlite::SqliteExpenseStore;
pub use store::ExpenseStore;

#[cfg(test)]
pub(crate) use state::test_state;
