//! Creates the tables used by the application.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{Error, auth::create_user_table, expense::create_expense_table};

/// Create the user and expense tables if they do not already exist.
///
/// Foreign keys are switched on so that deleting a user also deletes their
/// expenses.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_expense_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
