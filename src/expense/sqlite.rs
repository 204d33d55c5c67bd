//! Implements a SQLite backed expense store.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{
    Error,
    auth::UserID,
    database_id::ExpenseId,
    expense::{Expense, ExpenseBuilder, ExpenseStore, map_expense_row},
};

/// Stores expenses in the `despesas` table.
///
/// Every query is scoped by owner, so users only ever see their own expenses.
#[derive(Debug, Clone)]
pub struct SqliteExpenseStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteExpenseStore {
    /// Create a new store for the SQLite `connection`.
    ///
    /// The connection must have been set up with [crate::initialize_db].
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .inspect_err(|error| tracing::error!("Could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

fn owner_param(owner: Option<UserID>) -> Option<i64> {
    owner.map(|owner| owner.as_i64())
}

impl ExpenseStore for SqliteExpenseStore {
    fn list(&self, owner: Option<UserID>) -> Result<Vec<Expense>, Error> {
        let connection = self.lock()?;

        connection
            .prepare(
                "SELECT id, data, categoria, descricao, valor, usuario_id
                 FROM despesas
                 WHERE usuario_id IS ?1
                 ORDER BY id ASC",
            )?
            .query_map([owner_param(owner)], map_expense_row)?
            .map(|maybe_expense| maybe_expense.map_err(Error::from))
            .collect()
    }

    fn get(&self, id: ExpenseId, owner: Option<UserID>) -> Result<Expense, Error> {
        let connection = self.lock()?;

        let expense = connection
            .prepare(
                "SELECT id, data, categoria, descricao, valor, usuario_id
                 FROM despesas
                 WHERE id = ?1 AND usuario_id IS ?2",
            )?
            .query_row((id, owner_param(owner)), map_expense_row)?;

        Ok(expense)
    }

    fn insert(&self, builder: ExpenseBuilder) -> Result<Expense, Error> {
        let connection = self.lock()?;

        let expense = connection
            .prepare(
                "INSERT INTO despesas (data, categoria, descricao, valor, usuario_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING id, data, categoria, descricao, valor, usuario_id",
            )?
            .query_row(
                (
                    builder.date,
                    builder.category,
                    builder.description,
                    builder.amount,
                    owner_param(builder.owner),
                ),
                map_expense_row,
            )?;

        tracing::debug!("Inserted expense {}", expense.id);

        Ok(expense)
    }

    fn update(
        &self,
        id: ExpenseId,
        owner: Option<UserID>,
        builder: &ExpenseBuilder,
    ) -> Result<Expense, Error> {
        let connection = self.lock()?;

        connection
            .prepare(
                "UPDATE despesas
                 SET data = ?1, categoria = ?2, descricao = ?3, valor = ?4
                 WHERE id = ?5 AND usuario_id IS ?6
                 RETURNING id, data, categoria, descricao, valor, usuario_id",
            )?
            .query_row(
                (
                    builder.date,
                    &builder.category,
                    &builder.description,
                    builder.amount,
                    id,
                    owner_param(owner),
                ),
                map_expense_row,
            )
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingExpense,
                error => error.into(),
            })
    }

    fn delete(&self, id: ExpenseId, owner: Option<UserID>) -> Result<(), Error> {
        let connection = self.lock()?;

        let rows_affected = connection.execute(
            "DELETE FROM despesas WHERE id = ?1 AND usuario_id IS ?2",
            (id, owner_param(owner)),
        )?;

        match rows_affected {
            0 => Err(Error::DeleteMissingExpense),
            _ => Ok(()),
        }
    }
}
