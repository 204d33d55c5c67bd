//! The interface shared by the SQLite and CSV expense stores.

use crate::{
    Error,
    auth::UserID,
    database_id::ExpenseId,
    expense::{Expense, ExpenseBuilder},
};

/// Handles the creation, retrieval, update and deletion of expenses.
///
/// Each call holds the underlying connection or file for the duration of the
/// call only. Concurrent edits of the same expense are last-write-wins.
///
/// `owner` scopes every call to one user's expenses. Stores that cannot
/// record an owner ignore it.
pub trait ExpenseStore: Send + Sync {
    /// All expenses visible to `owner`, in the order they were added.
    fn list(&self, owner: Option<UserID>) -> Result<Vec<Expense>, Error>;

    /// Retrieve a single expense.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no such expense visible to `owner`.
    fn get(&self, id: ExpenseId, owner: Option<UserID>) -> Result<Expense, Error>;

    /// Add a new expense with a newly assigned ID.
    fn insert(&self, builder: ExpenseBuilder) -> Result<Expense, Error>;

    /// Replace the date, category, description and amount of one expense.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingExpense] if there is no such expense.
    fn update(
        &self,
        id: ExpenseId,
        owner: Option<UserID>,
        builder: &ExpenseBuilder,
    ) -> Result<Expense, Error>;

    /// Remove one expense, leaving the rest in their original order.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingExpense] if there is no such expense.
    fn delete(&self, id: ExpenseId, owner: Option<UserID>) -> Result<(), Error>;
}
