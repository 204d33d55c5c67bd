//! Implements an expense store backed by a single CSV file.

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use csv::{ReaderBuilder, Writer};
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    auth::UserID,
    database_id::ExpenseId,
    expense::{Expense, ExpenseBuilder, ExpenseStore, parse_amount},
};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// One line of the expense file.
///
/// The amount is kept as text so that a hand-edited cell that is not a
/// number reads as zero instead of failing the whole file.
#[derive(Debug, Serialize, Deserialize)]
struct ExpenseRecord {
    id: ExpenseId,
    date: String,
    category: String,
    description: String,
    amount: String,
}

impl ExpenseRecord {
    fn into_expense(self) -> Result<Expense, Error> {
        let date = Date::parse(&self.date, DATE_FORMAT).map_err(|error| {
            Error::CsvError(format!(
                "invalid date {:?} for expense {}: {error}",
                self.date, self.id
            ))
        })?;

        Ok(Expense {
            id: self.id,
            date,
            category: self.category,
            description: self.description,
            amount: parse_amount(&self.amount),
            owner: None,
        })
    }

    fn from_expense(expense: &Expense) -> Result<Self, Error> {
        let date = expense
            .date
            .format(DATE_FORMAT)
            .map_err(|error| Error::CsvError(error.to_string()))?;

        Ok(Self {
            id: expense.id,
            date,
            category: expense.category.clone(),
            description: expense.description.clone(),
            amount: expense.amount.to_string(),
        })
    }
}

/// Stores every expense in one CSV file with the header
/// `id,date,category,description,amount`.
///
/// The file has no owner column, so all users share the same expenses and
/// the `owner` arguments of [ExpenseStore] are ignored.
#[derive(Debug)]
pub struct CsvExpenseStore {
    path: PathBuf,
    file_lock: Mutex<()>,
}

impl CsvExpenseStore {
    /// Open the store at `path`, creating the file with just a header if it
    /// does not exist.
    ///
    /// # Errors
    /// Returns [Error::CsvError] if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, Error> {
        let store = Self {
            path: path.as_ref().to_owned(),
            file_lock: Mutex::new(()),
        };

        store.ensure_file()?;

        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, Error> {
        self.file_lock
            .lock()
            .inspect_err(|error| tracing::error!("Could not acquire CSV file lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }

    fn ensure_file(&self) -> Result<(), Error> {
        if self.path.exists() {
            return Ok(());
        }

        tracing::info!("Creating expense file {}", self.path.display());
        self.write_all(&[])
    }

    fn read_all(&self) -> Result<Vec<Expense>, Error> {
        self.ensure_file()?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;

        reader
            .deserialize::<ExpenseRecord>()
            .map(|record| record.map_err(Error::from)?.into_expense())
            .collect()
    }

    /// Replace the contents of the file with `expenses`, in order.
    fn write_all(&self, expenses: &[Expense]) -> Result<(), Error> {
        let mut writer = Writer::from_writer(File::create(&self.path)?);

        // `serialize` only writes the header before the first record.
        if expenses.is_empty() {
            writer.write_record(["id", "date", "category", "description", "amount"])?;
        }

        for expense in expenses {
            writer.serialize(ExpenseRecord::from_expense(expense)?)?;
        }

        writer.flush()?;

        Ok(())
    }
}

impl ExpenseStore for CsvExpenseStore {
    fn list(&self, _owner: Option<UserID>) -> Result<Vec<Expense>, Error> {
        let _guard = self.lock()?;

        self.read_all()
    }

    fn get(&self, id: ExpenseId, _owner: Option<UserID>) -> Result<Expense, Error> {
        let _guard = self.lock()?;

        self.read_all()?
            .into_iter()
            .find(|expense| expense.id == id)
            .ok_or(Error::NotFound)
    }

    fn insert(&self, builder: ExpenseBuilder) -> Result<Expense, Error> {
        let _guard = self.lock()?;

        let mut expenses = self.read_all()?;
        let id = expenses
            .iter()
            .map(|expense| expense.id)
            .max()
            .map_or(1, |max_id| max_id + 1);

        let expense = builder.owner(None).finalize(id);
        expenses.push(expense.clone());
        self.write_all(&expenses)?;

        tracing::debug!("Appended expense {id} to {}", self.path.display());

        Ok(expense)
    }

    fn update(
        &self,
        id: ExpenseId,
        _owner: Option<UserID>,
        builder: &ExpenseBuilder,
    ) -> Result<Expense, Error> {
        let _guard = self.lock()?;

        let mut expenses = self.read_all()?;
        let expense = expenses
            .iter_mut()
            .find(|expense| expense.id == id)
            .ok_or(Error::UpdateMissingExpense)?;

        expense.date = builder.date;
        expense.category = builder.category.clone();
        expense.description = builder.description.clone();
        expense.amount = builder.amount;
        let updated = expense.clone();

        self.write_all(&expenses)?;

        Ok(updated)
    }

    fn delete(&self, id: ExpenseId, _owner: Option<UserID>) -> Result<(), Error> {
        let _guard = self.lock()?;

        let mut expenses = self.read_all()?;
        let count_before = expenses.len();
        expenses.retain(|expense| expense.id != id);

        if expenses.len() == count_before {
            return Err(Error::DeleteMissingExpense);
        }

        self.write_all(&expenses)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        expense::{Expense, ExpenseStore},
    };

    use super::CsvExpenseStore;

    fn get_store() -> (TempDir, CsvExpenseStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvExpenseStore::new(dir.path().join("despesas.csv")).unwrap();

        (dir, store)
    }

    #[test]
    fn new_creates_file_with_header() {
        let (dir, _store) = get_store();

        let contents = fs::read_to_string(dir.path().join("despesas.csv")).unwrap();

        assert_eq!(contents, "id,date,category,description,amount\n");
    }

    #[test]
    fn new_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("despesas.csv");
        fs::write(
            &path,
            "id,date,category,description,amount\n4,2024-05-06,food,pizza,20\n",
        )
        .unwrap();

        let store = CsvExpenseStore::new(&path).unwrap();

        let expenses = store.list(None).unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].id, 4);
        assert_eq!(expenses[0].amount, 20.0);
    }

    #[test]
    fn ids_start_at_one_and_follow_max() {
        let (_dir, store) = get_store();

        let first = store
            .insert(Expense::build(1.0, date!(2024 - 01 - 01), "food", "a"))
            .unwrap();
        let second = store
            .insert(Expense::build(2.0, date!(2024 - 01 - 02), "food", "b"))
            .unwrap();
        store.delete(first.id, None).unwrap();
        let third = store
            .insert(Expense::build(3.0, date!(2024 - 01 - 03), "food", "c"))
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(third.id, 3);
    }

    #[test]
    fn owner_is_ignored() {
        let (_dir, store) = get_store();

        let expense = store
            .insert(
                Expense::build(1.0, date!(2024 - 01 - 01), "food", "a")
                    .owner(Some(UserID::new(7))),
            )
            .unwrap();

        assert_eq!(expense.owner, None);
        assert_eq!(store.list(Some(UserID::new(8))).unwrap(), vec![expense]);
    }

    #[test]
    fn text_with_commas_and_quotes_survives() {
        let (_dir, store) = get_store();

        let expense = store
            .insert(Expense::build(
                5.25,
                date!(2024 - 01 - 01),
                "food",
                "coffee, \"large\"",
            ))
            .unwrap();

        assert_eq!(store.get(expense.id, None).unwrap(), expense);
    }

    #[test]
    fn update_rewrites_only_target_and_keeps_order() {
        let (_dir, store) = get_store();
        let first = store
            .insert(Expense::build(1.0, date!(2024 - 01 - 01), "food", "a"))
            .unwrap();
        let second = store
            .insert(Expense::build(2.0, date!(2024 - 01 - 02), "food", "b"))
            .unwrap();
        let third = store
            .insert(Expense::build(3.0, date!(2024 - 01 - 03), "food", "c"))
            .unwrap();

        let updated = store
            .update(
                second.id,
                None,
                &Expense::build(20.0, date!(2024 - 02 - 02), "leisure", "cinema"),
            )
            .unwrap();

        assert_eq!(store.list(None).unwrap(), vec![first, updated, third]);
    }

    #[test]
    fn update_and_delete_missing_expense_fail() {
        let (_dir, store) = get_store();

        assert_eq!(
            store.update(
                3,
                None,
                &Expense::build(20.0, date!(2024 - 02 - 02), "leisure", "cinema")
            ),
            Err(Error::UpdateMissingExpense)
        );
        assert_eq!(store.delete(3, None), Err(Error::DeleteMissingExpense));
        assert_eq!(store.get(3, None), Err(Error::NotFound));
    }

    #[test]
    fn delete_keeps_relative_order() {
        let (_dir, store) = get_store();
        let first = store
            .insert(Expense::build(1.0, date!(2024 - 01 - 01), "food", "a"))
            .unwrap();
        let second = store
            .insert(Expense::build(2.0, date!(2024 - 01 - 02), "food", "b"))
            .unwrap();
        let third = store
            .insert(Expense::build(3.0, date!(2024 - 01 - 03), "food", "c"))
            .unwrap();

        store.delete(second.id, None).unwrap();

        assert_eq!(store.list(None).unwrap(), vec![first, third]);
    }

    #[test]
    fn unparseable_amount_reads_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("despesas.csv");
        fs::write(
            &path,
            "id,date,category,description,amount\n1,2024-05-06,food,pizza,abc\n",
        )
        .unwrap();

        let store = CsvExpenseStore::new(&path).unwrap();

        assert_eq!(store.list(None).unwrap()[0].amount, 0.0);
    }

    #[test]
    fn invalid_date_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("despesas.csv");
        fs::write(
            &path,
            "id,date,category,description,amount\n1,06/05/2024,food,pizza,20\n",
        )
        .unwrap();

        let store = CsvExpenseStore::new(&path).unwrap();

        assert!(matches!(store.list(None), Err(Error::CsvError(_))));
    }
}
