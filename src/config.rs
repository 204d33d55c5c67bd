//! Runtime settings shared by the server binary and the request handlers.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::currency::CurrencyFormat;

/// Where expenses are stored.
///
/// Users are always stored in the SQLite database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// The `despesas` table in the SQLite database, scoped per user.
    Sqlite,
    /// A single CSV file shared by every user.
    Csv,
}

/// Settings for the report page and PDF export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportConfig {
    /// An image drawn at the top of PDF reports. A text title is used when
    /// this is `None` or the file cannot be read.
    pub logo_path: Option<PathBuf>,
    /// How monetary amounts are displayed.
    pub currency: CurrencyFormat,
}

/// Where to keep expenses.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseStorage {
    /// Store expenses next to the users in the SQLite database.
    Sqlite,
    /// Store expenses in the CSV file at the given path, creating it if needed.
    Csv(PathBuf),
}

impl ExpenseStorage {
    /// Pick the storage for `backend`, using `csv_path` for the CSV backend.
    pub fn new(backend: StorageBackend, csv_path: PathBuf) -> Self {
        match backend {
            StorageBackend::Sqlite => ExpenseStorage::Sqlite,
            StorageBackend::Csv => ExpenseStorage::Csv(csv_path),
        }
    }
}
