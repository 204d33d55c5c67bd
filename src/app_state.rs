//! Implements a struct that holds the state of the REST server.

use std::{
    fmt,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error,
    auth::DEFAULT_COOKIE_DURATION,
    config::{ExpenseStorage, ReportConfig},
    db::initialize,
    expense::{CsvExpenseStore, ExpenseStore, SqliteExpenseStore},
};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The secret used for signing and encrypting cookies.
    pub cookie_key: Key,
    /// How long auth cookies last after the last authenticated request.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
    /// The database connection holding the users and, for the SQLite backend,
    /// the expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Where expenses are read from and written to.
    pub expense_store: Arc<dyn ExpenseStore>,
    /// Settings for the report page and PDF export.
    pub report_config: ReportConfig,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("cookie_duration", &self.cookie_duration)
            .field("local_timezone", &self.local_timezone)
            .field("report_config", &self.report_config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create a new [AppState], creating the database tables if needed.
    ///
    /// # Errors
    /// Returns an error if the tables cannot be created or the CSV file
    /// cannot be opened.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
        expense_storage: ExpenseStorage,
        report_config: ReportConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let db_connection = Arc::new(Mutex::new(db_connection));

        let expense_store: Arc<dyn ExpenseStore> = match expense_storage {
            ExpenseStorage::Sqlite => Arc::new(SqliteExpenseStore::new(db_connection.clone())),
            ExpenseStorage::Csv(path) => {
                tracing::info!("Storing expenses in {}", path.display());
                Arc::new(CsvExpenseStore::new(path)?)
            }
        };

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection,
            expense_store,
            report_config,
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
