//! A personal expense tracker served as HTML pages.
//!
//! Users register with an email and password, record what they spend by
//! category, and get totals per category and per month as tables, charts and
//! a downloadable PDF report. Expenses live either in the SQLite database or
//! in a CSV file.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod config;
mod currency;
mod database_id;
mod db;
mod endpoints;
mod error;
mod error_pages;
mod expense;
mod html;
mod logging;
mod navigation;
mod report;
mod routing;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, create_cookie_key};
pub use auth::{PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_email};
pub use config::{ExpenseStorage, ReportConfig, StorageBackend};
pub use currency::CurrencyFormat;
pub use db::initialize as initialize_db;
pub use error::Error;
pub use expense::{CsvExpenseStore, Expense, ExpenseStore, SqliteExpenseStore};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use report::{ExpenseSummary, summarize};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
