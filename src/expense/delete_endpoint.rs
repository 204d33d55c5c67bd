//! Defines the endpoint for deleting an expense.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    auth::UserID,
    database_id::ExpenseId,
    endpoints,
    expense::state::ExpenseState,
};

/// A route handler for deleting an expense, redirects to the expenses view on
/// success and responds with an alert otherwise.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    match state.expense_store.delete(expense_id, Some(user_id)) {
        Ok(()) => (
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not delete expense {expense_id}: {error}");
            error.into_alert_response()
        }
    }
}
