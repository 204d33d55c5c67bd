//! Defines the endpoint for creating a new expense.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    auth::UserID,
    endpoints,
    expense::{form::ExpenseForm, state::ExpenseState},
    timezone::local_today,
};

/// A route handler for creating a new expense, redirects to the expenses view on success.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let expense = form.into_builder(today).owner(Some(user_id));

    if let Err(error) = state.expense_store.insert(expense) {
        tracing::error!("could not create expense: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
