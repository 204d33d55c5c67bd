//! Defines the endpoint for updating an expense.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    auth::UserID,
    database_id::ExpenseId,
    endpoints,
    expense::{form::ExpenseForm, state::ExpenseState},
    timezone::local_today,
};

pub async fn edit_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let expense = form.into_builder(today);

    match state
        .expense_store
        .update(expense_id, Some(user_id), &expense)
    {
        Ok(_) => (
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update expense {expense_id}: {error}");
            error.into_alert_response()
        }
    }
}
