use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    auth::UserID,
    database_id::ExpenseId,
    endpoints::{self, format_endpoint},
    expense::{
        Expense,
        form::{ExpenseFormDefaults, expense_form_fields},
        state::ExpenseState,
    },
    html::{FORM_CONTAINER_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base, submit_button},
    navigation::nav_bar,
};

fn edit_expense_view(expense: &Expense) -> Markup {
    let edit_url = format_endpoint(endpoints::EXPENSE, expense.id);

    let content = html!(
        (nav_bar(endpoints::EDIT_EXPENSE_VIEW))

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class=(FORM_CONTAINER_STYLE)
            {
                h1 class="text-xl font-bold mb-4" { "Edit Expense" }

                form
                    hx-post=(edit_url)
                    hx-target-error="#alert-container"
                    hx-indicator="#indicator"
                    hx-disabled-elt="#submit-button"
                    class="w-full space-y-4 md:space-y-6"
                {
                    (expense_form_fields(&ExpenseFormDefaults::from_expense(expense)))

                    (submit_button("Update Expense"))
                }

                a href=(endpoints::EXPENSES_VIEW) class={ "mt-4 " (LINK_STYLE) } { "Cancel" }
            }
        }
    );

    base("Edit Expense", &[], &content)
}

/// Renders the page for editing an expense, or the 404 page if the user has
/// no such expense.
pub async fn get_edit_expense_page(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Response, Error> {
    let expense = state
        .expense_store
        .get(expense_id, Some(user_id))
        .inspect_err(|error| {
            if *error != Error::NotFound {
                tracing::error!("Failed to retrieve expense {expense_id}: {error}");
            }
        })?;

    Ok(edit_expense_view(&expense).into_response())
}
