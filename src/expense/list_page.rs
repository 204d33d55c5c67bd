//! Displays the user's expenses with a form for adding a new one.

use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    alert::Alert,
    auth::UserID,
    currency::CurrencyFormat,
    endpoints::{self, format_endpoint},
    expense::{
        Expense,
        form::{ExpenseFormDefaults, expense_form_fields},
        state::ExpenseState,
    },
    html::{
        FORM_CONTAINER_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, edit_delete_action_links, submit_button,
    },
    navigation::nav_bar,
    timezone::local_today,
};

/// The notice shown when the PDF export is requested without any expenses.
pub const NOTHING_TO_EXPORT_NOTICE: &str = "nothing_to_export";

#[derive(Debug, Default, Deserialize)]
pub struct ExpensesQuery {
    /// A one-off message to show at the top of the page.
    pub notice: Option<String>,
}

fn notice_alert(notice: &str) -> Option<Alert> {
    match notice {
        NOTHING_TO_EXPORT_NOTICE => Some(Alert {
            message: "Nothing to export".to_owned(),
            details: "Add an expense before exporting a report.".to_owned(),
        }),
        _ => None,
    }
}

fn expense_table_row(expense: &Expense, currency: &CurrencyFormat) -> Markup {
    let action_links = edit_delete_action_links(
        &format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id),
        &format_endpoint(endpoints::DELETE_EXPENSE, expense.id),
        &format!(
            "Are you sure you want to delete the expense '{}'? This cannot be undone.",
            expense.description
        ),
    );

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(expense.date) { (expense.date) }
            }

            td class=(TABLE_CELL_STYLE) { (expense.category) }

            td class=(TABLE_CELL_STYLE) { (expense.description) }

            td class="px-6 py-4 text-right" { (currency.format(expense.amount)) }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (action_links)
                }
            }
        }
    )
}

fn expenses_view(
    expenses: &[Expense],
    form_defaults: &ExpenseFormDefaults<'_>,
    currency: &CurrencyFormat,
    alert: Option<Alert>,
) -> Markup {
    let total: f64 = expenses.iter().map(|expense| expense.amount).sum();

    let content = html!(
        (nav_bar(endpoints::EXPENSES_VIEW))

        main class=(PAGE_CONTAINER_STYLE)
        {
            @if let Some(alert) = alert {
                div id="notice" class="w-full max-w-md" { (alert.into_html()) }
            }

            section class=(FORM_CONTAINER_STYLE)
            {
                h2 class="text-xl font-bold mb-4" { "Add Expense" }

                form
                    hx-post=(endpoints::EXPENSES_API)
                    hx-target-error="#alert-container"
                    hx-indicator="#indicator"
                    hx-disabled-elt="#submit-button"
                    class="w-full space-y-4 md:space-y-6"
                {
                    (expense_form_fields(form_defaults))

                    (submit_button("Add Expense"))
                }
            }

            section class="w-full overflow-x-auto dark:bg-gray-800 lg:max-w-5xl lg:mx-auto mt-8"
            {
                h1 class="text-xl font-bold mb-4" { "Expenses" }

                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class="px-6 py-3 text-right" { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for expense in expenses {
                            (expense_table_row(expense, currency))
                        }

                        @if expenses.is_empty() {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td colspan="5" class="px-6 py-4 text-center"
                                {
                                    "No expenses yet. Add one with the form above."
                                }
                            }
                        }
                    }

                    @if !expenses.is_empty() {
                        tfoot
                        {
                            tr class="font-semibold text-gray-900 dark:text-white"
                            {
                                th scope="row" colspan="3" class=(TABLE_CELL_STYLE) { "Total" }
                                td class="px-6 py-4 text-right" { (currency.format(total)) }
                                td {}
                            }
                        }
                    }
                }
            }
        }
    );

    base("Expenses", &[], &content)
}

/// Render the expense list for the logged-in user.
pub async fn get_expenses_page(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ExpensesQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let expenses = state
        .expense_store
        .list(Some(user_id))
        .inspect_err(|error| tracing::error!("Could not list expenses for {user_id}: {error}"))?;

    let alert = query.notice.as_deref().and_then(notice_alert);

    Ok(expenses_view(
        &expenses,
        &ExpenseFormDefaults::new(today),
        &state.currency,
        alert,
    )
    .into_response())
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use time::macros::date;

    use crate::{
        endpoints,
        expense::{Expense, state::test_state::get_state_and_user},
        test_utils::{
            assert_hx_post, assert_notice, assert_optional_input, assert_required_input,
            assert_submit_button, assert_valid_html, count_matches, must_get_form,
            must_get_input, parse_html_document, selected_text,
        },
    };

    use super::{ExpensesQuery, NOTHING_TO_EXPORT_NOTICE, get_expenses_page};

    #[tokio::test]
    async fn renders_form_and_rows() {
        let (state, user) = get_state_and_user();
        state
            .expense_store
            .insert(Expense::build(12.5, date!(2024 - 03 - 01), "food", "lunch").owner(Some(user.id)))
            .unwrap();
        state
            .expense_store
            .insert(Expense::build(3.0, date!(2024 - 03 - 02), "transport", "bus").owner(Some(user.id)))
            .unwrap();

        let response = get_expenses_page(
            State(state),
            Extension(user.id),
            Query(ExpensesQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_post(&form, endpoints::EXPENSES_API);
        assert_required_input(&form, "amount", "text");
        assert_optional_input(&form, "date", "date");
        assert_optional_input(&form, "description", "text");
        assert_eq!(
            must_get_input(&form, "category").value().attr("list"),
            Some("category-suggestions")
        );
        assert_submit_button(&form, "Add Expense");

        assert_eq!(count_matches(&html, "tbody tr"), 2);
        assert_eq!(selected_text(&html, "tfoot td"), "$15.50");
    }

    #[tokio::test]
    async fn shows_placeholder_row_when_empty() {
        let (state, user) = get_state_and_user();

        let response = get_expenses_page(
            State(state),
            Extension(user.id),
            Query(ExpensesQuery::default()),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(count_matches(&html, "tbody td[colspan='5']"), 1);
        assert_eq!(count_matches(&html, "tfoot"), 0);
    }

    #[tokio::test]
    async fn shows_nothing_to_export_notice() {
        let (state, user) = get_state_and_user();

        let response = get_expenses_page(
            State(state),
            Extension(user.id),
            Query(ExpensesQuery {
                notice: Some(NOTHING_TO_EXPORT_NOTICE.to_owned()),
            }),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_notice(&html, "Nothing to export");
    }

    #[tokio::test]
    async fn ignores_unknown_notice() {
        let (state, user) = get_state_and_user();

        let response = get_expenses_page(
            State(state),
            Extension(user.id),
            Query(ExpensesQuery {
                notice: Some("bogus".to_owned()),
            }),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(count_matches(&html, "#notice"), 0);
    }
}
