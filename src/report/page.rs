//! The report page with charts and totals, and the same data as JSON.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    auth::UserID,
    config::ReportConfig,
    currency::CurrencyFormat,
    endpoints,
    expense::ExpenseStore,
    html::{
        HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, link,
    },
    navigation::nav_bar,
    report::{
        aggregation::{CategoryPercentage, CategoryTotal, ExpenseSummary, MonthTotal, summarize},
        charts::{ReportChart, build_report_charts, charts_script, charts_view},
    },
};

/// The state needed for the report page, the summary API and the PDF export.
#[derive(Clone)]
pub struct ReportState {
    pub expense_store: Arc<dyn ExpenseStore>,
    /// The database connection for looking up the user named on the PDF.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
    pub report_config: ReportConfig,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_store: state.expense_store.clone(),
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            report_config: state.report_config.clone(),
        }
    }
}

fn category_table(summary: &ExpenseSummary, currency: &CurrencyFormat) -> Markup {
    let percentages = summary.category_percentages();

    html!(
        div
        {
            h3 class="text-xl font-semibold mb-4" { "By Category" }

            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class="px-6 py-3 text-right" { "Total" }
                        th scope="col" class="px-6 py-3 text-right" { "Share" }
                    }
                }

                tbody
                {
                    @for (category_total, share) in summary.by_category.iter().zip(&percentages) {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            th scope="row" class=(TABLE_CELL_STYLE) { (category_total.category) }
                            td class="px-6 py-4 text-right" { (currency.format(category_total.total)) }
                            td class="px-6 py-4 text-right" { (format!("{:.1}%", share.percentage)) }
                        }
                    }
                }
            }
        }
    )
}

fn month_table(summary: &ExpenseSummary, currency: &CurrencyFormat) -> Markup {
    html!(
        div
        {
            h3 class="text-xl font-semibold mb-4" { "By Month" }

            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Month" }
                        th scope="col" class="px-6 py-3 text-right" { "Total" }
                    }
                }

                tbody
                {
                    @for month_total in &summary.by_month {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            th scope="row" class=(TABLE_CELL_STYLE) { (month_total.month) }
                            td class="px-6 py-4 text-right" { (currency.format(month_total.total)) }
                        }
                    }
                }

                tfoot
                {
                    tr class="font-semibold text-gray-900 dark:text-white"
                    {
                        th scope="row" class=(TABLE_CELL_STYLE) { "Grand total" }
                        td id="grand-total" class="px-6 py-4 text-right"
                        {
                            (currency.format(summary.grand_total))
                        }
                    }
                }
            }
        }
    )
}

fn report_no_data_view() -> Markup {
    let expenses_link = link(endpoints::EXPENSES_VIEW, "expenses page");

    let content = html!(
        (nav_bar(endpoints::REPORT_VIEW))

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once you add some expenses on the "
                (expenses_link) "."
            }
        }
    );

    base("Report", &[], &content)
}

fn report_view(summary: &ExpenseSummary, charts: &[ReportChart], currency: &CurrencyFormat) -> Markup {
    let content = html!(
        (nav_bar(endpoints::REPORT_VIEW))

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Report" }

                    a href=(endpoints::REPORT_PDF) class=(LINK_STYLE) download
                    {
                        "Download PDF"
                    }
                }

                (charts_view(charts))

                div class="grid grid-cols-1 xl:grid-cols-2 gap-8"
                {
                    (category_table(summary, currency))
                    (month_table(summary, currency))
                }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(charts),
    ];

    base("Report", &scripts, &content)
}

/// Display charts and totals of the user's expenses.
pub async fn get_report_page(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let expenses = state
        .expense_store
        .list(Some(user_id))
        .inspect_err(|error| tracing::error!("Could not list expenses for {user_id}: {error}"))?;

    let summary = summarize(&expenses);

    if summary.is_empty() {
        return Ok(report_no_data_view().into_response());
    }

    let currency = &state.report_config.currency;
    let charts = build_report_charts(&summary, currency);

    Ok(report_view(&summary, &charts, currency).into_response())
}

/// The expense summary as sent by [get_report_summary].
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub by_category: Vec<CategoryTotal>,
    pub by_month: Vec<MonthTotal>,
    pub grand_total: f64,
    pub average_per_category: f64,
    pub top_category: Option<String>,
    pub percentages: Vec<CategoryPercentage>,
}

impl From<ExpenseSummary> for SummaryResponse {
    fn from(summary: ExpenseSummary) -> Self {
        let average_per_category = summary.average_per_category();
        let top_category = summary
            .top_category()
            .map(|category_total| category_total.category.clone());
        let percentages = summary.category_percentages();

        Self {
            by_category: summary.by_category,
            by_month: summary.by_month,
            grand_total: summary.grand_total,
            average_per_category,
            top_category,
            percentages,
        }
    }
}

/// The user's category totals, month totals and grand total as JSON.
pub async fn get_report_summary(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<SummaryResponse>, Error> {
    let expenses = state.expense_store.list(Some(user_id))?;

    Ok(Json(summarize(&expenses).into()))
}
