//! Downloads the PDF report.

use axum::{
    Extension,
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    auth::{UserID, get_user_by_id},
    expense::month_key,
    report::{
        page::ReportState,
        pdf::{ReportDocument, render_pdf},
    },
    timezone::local_now,
};

/// Respond with the user's expense report as a PDF attachment.
///
/// Users without expenses are sent back to the expense list with a notice.
pub async fn get_report_pdf(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_user_by_id(user_id, &connection)?
    };

    let expenses = state
        .expense_store
        .list(Some(user_id))
        .inspect_err(|error| tracing::error!("Could not list expenses for {user_id}: {error}"))?;
    let generated_at = local_now(&state.local_timezone)?;

    let pdf = render_pdf(&ReportDocument {
        user_name: &user.name,
        user_email: user.email.as_str(),
        generated_at,
        expenses: &expenses,
        logo_path: state.report_config.logo_path.as_deref(),
        currency: &state.report_config.currency,
    })?;

    tracing::info!(
        "Exported {} expenses for user {user_id} ({} bytes)",
        expenses.len(),
        pdf.len()
    );

    let filename = format!("expense-report-{}.pdf", month_key(generated_at.date()));

    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}
