use std::sync::Arc;

use axum::extract::FromRef;

use crate::{AppState, currency::CurrencyFormat, expense::ExpenseStore};

/// The state needed by the expense pages and endpoints.
#[derive(Clone)]
pub struct ExpenseState {
    /// Where expenses are read from and written to.
    pub expense_store: Arc<dyn ExpenseStore>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
    /// How amounts are shown in the expense table.
    pub currency: CurrencyFormat,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_store: state.expense_store.clone(),
            local_timezone: state.local_timezone.clone(),
            currency: state.report_config.currency.clone(),
        }
    }
}
