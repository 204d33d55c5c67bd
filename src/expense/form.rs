use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    expense::{Expense, ExpenseBuilder, SUGGESTED_CATEGORIES, parse_amount},
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// The form data for creating or editing an expense.
#[derive(Debug, Deserialize)]
pub struct ExpenseForm {
    /// When the money was spent. Defaults to today when left blank.
    #[serde(default)]
    pub date: Option<Date>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// The amount as typed, e.g. "12.50" or "12,50".
    #[serde(default)]
    pub amount: String,
}

impl ExpenseForm {
    /// Coerce the form into an expense, using `today` for a missing date.
    pub fn into_builder(self, today: Date) -> ExpenseBuilder {
        Expense::build(
            parse_amount(&self.amount),
            self.date.unwrap_or(today),
            &self.category,
            &self.description,
        )
    }
}

pub struct ExpenseFormDefaults<'a> {
    pub amount: Option<f64>,
    pub date: Date,
    pub category: Option<&'a str>,
    pub description: Option<&'a str>,
    pub autofocus_amount: bool,
}

impl<'a> ExpenseFormDefaults<'a> {
    /// Blank fields with the date set to `today`.
    pub fn new(today: Date) -> Self {
        Self {
            amount: None,
            date: today,
            category: None,
            description: None,
            autofocus_amount: true,
        }
    }

    /// Fields pre-filled from an existing expense.
    pub fn from_expense(expense: &'a Expense) -> Self {
        Self {
            amount: Some(expense.amount),
            date: expense.date,
            category: Some(expense.category.as_str()),
            description: Some(expense.description.as_str()),
            autofocus_amount: false,
        }
    }
}

pub fn expense_form_fields(defaults: &ExpenseFormDefaults<'_>) -> Markup {
    let amount_str = defaults.amount.map(|amount| format!("{amount:.2}"));

    html! {
        div
        {
            label
                for="amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount"
            }

            input
                name="amount"
                id="amount"
                type="text"
                inputmode="decimal"
                placeholder="0.00"
                required
                value=[amount_str.as_deref()]
                autofocus[defaults.autofocus_amount]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="date"
                class=(FORM_LABEL_STYLE)
            {
                "Date"
            }

            input
                name="date"
                id="date"
                type="date"
                value=(defaults.date)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="category"
                class=(FORM_LABEL_STYLE)
            {
                "Category"
            }

            input
                name="category"
                id="category"
                type="text"
                list="category-suggestions"
                placeholder="food"
                value=[defaults.category]
                class=(FORM_TEXT_INPUT_STYLE);

            datalist id="category-suggestions"
            {
                @for category in SUGGESTED_CATEGORIES {
                    option value=(category) {}
                }
            }
        }

        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                value=[defaults.description]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}
