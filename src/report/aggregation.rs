//! Totals of expenses by category and by month.
//!
//! Everything here is recomputed from the expense list on every request and
//! never stored.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::expense::{Expense, month_key};

/// The sum of all expenses sharing a category label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// The sum of all expenses in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    /// The month as "YYYY-MM".
    pub month: String,
    pub total: f64,
}

/// A category's share of the grand total, in percent rounded to one decimal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPercentage {
    pub category: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpenseSummary {
    /// Category totals in the order each category first appears.
    pub by_category: Vec<CategoryTotal>,
    /// Month totals in chronological order.
    pub by_month: Vec<MonthTotal>,
    pub grand_total: f64,
}

/// Aggregate `expenses` into category totals, month totals and a grand total.
pub fn summarize(expenses: &[Expense]) -> ExpenseSummary {
    let mut by_category: Vec<CategoryTotal> = Vec::new();
    let mut category_index: HashMap<&str, usize> = HashMap::new();
    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();
    let mut grand_total = 0.0;

    for expense in expenses {
        match category_index.get(expense.category.as_str()) {
            Some(&index) => by_category[index].total += expense.amount,
            None => {
                category_index.insert(&expense.category, by_category.len());
                by_category.push(CategoryTotal {
                    category: expense.category.clone(),
                    total: expense.amount,
                });
            }
        }

        *by_month.entry(month_key(expense.date)).or_insert(0.0) += expense.amount;
        grand_total += expense.amount;
    }

    ExpenseSummary {
        by_category,
        by_month: by_month
            .into_iter()
            .map(|(month, total)| MonthTotal { month, total })
            .collect(),
        grand_total,
    }
}

impl ExpenseSummary {
    pub fn is_empty(&self) -> bool {
        self.by_category.is_empty()
    }

    /// The grand total divided by the number of distinct categories, or zero
    /// when there are no expenses.
    pub fn average_per_category(&self) -> f64 {
        if self.by_category.is_empty() {
            return 0.0;
        }

        self.grand_total / self.by_category.len() as f64
    }

    /// The category with the largest total. Ties go to the category that
    /// appeared first.
    pub fn top_category(&self) -> Option<&CategoryTotal> {
        self.by_category.iter().fold(None, |top, candidate| match top {
            Some(top) if top.total >= candidate.total => Some(top),
            _ => Some(candidate),
        })
    }

    /// Each category's share of the grand total. All shares are zero when
    /// the grand total is zero.
    pub fn category_percentages(&self) -> Vec<CategoryPercentage> {
        self.by_category
            .iter()
            .map(|category_total| {
                let percentage = if self.grand_total > 0.0 {
                    round_to_one_decimal(category_total.total / self.grand_total * 100.0)
                } else {
                    0.0
                };

                CategoryPercentage {
                    category: category_total.category.clone(),
                    percentage,
                }
            })
            .collect()
    }
}

fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
