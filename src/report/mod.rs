//! Expense reports: totals by category and month, charts, and the PDF export.

mod aggregation;
mod charts;
mod export;
mod page;
mod pdf;

pub use aggregation::{ExpenseSummary, summarize};
pub use export::get_report_pdf;
pub use page::{get_report_page, get_report_summary};
