//! Alert messages shown to users after a form submission or action.
//!
//! Alerts are rendered as HTML fragments, either swapped into the page's
//! `#alert-container` by HTMX or placed directly in a page.

use maud::{Markup, html};

/// A dismissible error message with details on how to fix the problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// The headline shown in bold.
    pub message: String,
    /// Extra text shown under the message, omitted when empty.
    pub details: String,
}

const ERROR_STYLE: &str = "flex items-start gap-3 p-4 mb-4 text-sm rounded-lg \
    border border-red-300 bg-red-50 text-red-800 \
    dark:bg-gray-800 dark:text-red-400 dark:border-red-800";

impl Alert {
    /// Render the alert as a fragment.
    pub fn into_html(self) -> Markup {
        let Alert { message, details } = self;

        html! {
            div role="alert" class=(ERROR_STYLE)
            {
                div class="flex-1"
                {
                    span class="font-semibold" { (message) }

                    @if !details.is_empty() {
                        p class="mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="font-bold"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        }
    }
}
