//! The navigation bar shown at the top of every page behind the log-in.

use maud::{Markup, html};

use crate::endpoints;

/// A link in the navigation bar. `is_current` highlights the page being shown.
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
}

impl Link<'_> {
    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 text-white bg-blue-700 rounded-sm md:bg-transparent
        md:text-blue-700 md:p-0 dark:text-white md:dark:text-blue-500"
        } else {
            "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
        md:hover:bg-transparent md:border-0 md:hover:text-blue-700 md:p-0
        dark:text-white md:dark:hover:text-blue-500 dark:hover:bg-gray-700
        dark:hover:text-white md:dark:hover:bg-transparent"
        };

        html!(
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                (self.title)
            }
        )
    }
}

/// Render the navigation bar, highlighting the link to `active_endpoint`.
pub fn nav_bar(active_endpoint: &str) -> Markup {
    let links = [
        (endpoints::EXPENSES_VIEW, "Expenses"),
        (endpoints::REPORT_VIEW, "Report"),
        (endpoints::LOG_OUT, "Log out"),
    ]
    .map(|(url, title)| Link {
        url,
        title,
        is_current: url == active_endpoint,
    });

    // Template adapted from https://flowbite.com/docs/components/navbar/#default-navbar
    html!(
        nav class="bg-white border-gray-200 dark:bg-gray-900"
        {
            div
                class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
            {
                a href=(endpoints::ROOT) class="flex items-center space-x-3 rtl:space-x-reverse"
                {
                    img src="/static/favicon-32x32.png" alt="Expense Tracker Logo" class="h-8";

                    span class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                    {
                        "Expense Tracker"
                    }
                }

                ul
                    class="font-medium flex flex-row space-x-8 rtl:space-x-reverse
                    p-0 mt-0 border-0 bg-white dark:bg-gray-900"
                {
                    @for link in links {
                        li { (link.into_html()) }
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::endpoints;

    use super::nav_bar;

    #[test]
    fn marks_only_active_link_as_current() {
        let html = Html::parse_fragment(&nav_bar(endpoints::REPORT_VIEW).into_string());

        let current = Selector::parse("a[aria-current=page]").unwrap();
        let current_links: Vec<_> = html.select(&current).collect();

        assert_eq!(current_links.len(), 1);
        assert_eq!(
            current_links[0].value().attr("href"),
            Some(endpoints::REPORT_VIEW)
        );
    }

    #[test]
    fn includes_log_out_link() {
        let html = Html::parse_fragment(&nav_bar(endpoints::EXPENSES_VIEW).into_string());

        let log_out = Selector::parse(&format!("a[href='{}']", endpoints::LOG_OUT)).unwrap();

        assert_eq!(html.select(&log_out).count(), 1);
    }
}
