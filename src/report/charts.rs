//! ECharts options for the report page.
//!
//! Charts are serialized as JSON and drawn by the browser, so nothing is
//! written to disk on the server.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisType, JsFunction, Label, Tooltip, Trigger},
    series::{Pie, bar},
};
use maud::{Markup, PreEscaped, html};

use crate::{currency::CurrencyFormat, html::HeadElement, report::aggregation::ExpenseSummary};

/// A report chart with its HTML container ID and ECharts configuration.
pub(super) struct ReportChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Build the bar and pie charts for `summary`.
pub(super) fn build_report_charts(
    summary: &ExpenseSummary,
    currency: &CurrencyFormat,
) -> [ReportChart; 2] {
    [
        ReportChart {
            id: "category-bar-chart",
            options: category_bar_chart(summary, currency).to_string(),
        },
        ReportChart {
            id: "category-pie-chart",
            options: category_pie_chart(summary).to_string(),
        },
    ]
}

pub(super) fn charts_view(charts: &[ReportChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Initializes each chart once the page has loaded, following the browser's
/// dark mode setting.
pub(super) fn charts_script(charts: &[ReportChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// One bar per category, in the order categories first appear.
pub fn category_bar_chart(summary: &ExpenseSummary, currency: &CurrencyFormat) -> Chart {
    let (labels, values): (Vec<String>, Vec<f64>) = summary
        .by_category
        .iter()
        .map(|category_total| (category_total.category.clone(), category_total.total))
        .unzip();

    Chart::new()
        .title(Title::new().text("Spending by category"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .value_formatter(currency_formatter(currency)),
        )
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter(currency))),
        )
        .series(bar::Bar::new().name("Total").data(values))
}

/// One slice per category sized by its share of the grand total.
pub fn category_pie_chart(summary: &ExpenseSummary) -> Chart {
    let data: Vec<(f64, String)> = summary
        .category_percentages()
        .into_iter()
        .map(|share| (share.percentage, share.category))
        .collect();

    Chart::new()
        .title(Title::new().text("Share by category"))
        .tooltip(Tooltip::new().trigger(Trigger::Item).formatter("{b}: {c}%"))
        .legend(Legend::new().bottom("1%"))
        .series(
            Pie::new()
                .name("Share")
                .radius("60%")
                .label(Label::new().show(true).formatter("{b}: {c}%"))
                .data(data),
        )
}

/// Formats axis and tooltip values with the configured currency symbol.
fn currency_formatter(currency: &CurrencyFormat) -> JsFunction {
    let symbol = currency.symbol.replace('\\', "\\\\").replace('\'', "\\'");
    let locale = if currency.decimal_comma { "de-DE" } else { "en-US" };

    JsFunction::new_with_args(
        "number",
        &format!(
            "const numberFormatter = new Intl.NumberFormat('{locale}', {{
                  minimumFractionDigits: 2,
                  maximumFractionDigits: 2
                }});
                return (number || number === 0) ? '{symbol}' + numberFormatter.format(number) : \"-\";"
        ),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use time::macros::date;

    use crate::{
        currency::CurrencyFormat,
        expense::Expense,
        report::aggregation::{ExpenseSummary, summarize},
    };

    use super::{build_report_charts, category_bar_chart, category_pie_chart};

    fn sample_summary() -> ExpenseSummary {
        summarize(&[
            Expense::build(30.0, date!(2024 - 02 - 10), "food", "").finalize(1),
            Expense::build(20.0, date!(2024 - 01 - 05), "transport", "").finalize(2),
            Expense::build(50.0, date!(2024 - 02 - 20), "leisure", "").finalize(3),
        ])
    }

    /// Find every JSON object under `value` that has a "name" field equal to `name`.
    fn find_named<'a>(value: &'a Value, name: &str, found: &mut Vec<&'a Value>) {
        match value {
            Value::Object(map) => {
                if map.get("name").and_then(Value::as_str) == Some(name) {
                    found.push(value);
                }
                map.values().for_each(|child| find_named(child, name, found));
            }
            Value::Array(items) => items.iter().for_each(|child| find_named(child, name, found)),
            _ => {}
        }
    }

    fn contains_text(value: &Value, text: &str) -> bool {
        match value {
            Value::String(string) => string == text,
            Value::Object(map) => map.values().any(|child| contains_text(child, text)),
            Value::Array(items) => items.iter().any(|child| contains_text(child, text)),
            _ => false,
        }
    }

    #[test]
    fn bar_chart_has_one_bar_per_category() {
        let options =
            serde_json::to_value(category_bar_chart(&sample_summary(), &CurrencyFormat::default()))
                .unwrap();

        assert!(contains_text(&options, "Spending by category"));
        for category in ["food", "transport", "leisure"] {
            assert!(contains_text(&options, category), "missing {category}");
        }
        let mut bars = Vec::new();
        find_named(&options, "Total", &mut bars);
        let data = bars[0]["data"].as_array().unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data[2].as_f64(), Some(50.0));
    }

    #[test]
    fn pie_chart_slices_are_percentages() {
        let options = serde_json::to_value(category_pie_chart(&sample_summary())).unwrap();

        assert!(contains_text(&options, "Share by category"));

        let mut slices = Vec::new();
        find_named(&options, "leisure", &mut slices);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0]["value"].as_f64(), Some(50.0));
    }

    #[test]
    fn chart_ids_are_unique() {
        let charts = build_report_charts(&sample_summary(), &CurrencyFormat::default());

        assert_ne!(charts[0].id, charts[1].id);
    }
}
