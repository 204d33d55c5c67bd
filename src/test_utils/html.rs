use axum::{body::Body, response::Response};
use scraper::{Html, Selector};

use crate::test_utils::http::response_bytes;

async fn response_text(response: Response<Body>) -> String {
    String::from_utf8_lossy(&response_bytes(response).await).into_owned()
}

/// Parse a full page such as the expense list or the report.
pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    Html::parse_document(&response_text(response).await)
}

/// Parse an HTMX swap such as a re-rendered form or an alert.
pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    Html::parse_fragment(&response_text(response).await)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

#[track_caller]
pub(crate) fn count_matches(html: &Html, selector: &str) -> usize {
    let parsed = Selector::parse(selector).unwrap_or_else(|_| panic!("bad selector {selector}"));

    html.select(&parsed).count()
}

/// The trimmed text of the first element matching `selector`.
#[track_caller]
pub(crate) fn selected_text(html: &Html, selector: &str) -> String {
    let parsed = Selector::parse(selector).unwrap_or_else(|_| panic!("bad selector {selector}"));

    html.select(&parsed)
        .next()
        .unwrap_or_else(|| panic!("nothing matches {selector}"))
        .text()
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Check the alert shown at the top of the expense list for a `notice` query.
#[track_caller]
pub(crate) fn assert_notice(html: &Html, want: &str) {
    let text = selected_text(html, "#notice [role=alert]");

    assert!(text.contains(want), "want notice containing {want:?}, got {text:?}");
}
