//! Where to send a user after they log in.
//!
//! Only same-site relative paths are accepted so that the `redirect_url`
//! parameter cannot be used to bounce users to another site.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map_or(redirect_url, |(path, _)| path);

    path != endpoints::LOG_IN_VIEW && !path.starts_with("/api/")
}

/// Reduce `raw_url` to a local path and query, or `None` if it points
/// elsewhere or back at the log-in page.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    let path_and_query = uri.path_and_query()?.as_str();
    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// The log-in URL for a request that was refused by the auth guard.
///
/// Page requests return to their own URL. HTMX requests to `/api` return to
/// the page that issued them, taken from the `HX-Current-URL` header.
/// Falls back to the expense list when neither gives a usable target.
pub fn build_log_in_redirect_url(request: &Request) -> String {
    let target = if request.uri().path().starts_with("/api") {
        redirect_target_from_hx_request(request)
    } else {
        request
            .uri()
            .path_and_query()
            .and_then(|path_and_query| normalize_redirect_url(path_and_query.as_str()))
    };

    let target = target.unwrap_or_else(|| {
        tracing::debug!(
            "No usable redirect target for {}, using the expense list.",
            request.uri()
        );
        endpoints::EXPENSES_VIEW.to_owned()
    });

    build_log_in_redirect_url_from_target(&target)
}

pub(crate) fn build_log_in_redirect_url_from_target(redirect_target: &str) -> String {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => format!("{}?{}", endpoints::LOG_IN_VIEW, param),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}");
            endpoints::LOG_IN_VIEW.to_owned()
        }
    }
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        tracing::warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let current_url = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())?;

    // HX-Current-URL is absolute, so only keep its path and query.
    let uri = current_url.parse::<Uri>().ok()?;
    let redirect_url = uri
        .path_and_query()
        .map(|path_and_query| path_and_query.as_str())
        .filter(|path_and_query| is_safe_redirect_url(path_and_query))
        .map(str::to_owned);

    if redirect_url.is_none() {
        tracing::warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, extract::Request};

    use crate::endpoints;

    use super::{build_log_in_redirect_url, normalize_redirect_url};

    #[test]
    fn keeps_local_path_and_query() {
        assert_eq!(
            normalize_redirect_url("/report?month=2026-03"),
            Some("/report?month=2026-03".to_owned())
        );
    }

    #[test]
    fn rejects_other_sites_and_log_in_loops() {
        assert_eq!(normalize_redirect_url("https://evil.example/expenses"), None);
        assert_eq!(normalize_redirect_url("//evil.example/expenses"), None);
        assert_eq!(normalize_redirect_url("expenses"), None);
        assert_eq!(normalize_redirect_url(endpoints::LOG_IN_VIEW), None);
        assert_eq!(normalize_redirect_url("/api/expenses"), None);
    }

    #[test]
    fn page_request_redirects_back_to_itself() {
        let request = Request::get("/report").body(Body::empty()).unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            "/log_in?redirect_url=%2Freport"
        );
    }

    #[test]
    fn hx_request_uses_current_url() {
        let request = Request::post("/api/expenses")
            .header("hx-request", "true")
            .header("hx-current-url", "http://localhost:3000/expenses/4/edit")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            "/log_in?redirect_url=%2Fexpenses%2F4%2Fedit"
        );
    }

    #[test]
    fn api_request_without_htmx_falls_back_to_expense_list() {
        let request = Request::post("/api/expenses").body(Body::empty()).unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            "/log_in?redirect_url=%2Fexpenses"
        );
    }
}
