//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, Method, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of bytes of a body logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Passwords in submitted forms are redacted and binary bodies such as PDF
/// reports are summarized by their length.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(response) => return response,
    };

    let body_text = body_to_text(&parts.headers, &body_bytes);
    let display_text = if parts.method == Method::POST && is_form(&parts.headers) {
        let redacted = redact_password(&body_text, "password");
        redact_password(&redacted, "confirm_password")
    } else {
        body_text
    };
    log_body("Received request", &format!("{parts:#?}"), &display_text);

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(response) => return response,
    };
    log_body(
        "Sending response",
        &format!("{parts:#?}"),
        &body_to_text(&parts.headers, &body_bytes),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn read_body(body: Body) -> Result<Bytes, Response> {
    axum::body::to_bytes(body, usize::MAX).await.map_err(|error| {
        tracing::error!("Could not read body: {error}");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

fn is_text(headers: &HeaderMap) -> bool {
    match headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    {
        Some(content_type) => {
            content_type.starts_with("text/")
                || content_type.starts_with("application/json")
                || content_type.starts_with("application/x-www-form-urlencoded")
        }
        None => true,
    }
}

fn body_to_text(headers: &HeaderMap, body: &Bytes) -> String {
    if !is_text(headers) {
        return format!("<{} bytes of binary data>", body.len());
    }

    match std::str::from_utf8(body) {
        Ok(text) => text.to_owned(),
        Err(_) => format!("<{} bytes of binary data>", body.len()),
    }
}

fn redact_password(form_text: &str, field_name: &str) -> String {
    let needle = format!("{field_name}=");

    let start = match form_text
        .match_indices(&needle)
        .find(|(index, _)| *index == 0 || form_text.as_bytes()[index - 1] == b'&')
    {
        Some((index, _)) => index,
        None => return form_text.to_owned(),
    };

    let end = form_text[start..]
        .find('&')
        .map(|offset| start + offset)
        .unwrap_or(form_text.len());

    format!(
        "{}{needle}********{}",
        &form_text[..start],
        &form_text[end..]
    )
}

/// Cut `text` to at most [LOG_BODY_LENGTH_LIMIT] bytes on a character boundary.
fn truncate(text: &str) -> &str {
    if text.len() <= LOG_BODY_LENGTH_LIMIT {
        return text;
    }

    let mut end = LOG_BODY_LENGTH_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

fn log_body(message: &str, headers: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("{message}: {headers}\nbody: {}...", truncate(body));
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{message}: {headers}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Bytes,
        http::{HeaderMap, HeaderValue, header::CONTENT_TYPE},
    };

    use super::{LOG_BODY_LENGTH_LIMIT, body_to_text, redact_password, truncate};

    #[test]
    fn redacts_password_fields() {
        let form = "email=eva%40example.com&password=hunter2&confirm_password=hunter2";

        let redacted = redact_password(&redact_password(form, "password"), "confirm_password");

        assert_eq!(
            redacted,
            "email=eva%40example.com&password=********&confirm_password=********"
        );
    }

    #[test]
    fn leaves_forms_without_passwords_alone() {
        let form = "amount=12.50&category=food";

        assert_eq!(redact_password(form, "password"), form);
    }

    #[test]
    fn summarizes_pdf_bodies() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/pdf"));

        let text = body_to_text(&headers, &Bytes::from_static(b"%PDF-1.3 binary"));

        assert_eq!(text, "<15 bytes of binary data>");
    }

    #[test]
    fn truncates_on_char_boundary() {
        let text = "é".repeat(LOG_BODY_LENGTH_LIMIT);

        let truncated = truncate(&text);

        assert!(truncated.len() <= LOG_BODY_LENGTH_LIMIT);
        assert!(text.starts_with(truncated));
    }
}
