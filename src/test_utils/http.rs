use axum::{
    body::{Body, Bytes},
    http::StatusCode,
    response::Response,
};

pub(crate) async fn response_bytes(response: Response<Body>) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not get response body")
}

#[track_caller]
pub(crate) fn get_header(response: &Response<Body>, header_name: &str) -> String {
    response
        .headers()
        .get(header_name)
        .unwrap_or_else(|| panic!("Headers missing {header_name}"))
        .to_str()
        .expect("Could not convert to str")
        .to_owned()
}

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    assert_eq!(get_header(response, "content-type"), content_type);
}

/// Redirect used by the HTMX endpoints.
#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    assert_eq!(get_header(response, "hx-redirect"), endpoint);
}

/// Plain "303 See Other" redirect used by page handlers.
#[track_caller]
pub(crate) fn assert_redirect(response: &Response<Body>, location: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(get_header(response, "location"), location);
}

/// Check the headers of a PDF report download.
#[track_caller]
pub(crate) fn assert_pdf_attachment(response: &Response<Body>, filename: &str) {
    assert_eq!(response.status(), StatusCode::OK);
    assert_content_type(response, "application/pdf");
    assert_eq!(
        get_header(response, "content-disposition"),
        format!("attachment; filename=\"{filename}\"")
    );
}

#[track_caller]
pub(crate) fn assert_is_pdf(bytes: &[u8]) {
    assert!(
        bytes.starts_with(b"%PDF"),
        "want PDF magic bytes, got {:?}",
        &bytes[..bytes.len().min(8)]
    );
}
