//! Assertions shared by the handler and page tests.

#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use form::{
    assert_field_error, assert_hx_post, assert_optional_input, assert_required_input,
    assert_submit_button, must_get_form, must_get_input,
};
pub(crate) use html::{
    assert_notice, assert_valid_html, count_matches, parse_html_document, parse_html_fragment,
    selected_text,
};
pub(crate) use http::{
    assert_content_type, assert_hx_redirect, assert_is_pdf, assert_pdf_attachment,
    assert_redirect, get_header, response_bytes,
};
