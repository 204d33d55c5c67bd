use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

/// Every form in the app submits with `hx-post`.
#[track_caller]
pub(crate) fn assert_hx_post(form: &ElementRef<'_>, endpoint: &str) {
    let hx_post = form.value().attr("hx-post");

    assert_eq!(
        hx_post,
        Some(endpoint),
        "want form with hx-post=\"{endpoint}\", got {hx_post:?}"
    );
}

#[track_caller]
pub(crate) fn must_get_input<'a>(form: &ElementRef<'a>, name: &str) -> ElementRef<'a> {
    let selector = Selector::parse(&format!("input[name='{name}']")).unwrap();

    form.select(&selector)
        .next()
        .unwrap_or_else(|| panic!("No input found with name \"{name}\""))
}

#[track_caller]
fn assert_input(form: &ElementRef<'_>, name: &str, type_: &str, required: bool) {
    let input = must_get_input(form, name);
    let input_type = input.value().attr("type").unwrap_or_default();

    assert_eq!(
        input_type, type_,
        "want input {name} with type \"{type_}\", got {input_type:?}"
    );
    assert_eq!(
        input.value().attr("required").is_some(),
        required,
        "want input {name} required={required}"
    );
}

#[track_caller]
pub(crate) fn assert_required_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    assert_input(form, name, type_, true);
}

/// Inputs like the expense date and description that may be left blank.
#[track_caller]
pub(crate) fn assert_optional_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    assert_input(form, name, type_, false);
}

#[track_caller]
pub(crate) fn assert_submit_button(form: &ElementRef<'_>, text: &str) {
    let submit_button = form
        .select(&Selector::parse("button[type=submit]").unwrap())
        .next()
        .expect("No submit button found");

    let got_text = submit_button.text().collect::<String>();
    assert_eq!(text, got_text.trim());
}

/// Check the red message rendered right after the input with `field_id`.
#[track_caller]
pub(crate) fn assert_field_error(html: &Html, field_id: &str, want: &str) {
    let selector = Selector::parse(&format!("#{field_id} + p.text-red-500")).unwrap();
    let message = html
        .select(&selector)
        .next()
        .unwrap_or_else(|| panic!("no error message after #{field_id}"))
        .text()
        .collect::<String>();

    assert!(
        message.contains(want),
        "want error containing {want:?}, got {message:?}"
    );
}
