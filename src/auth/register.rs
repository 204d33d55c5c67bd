//! The registration page and the handler that creates new user accounts.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{PasswordHash, ValidatedPassword, create_user, set_auth_cookie},
    endpoints,
    error_pages::get_internal_server_error_redirect,
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, base, labelled_input,
        log_in_register, password_input, submit_button,
    },
    timezone::get_local_offset,
};

/// Client-side minimum password length. The server checks strength on top of this.
const PASSWORD_INPUT_MIN_LENGTH: u8 = 12;

pub const DUPLICATE_EMAIL_ERROR_MSG: &str = "This email is already registered.";

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="confirm-password" class=(FORM_LABEL_STYLE) { "Confirm Password" }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()];

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

/// Error messages to show next to each field of the registration form.
#[derive(Default)]
struct FormErrors<'a> {
    name: Option<&'a str>,
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn registration_form(name: &str, email: &str, errors: FormErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            (labelled_input("Name", "name", "text", name, errors.name))
            (labelled_input("Email", "email", "email", email, errors.email))
            (password_input("", PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password))

            (submit_button("Create Account"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE) { "Log in here" }
            }
        }
    }
}

fn render_form_errors(name: &str, email: &str, errors: FormErrors) -> Response {
    registration_form(name, email, errors).into_response()
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let form = registration_form("", "", FormErrors::default());
    let content = log_in_register("Create an account", &form);

    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    pub cookie_key: Key,
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Create a user account and log the new user in.
///
/// Invalid input re-renders the form with a message next to the offending
/// field. On success the client is redirected to the expense list.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let name = user_data.name.trim();
    let raw_email = user_data.email.trim();

    if name.is_empty() {
        return render_form_errors(name, raw_email, FormErrors {
            name: Some("Please enter your name."),
            ..Default::default()
        });
    }

    let email = match EmailAddress::from_str(raw_email) {
        Ok(email) => email,
        Err(error) => {
            let message = format!("Invalid email address: {error}");
            return render_form_errors(name, raw_email, FormErrors {
                email: Some(&message),
                ..Default::default()
            });
        }
    };

    let validated_password = match ValidatedPassword::new(&user_data.password, &[name, raw_email])
    {
        Ok(password) => password,
        Err(error) => {
            let message = error.to_string();
            return render_form_errors(name, raw_email, FormErrors {
                password: Some(&message),
                ..Default::default()
            });
        }
    };

    if user_data.password != user_data.confirm_password {
        return render_form_errors(name, raw_email, FormErrors {
            confirm_password: Some("Passwords do not match"),
            ..Default::default()
        });
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("An error occurred while hashing a password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let user = match state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("Could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| create_user(name, &email, password_hash, &connection))
    {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            return render_form_errors(name, raw_email, FormErrors {
                email: Some(DUPLICATE_EMAIL_ERROR_MSG),
                ..Default::default()
            });
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            return get_internal_server_error_redirect();
        }
    };

    match set_auth_cookie(jar, user.id, state.cookie_duration, local_offset) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");
            get_internal_server_error_redirect()
        }
    }
}


#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        body::Body,
        extract::State,
        http::{Response, StatusCode, header::SET_COOKIE},
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use rusqlite::Connection;
    use sha2::{Digest, Sha512};

    use crate::{
        auth::{DEFAULT_COOKIE_DURATION, create_user_table, get_user_by_email},
        endpoints,
        test_utils::{assert_field_error, assert_hx_redirect, parse_html_fragment},
    };

    use super::{DUPLICATE_EMAIL_ERROR_MSG, RegisterForm, RegistrationState, register_user};

    const STRONG_PASSWORD: &str = "ledger-pineapple-voyage-93";

    fn get_test_state() -> RegistrationState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        RegistrationState {
            cookie_key: Key::from(&Sha512::digest(b"registration tests")),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn form(name: &str, email: &str, password: &str, confirm_password: &str) -> RegisterForm {
        RegisterForm {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            confirm_password: confirm_password.to_owned(),
        }
    }

    async fn post_form(state: RegistrationState, form: RegisterForm) -> Response<Body> {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        register_user(State(state), jar, Form(form)).await
    }

    async fn assert_response_field_error(response: Response<Body>, field_id: &str, want: &str) {
        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;

        assert_field_error(&html, field_id, want);
    }

    #[tokio::test]
    async fn register_creates_user_and_logs_in() {
        let state = get_test_state();

        let response = post_form(
            state.clone(),
            form("Dora", "dora@example.com", STRONG_PASSWORD, STRONG_PASSWORD),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::EXPENSES_VIEW);
        assert!(response.headers().get(SET_COOKIE).is_some());

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_email("dora@example.com", &connection).unwrap();
        assert_eq!(user.name, "Dora");
    }

    #[tokio::test]
    async fn duplicate_email_shows_message() {
        let state = get_test_state();
        post_form(
            state.clone(),
            form("Dora", "dora@example.com", STRONG_PASSWORD, STRONG_PASSWORD),
        )
        .await;

        let response = post_form(
            state,
            form("Other Dora", "Dora@Example.com", STRONG_PASSWORD, STRONG_PASSWORD),
        )
        .await;

        assert_response_field_error(response, "email", DUPLICATE_EMAIL_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let response = post_form(
            get_test_state(),
            form("  ", "dora@example.com", STRONG_PASSWORD, STRONG_PASSWORD),
        )
        .await;

        assert_response_field_error(response, "name", "Please enter your name.").await;
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let response = post_form(
            get_test_state(),
            form("Dora", "not-an-email", STRONG_PASSWORD, STRONG_PASSWORD),
        )
        .await;

        assert_response_field_error(response, "email", "Invalid email address").await;
    }

    #[tokio::test]
    async fn weak_password_is_rejected() {
        let response = post_form(
            get_test_state(),
            form("Dora", "dora@example.com", "password1234", "password1234"),
        )
        .await;

        assert_response_field_error(response, "password", "password is too weak").await;
    }

    #[tokio::test]
    async fn mismatched_passwords_are_rejected() {
        let response = post_form(
            get_test_state(),
            form("Dora", "dora@example.com", STRONG_PASSWORD, "ledger-pineapple"),
        )
        .await;

        assert_response_field_error(response, "confirm-password", "Passwords do not match").await;
    }
}
