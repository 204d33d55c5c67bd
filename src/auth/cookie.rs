//! Reading and writing the encrypted auth cookie.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::{
    Error,
    auth::{Token, UserID},
};

pub(crate) const COOKIE_TOKEN: &str = "token";
/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

fn build_cookie(value: String, expires_at: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((COOKIE_TOKEN, value))
        .expires(expires_at)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .path("/")
        .build()
}

fn add_token(jar: PrivateCookieJar, token: &Token) -> Result<PrivateCookieJar, Error> {
    let value = serde_json::to_string(token).map_err(|error| {
        tracing::error!("Could not serialize auth token: {error}");
        Error::JSONSerializationError(error.to_string())
    })?;

    Ok(jar.add(build_cookie(value, token.expires_at)))
}

/// Add an auth cookie for `user_id` to `jar` that expires `duration` from
/// now, expressed in `local_offset`.
///
/// # Errors
///
/// Returns [Error::InvalidDateFormat] if the expiry overflows and
/// [Error::JSONSerializationError] if the token cannot be serialized.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    let now = OffsetDateTime::now_utc().to_offset(local_offset);
    let expires_at = now.checked_add(duration).ok_or_else(|| {
        Error::InvalidDateFormat("expiry overflowed".to_owned(), format!("{now} + {duration}"))
    })?;

    add_token(
        jar,
        &Token {
            user_id,
            expires_at,
        },
    )
}

/// Replace the auth cookie with an expired, empty one so the browser drops it.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let mut cookie = build_cookie(String::new(), OffsetDateTime::UNIX_EPOCH);
    cookie.set_max_age(Duration::ZERO);

    jar.add(cookie)
}

/// Push the cookie expiry out to `duration` from now, unless it already
/// expires later than that.
///
/// # Errors
///
/// The jar is left untouched on error. Returns [Error::CookieMissing] when
/// there is no valid token in `jar`.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;
    let now = OffsetDateTime::now_utc().to_offset(local_offset);
    let new_expiry = now.checked_add(duration).ok_or_else(|| {
        Error::InvalidDateFormat("expiry overflowed".to_owned(), format!("{now} + {duration}"))
    })?;

    add_token(
        jar,
        &Token {
            user_id: token.user_id,
            expires_at: max(token.expires_at, new_expiry),
        },
    )
}

/// Read the auth token from `jar`.
///
/// # Errors
///
/// Returns [Error::CookieMissing] if there is no auth cookie and
/// [Error::InvalidCredentials] if the token is malformed or expired.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;

    let token: Token = serde_json::from_str(cookie.value_trimmed()).map_err(|error| {
        tracing::debug!("Could not parse auth token: {error}");
        Error::InvalidCredentials
    })?;

    if token.is_expired_at(OffsetDateTime::now_utc()) {
        return Err(Error::InvalidCredentials);
    }

    Ok(token)
}
