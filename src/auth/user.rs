//! Registered users and the `usuarios` table.

use std::fmt::Display;

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from expense IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Wrap a raw `usuarios.id` value.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw ID for use in SQL parameters.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The primary key in `usuarios`.
    pub id: UserID,
    /// The display name shown on reports.
    pub name: String,
    /// The address used to log in, stored trimmed and in lowercase.
    pub email: EmailAddress,
    /// The bcrypt hash of the user's password.
    pub password_hash: PasswordHash,
    /// When the account was created, in UTC.
    pub registered_at: OffsetDateTime,
}

/// Create the `usuarios` table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS usuarios (
                id INTEGER PRIMARY KEY,
                nome TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                senha TEXT NOT NULL,
                data_cadastro TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Normalise an email address for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns:
/// - [Error::EmptyName] if `name` is blank,
/// - [Error::DuplicateEmail] if another user already has `email`,
/// - [Error::SqlError] for any other SQL error.
pub fn create_user(
    name: &str,
    email: &EmailAddress,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    let email = EmailAddress::new_unchecked(normalize_email(email.as_str()));
    let registered_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO usuarios (nome, email, senha, data_cadastro) VALUES (?1, ?2, ?3, ?4)",
        (name, email.as_str(), password_hash.as_str(), registered_at),
    )?;

    let id = UserID::new(connection.last_insert_rowid());
    tracing::info!("Registered user {id}");

    Ok(User {
        id,
        name: name.to_owned(),
        email,
        password_hash,
        registered_at,
    })
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let email: String = row.get(2)?;
    let password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        name: row.get(1)?,
        email: EmailAddress::new_unchecked(email),
        password_hash: PasswordHash::from_stored(password_hash),
        registered_at: row.get(4)?,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user ([Error::NotFound]),
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, nome, email, senha, data_cadastro FROM usuarios WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user registered with `email`. The lookup ignores case and
/// surrounding whitespace.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has that email.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, nome, email, senha, data_cadastro FROM usuarios WHERE email = :email")?
        .query_row(&[(":email", &normalize_email(email))], map_user_row)
        .map_err(|error| error.into())
}
