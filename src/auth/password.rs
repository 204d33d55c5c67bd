//! Password strength checks and bcrypt hashing for user accounts.

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A plain text password that passed the strength check but has not been hashed yet.
#[derive(Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Check the strength of `raw_password`.
    ///
    /// `user_inputs` are strings the user entered elsewhere in the form, such
    /// as their name and email. Passwords built from them, their words, or an
    /// email's local part are penalised.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] with suggestions from zxcvbn if the password
    /// scores below three.
    pub fn new(raw_password: &str, user_inputs: &[&str]) -> Result<Self, Error> {
        let expanded_inputs = expand_user_inputs(user_inputs);
        let inputs: Vec<&str> = expanded_inputs.iter().map(String::as_str).collect();
        let analysis = zxcvbn(raw_password, &inputs);

        match analysis.score() {
            Score::Three | Score::Four => Ok(Self(raw_password.to_owned())),
            _ => Err(Error::TooWeak(
                analysis
                    .feedback()
                    .unwrap_or(&Feedback::default())
                    .to_string(),
            )),
        }
    }

    /// Skip the strength check. Intended for seeding test databases.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_owned())
    }
}

/// Break user inputs into the tokens zxcvbn should treat as known words.
///
/// zxcvbn only matches whole dictionary entries, so "Maria Silva" alone does
/// not catch "mariasilva". Each input contributes its lowercase form, its
/// words, the words joined together and, for emails, the local part.
fn expand_user_inputs(user_inputs: &[&str]) -> Vec<String> {
    let mut tokens = Vec::new();

    for input in user_inputs {
        let input = input.trim().to_lowercase();
        if input.is_empty() {
            continue;
        }

        if let Some((local_part, _)) = input.split_once('@') {
            tokens.push(local_part.to_owned());
        }

        let words: Vec<&str> = input
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect();
        if words.len() > 1 {
            tokens.push(words.concat());
        }
        tokens.extend(words.iter().map(|word| (*word).to_owned()));
        tokens.push(input);
    }

    tokens.sort();
    tokens.dedup();
    tokens
}

impl std::fmt::Debug for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ValidatedPassword(********)")
    }
}

/// A salted bcrypt hash, as stored in the `senha` column.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default encryption cost for hashing passwords.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with `cost` rounds. Tests use the minimum cost of 4 to stay fast.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if bcrypt fails.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap a hash loaded from the database.
    pub fn from_stored(stored_hash: String) -> Self {
        Self(stored_hash)
    }

    /// Check whether `raw_password` produces this hash.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }

    /// The hash as stored in the database.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
