//! The user model, the user table and its queries.

use std::fmt::Display;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, password::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The user's unique, lowercased username.
    pub username: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

const USERNAME_MIN_LENGTH: usize = 5;
const USERNAME_MAX_LENGTH: usize = 20;

/// Normalize and validate a raw username.
///
/// Usernames are trimmed, lowercased and must be between 5 and 20 graphemes
/// long.
///
/// # Errors
/// Returns [Error::MissingCredentialField] for an empty username and
/// [Error::InvalidUsername] when the length is out of bounds.
pub fn validate_username(raw_username: &str) -> Result<String, Error> {
    let username = raw_username.trim().to_lowercase();

    if username.is_empty() {
        return Err(Error::MissingCredentialField("username"));
    }

    let length = username.graphemes(true).count();

    if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&length) {
        return Err(Error::InvalidUsername(format!(
            "username must be between {USERNAME_MIN_LENGTH} and {USERNAME_MAX_LENGTH} characters"
        )));
    }

    Ok(username)
}

/// Create the user table.
///
/// # Errors
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// The caller should validate `username` with [validate_username] first.
///
/// # Errors
/// Returns [Error::DuplicateUsername] if the username is taken, or
/// [Error::SqlError] if an SQL related error occurred.
pub fn create_user(
    username: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (username, password) VALUES (?1, ?2)",
        (username, password_hash.as_ref()),
    )?;

    let id = UserId::new(connection.last_insert_rowid());

    Ok(User {
        id,
        username: username.to_owned(),
        password_hash,
    })
}

/// Get the user from the database with the given `username`.
///
/// # Errors
/// This function will return an error if:
/// - `username` does not belong to a registered user.
/// - there was an error trying to access the database.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, username, password FROM user WHERE username = :username")?
        .query_row(&[(":username", &username)], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the database.
pub fn get_user_by_id(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, username, password FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

fn map_user_row(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    let raw_hash: String = row.get(2)?;

    Ok(User {
        id: UserId::new(row.get(0)?),
        username: row.get(1)?,
        password_hash: PasswordHash::new_unchecked(&raw_hash),
    })
}

/// Replace the password hash stored for `user_id`.
///
/// The update runs in a SQL transaction that is rolled back unless exactly
/// one row was changed.
///
/// # Errors
/// Returns [Error::NotFound] if `user_id` does not belong to a registered
/// user, or [Error::SqlError] for any other SQL error.
pub fn update_password(
    user_id: UserId,
    password_hash: &PasswordHash,
    connection: &mut Connection,
) -> Result<(), Error> {
    let transaction = connection.transaction()?;

    let rows_affected = transaction.execute(
        "UPDATE user SET password = ?1 WHERE user.id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected != 1 {
        transaction.rollback()?;
        return Err(Error::NotFound);
    }

    transaction.commit()?;

    Ok(())
}
