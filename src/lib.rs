//! Tally is a small web service for tracking personal income and expenses.
//!
//! The library provides a JSON REST API: clients register, log in with a
//! bearer token, record transactions and query aggregated reports (summary
//! totals, a category breakdown of expenses and a twelve month time series).

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod db;
pub mod endpoints;
mod logging;
mod password;
mod report;
mod routing;
#[cfg(test)]
mod test_utils;
mod timezone;
mod transaction;
mod user;

pub use app_state::{AppState, SqlAppState, create_app_state};
pub use auth::{AuthResponse, TokenKeys, UserProfile, issue_token, verify_token};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::{PasswordHash, ValidatedPassword};
pub use report::{
    CategoryBreakdownReport, CategoryShare, MonthEntry, MonthlySeriesReport, RangeDescriptor,
    RangeError, RangeQuery, ResolvedRange, SummaryReport, breakdown_by_category, monthly_series,
    resolve_range, summarize,
};
pub use routing::build_router;
pub use transaction::{
    CategoryName, DateSpan, SortOrder, SqliteTransactionStore, Transaction, TransactionBuilder,
    TransactionChanges, TransactionKind, TransactionQuery, TransactionStore,
};
pub use user::{User, UserId, get_user_by_id, get_user_by_username, update_password};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The username or password provided at log-in did not match a registered
    /// user.
    ///
    /// The same error is used for an unknown username and a wrong password so
    /// that clients cannot probe which usernames exist.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// A required credential field was empty or missing from the request.
    #[error("{0} is required")]
    MissingCredentialField(&'static str),

    /// The request did not carry a `Authorization: Bearer <token>` header.
    #[error("authorization header missing or malformed")]
    MissingAuthHeader,

    /// The bearer token could not be verified or has expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The token library failed to sign a new token.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// The username chosen at registration is already taken.
    #[error("username already exists")]
    DuplicateUsername,

    /// The username chosen at registration did not pass validation.
    #[error("{0}")]
    InvalidUsername(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A zero or negative amount was used to create or update a transaction.
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(f64),

    /// An empty string was used as a transaction category.
    #[error("category must not be empty")]
    EmptyCategory,

    /// A transaction update request contained no fields to update.
    #[error("no valid fields provided for update")]
    EmptyUpdate,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist or belongs to
    /// another user.
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist or belongs to
    /// another user.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidCredentials | Error::MissingAuthHeader | Error::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            Error::DuplicateUsername => StatusCode::CONFLICT,
            Error::MissingCredentialField(_)
            | Error::InvalidUsername(_)
            | Error::TooWeak(_)
            | Error::NonPositiveAmount(_)
            | Error::EmptyCategory
            | Error::EmptyUpdate => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction => StatusCode::NOT_FOUND,
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "message": "an unexpected error occurred, check the server logs for more details"
                    })),
                )
                    .into_response();
            }
        };

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[test]
    fn validation_errors_map_to_bad_request() {
        let cases = [
            Error::NonPositiveAmount(-1.0),
            Error::EmptyCategory,
            Error::EmptyUpdate,
            Error::TooWeak("too short".to_owned()),
        ];

        for error in cases {
            let response = error.into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn auth_errors_map_to_unauthorized() {
        let cases = [
            Error::InvalidCredentials,
            Error::MissingAuthHeader,
            Error::InvalidToken,
        ];

        for error in cases {
            let response = error.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn sql_errors_are_not_shown_to_the_client() {
        let response = Error::SqlError(rusqlite::Error::InvalidQuery).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unique_username_constraint_maps_to_duplicate_username() {
        let sql_error = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(2067),
            Some("UNIQUE constraint failed: user.username".to_owned()),
        );

        assert_eq!(Error::from(sql_error), Error::DuplicateUsername);
    }
}
