//! Defines the endpoint for logging in with a username and password.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    app_state::AppState,
    auth::token::issue_token,
    transaction::TransactionStore,
    user::{UserId, get_user_by_username},
};

/// The credentials entered at log-in.
#[derive(Debug, Deserialize)]
pub struct LogInData {
    /// The username entered during log-in.
    pub username: String,
    /// The password entered during log-in.
    pub password: String,
}

/// The public view of a user, returned alongside a freshly issued token.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user's ID.
    pub id: UserId,
    /// The user's username.
    pub username: String,
}

/// The response to a successful log-in or registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The bearer token to present on authenticated requests.
    pub token: String,
    /// The user the token was issued for.
    pub user: UserProfile,
}

/// Handler for log-in requests.
///
/// An unknown username and a wrong password produce the same 401 response so
/// that clients cannot probe which usernames exist.
///
/// # Errors
/// This function will return an error in a few situations.
/// - A credential field is empty.
/// - The username does not belong to a registered user.
/// - The password is not correct.
/// - An internal error occurred when verifying the password.
pub async fn post_log_in<T>(
    State(state): State<AppState<T>>,
    Json(credentials): Json<LogInData>,
) -> Result<Json<AuthResponse>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let username = credentials.username.trim().to_lowercase();
    if username.is_empty() {
        return Err(Error::MissingCredentialField("username"));
    }

    if credentials.password.trim().is_empty() {
        return Err(Error::MissingCredentialField("password"));
    }

    let user = get_user_by_username(&username, &state.db_connection.lock().unwrap()).map_err(
        |error| match error {
            Error::NotFound => Error::InvalidCredentials,
            error => error,
        },
    )?;

    let password_is_correct = user
        .password_hash
        .verify(&credentials.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !password_is_correct {
        return Err(Error::InvalidCredentials);
    }

    let token = issue_token(user.id, state.token_duration, &state.token_keys.encoding)?;

    Ok(Json(AuthResponse {
        token,
        user: UserProfile {
            id: user.id,
            username: user.username,
        },
    }))
}
