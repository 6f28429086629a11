//! Defines the endpoint for registering a new user.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::{
    Error,
    app_state::AppState,
    auth::{
        log_in::{AuthResponse, UserProfile},
        token::issue_token,
    },
    password::PasswordHash,
    transaction::TransactionStore,
    user::{create_user, validate_username},
};

/// The details entered at registration.
#[derive(Debug, Deserialize)]
pub struct RegisterData {
    /// The desired username.
    pub username: String,
    /// The desired password.
    pub password: String,
}

/// Handler for registration requests.
///
/// Answers 201 with a freshly issued token on success, so that clients can
/// start making authenticated requests without a separate log-in.
///
/// # Errors
/// This function will return an error if:
/// - the username is empty, too short or too long,
/// - the password is too weak,
/// - the username is already taken.
pub async fn register_user<T>(
    State(state): State<AppState<T>>,
    Json(details): Json<RegisterData>,
) -> Result<(StatusCode, Json<AuthResponse>), Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let username = validate_username(&details.username)?;
    let password_hash = PasswordHash::from_raw_password(&details.password, PasswordHash::DEFAULT_COST)?;

    let user = create_user(
        &username,
        password_hash,
        &state.db_connection.lock().unwrap(),
    )?;

    let token = issue_token(user.id, state.token_duration, &state.token_keys.encoding)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserProfile {
                id: user.id,
                username: user.username,
            },
        }),
    ))
}
