//! Authentication middleware that validates bearer tokens.

use axum::{
    RequestPartsExt,
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::DecodingKey;

use crate::{Error, app_state::AppState, auth::token::verify_token, transaction::TransactionStore};

/// The state needed for the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    /// The key for verifying presented tokens.
    pub decoding_key: DecodingKey,
}

impl<T> FromRef<AppState<T>> for AuthState
where
    T: TransactionStore + Clone + Send + Sync,
{
    fn from_ref(state: &AppState<T>) -> Self {
        Self {
            decoding_key: state.token_keys.decoding.clone(),
        }
    }
}

/// Middleware function that checks for a valid `Authorization: Bearer` header.
///
/// The user ID is placed into the request and then the request executed
/// normally if the token is valid, otherwise a 401 response is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(user_id): Extension<UserId>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let bearer = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
        Ok(TypedHeader(Authorization(bearer))) => bearer,
        Err(_) => return Error::MissingAuthHeader.into_response(),
    };

    let user_id = match verify_token(bearer.token(), &state.decoding_key) {
        Ok(user_id) => user_id,
        Err(error) => return error.into_response(),
    };

    parts.extensions.insert(user_id);

    next.run(Request::from_parts(parts, body)).await
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{Extension, Json, Router, middleware, routing::get};
    use axum_test::TestServer;
    use time::Duration;

    use crate::{
        auth::{
            middleware::{AuthState, auth_guard},
            token::{TokenKeys, issue_token},
        },
        user::UserId,
    };

    async fn whoami(Extension(user_id): Extension<UserId>) -> Json<UserId> {
        Json(user_id)
    }

    fn get_test_server(keys: &TokenKeys) -> TestServer {
        let state = AuthState {
            decoding_key: keys.decoding.clone(),
        };
        let app = Router::new()
            .route("/protected", get(whoami))
            .route_layer(middleware::from_fn_with_state(state, auth_guard));

        TestServer::try_new(app).expect("Could not create test server")
    }

    #[tokio::test]
    async fn request_with_valid_token_reaches_the_handler() {
        let keys = TokenKeys::from_secret("notsoverysecret");
        let server = get_test_server(&keys);
        let user_id = UserId::new(7);
        let token = issue_token(user_id, Duration::hours(1), &keys.encoding).unwrap();

        let response = server
            .get("/protected")
            .authorization_bearer(token)
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<UserId>(), user_id);
    }

    #[tokio::test]
    async fn request_without_header_is_unauthorized() {
        let keys = TokenKeys::from_secret("notsoverysecret");
        let server = get_test_server(&keys);

        server.get("/protected").await.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn request_with_tampered_token_is_unauthorized() {
        let keys = TokenKeys::from_secret("notsoverysecret");
        let server = get_test_server(&keys);
        let other_keys = TokenKeys::from_secret("adifferentsecret");
        let token = issue_token(UserId::new(7), Duration::hours(1), &other_keys.encoding).unwrap();

        server
            .get("/protected")
            .authorization_bearer(token)
            .await
            .assert_status_unauthorized();
    }
}
