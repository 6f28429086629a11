//! Issuing and verifying the signed bearer tokens used for authentication.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, user::UserId};

/// How long an issued token stays valid.
pub const TOKEN_DURATION: Duration = Duration::hours(1);

/// The signing and verification keys derived from the server secret.
#[derive(Clone)]
pub struct TokenKeys {
    /// The key for signing new tokens.
    pub encoding: EncodingKey,
    /// The key for verifying presented tokens.
    pub decoding: DecodingKey,
}

impl TokenKeys {
    /// Derive both keys from a shared `secret` string.
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_ref()),
            decoding: DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

/// The claims carried inside a token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// The ID of the authenticated user.
    sub: i64,
    /// The expiry time as a unix timestamp.
    exp: i64,
}

/// Sign a new token for `user_id` that expires after `duration`.
///
/// # Errors
/// Returns [Error::TokenCreation] if the token library fails to sign the
/// token.
pub fn issue_token(
    user_id: UserId,
    duration: Duration,
    encoding_key: &EncodingKey,
) -> Result<String, Error> {
    let claims = Claims {
        sub: user_id.as_i64(),
        exp: (OffsetDateTime::now_utc() + duration).unix_timestamp(),
    };

    encode(&Header::default(), &claims, encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Verify a presented token and extract the user ID it was issued for.
///
/// # Errors
/// Returns [Error::InvalidToken] if the signature does not verify or the
/// token has expired.
pub fn verify_token(token: &str, decoding_key: &DecodingKey) -> Result<UserId, Error> {
    decode::<Claims>(token, decoding_key, &Validation::default())
        .map(|data| UserId::new(data.claims.sub))
        .map_err(|_| Error::InvalidToken)
}

#[cfg(test)]
mod token_tests {
    use time::Duration;

    use crate::{
        Error,
        auth::token::{TokenKeys, issue_token, verify_token},
        user::UserId,
    };

    fn get_keys() -> TokenKeys {
        TokenKeys::from_secret("notsoverysecret")
    }

    #[test]
    fn issued_token_round_trips() {
        let keys = get_keys();
        let user_id = UserId::new(42);

        let token = issue_token(user_id, Duration::hours(1), &keys.encoding).unwrap();
        let got = verify_token(&token, &keys.decoding).unwrap();

        assert_eq!(got, user_id);
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = get_keys();

        // An expiry far enough in the past to be outside the default leeway.
        let token = issue_token(UserId::new(1), Duration::hours(-2), &keys.encoding).unwrap();

        assert_eq!(
            verify_token(&token, &keys.decoding),
            Err(Error::InvalidToken)
        );
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let keys = get_keys();
        let other_keys = TokenKeys::from_secret("adifferentsecret");

        let token = issue_token(UserId::new(1), Duration::hours(1), &other_keys.encoding).unwrap();

        assert_eq!(
            verify_token(&token, &keys.decoding),
            Err(Error::InvalidToken)
        );
    }

    #[test]
    fn garbage_token_is_rejected() {
        let keys = get_keys();

        assert_eq!(
            verify_token("not-even-a-token", &keys.decoding),
            Err(Error::InvalidToken)
        );
    }
}
