#![allow(missing_docs)]
//! Helpers shared by the endpoint tests.

use axum::{body::Body, http::Response};
use serde::de::DeserializeOwned;

/// Read a response body to completion and parse it as JSON.
pub(crate) async fn parse_json_body<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("could not read response body");

    serde_json::from_slice(&bytes).expect("could not parse response body as JSON")
}
