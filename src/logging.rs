//! Middleware for logging requests and responses.

use axum::{extract::Request, http::header::CONTENT_TYPE, middleware::Next, response::Response};

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body logged at the `debug` level. Password fields in JSON
/// request bodies are redacted before logging.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (headers, body_text) = extract_header_and_body_text_from_request(request).await;

    let is_json = headers
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if is_json {
        log_request(&headers, &redact_json_string_field(&body_text, "password"));
    } else {
        log_request(&headers, &body_text);
    }

    let request = Request::from_parts(headers, body_text.into());
    let response = next.run(request).await;

    let (headers, body_text) = extract_header_and_body_text_from_response(response).await;
    log_response(&headers, &body_text);

    Response::from_parts(headers, body_text.into())
}

/// Replace the string value of `field_name` in a JSON object with asterisks.
///
/// Works on the raw body text rather than a parsed document so that even
/// requests with invalid JSON get redacted before logging.
fn redact_json_string_field(body_text: &str, field_name: &str) -> String {
    let needle = format!("\"{field_name}\"");

    let Some(key_position) = body_text.find(&needle) else {
        return body_text.to_owned();
    };

    let after_key = &body_text[key_position + needle.len()..];
    let Some(colon_offset) = after_key.find(':') else {
        return body_text.to_owned();
    };
    let after_colon = &after_key[colon_offset + 1..];
    let Some(quote_offset) = after_colon.find('"') else {
        return body_text.to_owned();
    };

    let value_start = after_colon[quote_offset + 1..].char_indices();
    let mut escaped = false;
    for (offset, character) in value_start {
        if escaped {
            escaped = false;
            continue;
        }

        match character {
            '\\' => escaped = true,
            '"' => {
                // Byte offsets of the value inside the original text.
                let start = key_position
                    + needle.len()
                    + colon_offset
                    + 1
                    + quote_offset
                    + 1;
                let end = start + offset;

                return format!("{}********{}", &body_text[..start], &body_text[end..]);
            }
            _ => {}
        }
    }

    body_text.to_owned()
}

async fn extract_header_and_body_text_from_request(
    request: Request,
) -> (axum::http::request::Parts, String) {
    let (headers, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

async fn extract_header_and_body_text_from_response(
    response: Response,
) -> (axum::http::response::Parts, String) {
    let (headers, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

/// The maximum number of body bytes to log at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {headers:#?}\nbody: {:}...",
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {headers:#?}\nbody: {:}...",
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {headers:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod redaction_tests {
    use super::redact_json_string_field;

    #[test]
    fn redacts_the_password_value() {
        let body = r#"{"username":"alicesmith","password":"hunter2"}"#;

        let got = redact_json_string_field(body, "password");

        assert_eq!(got, r#"{"username":"alicesmith","password":"********"}"#);
    }

    #[test]
    fn leaves_bodies_without_the_field_unchanged() {
        let body = r#"{"amount":12.5,"category":"food"}"#;

        assert_eq!(redact_json_string_field(body, "password"), body);
    }

    #[test]
    fn handles_escaped_quotes_inside_the_value() {
        let body = r#"{"password":"hun\"ter2","username":"alicesmith"}"#;

        let got = redact_json_string_field(body, "password");

        assert_eq!(got, r#"{"password":"********","username":"alicesmith"}"#);
    }

    #[test]
    fn leaves_unterminated_bodies_unchanged() {
        let body = r#"{"password":"hunter2"#;

        assert_eq!(redact_json_string_field(body, "password"), body);
    }
}
