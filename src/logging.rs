//! Middleware for logging requests and responses.

use axum::{
    extract::Request,
    http::{HeaderValue, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level. If a body is
/// longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated and the full
/// body logged at the `debug` level. The bearer credential in the
/// `Authorization` header is redacted before logging.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    let body_text = String::from_utf8_lossy(&body_bytes).to_string();

    let display_headers = redact_authorization(&parts.headers);
    log_payload(
        "Received request",
        &format!("{} {} {display_headers:?}", parts.method, parts.uri),
        &body_text,
    );

    let request = Request::from_parts(parts, body_bytes.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    let body_text = String::from_utf8_lossy(&body_bytes).to_string();

    log_payload(
        "Sending response",
        &format!("{} {:?}", parts.status, parts.headers),
        &body_text,
    );

    Response::from_parts(parts, body_bytes.into())
}

/// A copy of the headers with the bearer credential replaced by asterisks.
fn redact_authorization(headers: &axum::http::HeaderMap) -> axum::http::HeaderMap {
    let mut redacted = headers.clone();

    if redacted.contains_key(AUTHORIZATION) {
        redacted.insert(AUTHORIZATION, HeaderValue::from_static("Bearer ********"));
    }

    redacted
}

fn log_payload(direction: &str, summary: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("{direction}: {summary}\nbody: {}...", truncate_body(body));
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{direction}: {summary}\nbody: {body:?}");
    }
}

/// The leading [LOG_BODY_LENGTH_LIMIT] bytes of `body`, backed off to the
/// nearest character boundary so multibyte text does not split mid-character.
fn truncate_body(body: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(body.len());

    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}
