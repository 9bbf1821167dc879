//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{StatusCode, request, response},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::Error;

/// The number of bytes of a request or response body to log at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest request body that is read for logging, the same as axum's
/// default body limit.
pub const MAX_REQUEST_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_text = match read_body_text(body, MAX_REQUEST_BODY_SIZE).await {
        Ok(body_text) => body_text,
        Err(error) => {
            tracing::warn!("Could not read request body: {error}");
            return Error::InvalidParameters(error).into_response();
        }
    };
    log_request(&parts, &body_text);

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_text = match read_body_text(body, usize::MAX).await {
        Ok(body_text) => body_text,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_response(&parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

async fn read_body_text(body: Body, limit: usize) -> Result<String, String> {
    let body_bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|error| error.to_string())?;

    Ok(String::from_utf8_lossy(&body_bytes).to_string())
}

/// Shorten `text` to at most [LOG_BODY_LENGTH_LIMIT] bytes without splitting a
/// character.
fn truncate_body(text: &str) -> &str {
    if text.len() <= LOG_BODY_LENGTH_LIMIT {
        return text;
    }

    let mut end = LOG_BODY_LENGTH_LIMIT;

    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

fn log_request(parts: &request::Parts, body: &str) {
    let method = &parts.method;
    let uri = &parts.uri;

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("Received request: {method} {uri}\nbody: {:}...", truncate_body(body));
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {method} {uri}\nbody: {body:?}");
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    let status = parts.status;

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("Sending response: {status}\nbody: {:}...", truncate_body(body));
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {status}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod logging_tests {
    use axum::{Router, http::StatusCode, middleware, routing::post};
    use axum_test::TestServer;
    use serde_json::Value;

    use super::{LOG_BODY_LENGTH_LIMIT, MAX_REQUEST_BODY_SIZE, logging_middleware, truncate_body};

    #[test]
    fn short_bodies_are_not_truncated() {
        assert_eq!(truncate_body("action=list"), "action=list");
    }

    #[test]
    fn long_bodies_are_truncated_to_limit() {
        let body = "a".repeat(LOG_BODY_LENGTH_LIMIT * 2);

        assert_eq!(truncate_body(&body).len(), LOG_BODY_LENGTH_LIMIT);
    }

    #[test]
    fn truncation_does_not_split_characters() {
        // 'ä' is two bytes, so the limit falls in the middle of one.
        let body = format!("a{}", "ä".repeat(LOG_BODY_LENGTH_LIMIT));

        let got = truncate_body(&body);

        assert_eq!(got.len(), LOG_BODY_LENGTH_LIMIT - 1);
        assert!(body.starts_with(got));
    }

    #[tokio::test]
    async fn middleware_passes_bodies_through() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app);
        let body = "name=Äpfel&".repeat(20);

        let response = server.post("/echo").text(body.clone()).await;

        response.assert_status_ok();
        assert_eq!(response.text(), body);
    }

    #[tokio::test]
    async fn oversized_request_body_is_rejected() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app);

        let response = server
            .post("/echo")
            .text("a".repeat(MAX_REQUEST_BODY_SIZE + 1))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        let message = body["error"].as_str().unwrap_or_default();
        assert!(
            message.starts_with("Could not parse the request parameters"),
            "got {body}"
        );
    }
}
