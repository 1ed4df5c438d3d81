//! Request ID middleware for request tracing and correlation.
//!
//! Every response carries an `x-request-id` header. An id supplied by an
//! upstream proxy is reused when it is short and printable; otherwise a new
//! UUID v4 is generated.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest inbound request id accepted verbatim.
const MAX_INBOUND_ID_LENGTH: usize = 128;

/// Middleware that ensures every request has a unique request ID.
///
/// The id is recorded on the `request_id` field of the current tracing span,
/// tagged on the Sentry scope, and echoed in the response headers.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = inbound_request_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", request_id.as_str());

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn inbound_request_id(request: &Request) -> Option<String> {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_INBOUND_ID_LENGTH
                && id.chars().all(|c| c.is_ascii_graphic())
        })
        .map(String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn request_with(id: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/");
        if let Some(id) = id {
            builder = builder.header(REQUEST_ID_HEADER, id);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_reuses_upstream_id() {
        assert_eq!(
            inbound_request_id(&request_with(Some("abc-123"))).as_deref(),
            Some("abc-123")
        );
    }

    #[test]
    fn test_rejects_missing_or_oversized_id() {
        assert!(inbound_request_id(&request_with(None)).is_none());
        assert!(inbound_request_id(&request_with(Some(&"a".repeat(200)))).is_none());
        assert!(inbound_request_id(&request_with(Some("has space"))).is_none());
    }
}
