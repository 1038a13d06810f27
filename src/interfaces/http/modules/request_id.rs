//! Request ID middleware
//!
//! Assigns a correlation id to every HTTP request before any handler runs,
//! wraps the request in a [`RequestHook`] span so all downstream logs carry
//! the id, and echoes it back in the `X-Request-Id` response header.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

use crate::infrastructure::logging::RequestHook;

/// Header name for the request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that assigns (or propagates) `X-Request-Id`.
///
/// 1. If the incoming request carries a non-empty `X-Request-Id`, reuse it.
/// 2. Otherwise, generate a new UUID v4.
/// 3. Store the ID in request extensions; handlers take it as an explicit
///    `Extension<RequestId>` argument.
/// 4. Run the rest of the request inside a fresh [`RequestHook`] span.
/// 5. Echo `X-Request-Id` in the response headers.
///
/// Never fails the request.
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let hook = RequestHook::new(request_id.clone(), request.method().as_str());

    let mut response = next.run(request).instrument(hook.span()).await;

    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// New-type wrapper for the request ID, stored in request extensions.
///
/// Extract in handlers: `Extension(RequestId(id)): Extension<RequestId>`.
/// A handler reached without it is mis-wired; axum rejects such a request
/// with a 500 before the handler body runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
