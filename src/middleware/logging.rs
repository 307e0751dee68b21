//! Request logging middleware
//!
//! Emits one line when a request arrives and one when it completes, both
//! carrying the request id set by `SetRequestIdLayer` so the pair can be
//! correlated in aggregated logs.

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Generates a UUID v4 request id for every incoming request.
#[derive(Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Log every request with method, path, status and latency.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    info!(
        method = %method,
        uri = %uri,
        request_id = %request_id,
        "Request received"
    );

    let start = Instant::now();
    let response = next.run(request).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let status = response.status();
    if status.is_server_error() {
        error!(
            method = %method,
            uri = %uri,
            request_id = %request_id,
            status = status.as_u16(),
            latency_ms = latency_ms,
            "Request failed"
        );
    } else if status.is_client_error() {
        warn!(
            method = %method,
            uri = %uri,
            request_id = %request_id,
            status = status.as_u16(),
            latency_ms = latency_ms,
            "Request rejected"
        );
    } else {
        info!(
            method = %method,
            uri = %uri,
            request_id = %request_id,
            status = status.as_u16(),
            latency_ms = latency_ms,
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_valid_header_values() {
        let mut maker = UuidRequestId;
        let request = axum::http::Request::builder()
            .uri("/api/checkout")
            .body(())
            .unwrap();

        let id = maker.make_request_id(&request).expect("id generated");
        let value = id.header_value().to_str().expect("ascii header");
        assert_eq!(value.len(), 36);
    }
}
