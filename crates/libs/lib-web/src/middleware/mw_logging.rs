//! # Request/Response Logging Middleware
//!
//! One `[REQUEST]` line when a request arrives and one `[RESPONSE]` line when
//! it completes, tagged with the request id from [`RequestStamp`](super::RequestStamp).
//! Sensitive headers are redacted before they reach the debug log.

use super::mw_req_stamp::request_id;
use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Headers whose values never reach the logs
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "x-api-key",
    "x-auth-token",
    "sec-websocket-key",
];

const REDACTED: &str = "***REDACTED***";

fn sanitized_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            if SENSITIVE_HEADERS.iter().any(|h| name_lower.contains(h)) {
                Some((name.to_string(), REDACTED.to_string()))
            } else {
                value.to_str().ok().map(|v| (name.to_string(), v.to_string()))
            }
        })
        .collect()
}

pub async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(|q| q.to_string());
    let request_id = request_id(&req);
    let is_upgrade = req.headers().contains_key("upgrade");

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        query = ?query,
        upgrade = is_upgrade,
        "[REQUEST] {} {}",
        method,
        path
    );
    debug!(
        request_id = %request_id,
        headers = ?sanitized_headers(req.headers()),
        "[REQUEST HEADERS]"
    );

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    let status = response.status();

    if status.is_server_error() {
        error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms,
            "[RESPONSE] {} {} -> {} [SERVER ERROR]",
            method,
            path,
            status.as_u16()
        );
    } else if status.is_client_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms,
            "[RESPONSE] {} {} -> {} [CLIENT ERROR]",
            method,
            path,
            status.as_u16()
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms,
            "[RESPONSE] {} {} -> {}",
            method,
            path,
            status.as_u16()
        );
    }

    response
}
