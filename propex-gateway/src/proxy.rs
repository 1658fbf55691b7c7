use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderName, Response, StatusCode},
    response::IntoResponse,
};
use tracing::{debug, error, warn};

use crate::state::GatewayState;

/// Upper bound on a buffered request body.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Connection-scoped headers that must not travel to the backend or back
/// to the client.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "proxy-connection",
    "keep-alive",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Catch-all handler: resolve the backend for the request path, replay the
/// request against it, and stream status, headers and body back verbatim.
pub async fn forward(State(state): State<GatewayState>, request: Request) -> Response<Body> {
    let path = request.uri().path().to_string();
    let Some(route) = state.resolve(&path) else {
        warn!(%path, "no backend configured for path");
        return StatusCode::BAD_GATEWAY.into_response();
    };

    let mut url = format!("{}{}", route.backend, path);
    if let Some(query) = request.uri().query() {
        url.push('?');
        url.push_str(query);
    }

    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(%path, error = %err, "failed to read request body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let mut headers = HeaderMap::new();
    for (name, value) in &parts.headers {
        if !is_hop_by_hop(name) {
            headers.insert(name.clone(), value.clone());
        }
    }

    debug!(method = %parts.method, %url, "forwarding request");
    let upstream = match state
        .client
        .request(parts.method, &url)
        .headers(headers)
        .body(body_bytes)
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => {
            error!(%url, error = %err, "backend request failed");
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };

    let status = upstream.status();
    let mut builder = Response::builder().status(status);
    for (name, value) in upstream.headers() {
        if !is_hop_by_hop(name) {
            builder = builder.header(name, value);
        }
    }

    let payload = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(%url, error = %err, "failed to read backend response");
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };

    builder
        .body(Body::from(payload))
        .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
}
