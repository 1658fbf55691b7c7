use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, info};

use propex_core::auth::verify_token;

use crate::state::GatewayState;

/// Trusted identity headers set by the gateway. Never accepted from the
/// original client on protected paths: they are overwritten from the
/// verified claims before forwarding.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// The authentication middleware in front of the proxy handler.
///
/// Public prefixes forward unmodified with no credential required.
/// Everything else needs `Authorization: Bearer <token>` with a valid
/// signature and expiry; every failure mode produces the same empty 401 so
/// a caller cannot learn which check rejected it.
pub async fn authenticate(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    info!(%path, method = %request.method(), "processing request");

    if state.is_public(path) {
        debug!(%path, "public path; skipping authentication");
        return next.run(request).await;
    }

    let Some(token) = bearer_token(&request) else {
        return unauthorized();
    };

    let claims = match verify_token(&state.jwt_secret, &token) {
        Ok(claims) => claims,
        Err(_) => return unauthorized(),
    };

    let Ok(user_id) = HeaderValue::from_str(&claims.sub.to_string()) else {
        return unauthorized();
    };
    let Ok(roles) = HeaderValue::from_str(&claims.roles) else {
        return unauthorized();
    };

    let headers = request.headers_mut();
    headers.insert(USER_ID_HEADER, user_id);
    headers.insert(USER_ROLES_HEADER, roles);

    next.run(request).await
}

fn bearer_token(request: &Request) -> Option<String> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    value.strip_prefix("Bearer ").map(str::to_string)
}

fn unauthorized() -> Response {
    StatusCode::UNAUTHORIZED.into_response()
}
