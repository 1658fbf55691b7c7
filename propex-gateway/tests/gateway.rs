//! Trust-boundary tests for the gateway middleware. The proxy hop is
//! replaced with a stub handler that echoes the identity headers it
//! received, so the assertions cover exactly what a backend would see.

use axum::{
    Json, Router,
    body::Body,
    extract::Request,
    http::{Method, StatusCode, header},
    middleware,
    response::IntoResponse,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use propex_config::{GatewayConfig, GatewayRoute};
use propex_core::auth::issue_token;
use propex_gateway::{GatewayState, auth};

const SECRET: &str = "gateway-test-secret";

fn test_state() -> GatewayState {
    let config = GatewayConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        public_prefixes: vec![
            "/api/auth/login".to_string(),
            "/api/listings".to_string(),
            "/swagger-ui".to_string(),
        ],
        routes: vec![GatewayRoute {
            prefix: "/".to_string(),
            backend: "http://unused".to_string(),
        }],
    };
    GatewayState::new(&config, SECRET.to_string())
}

/// Echoes the trusted headers so tests observe what was forwarded.
async fn echo_identity(request: Request) -> impl IntoResponse {
    let header_text = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "userId": header_text(auth::USER_ID_HEADER),
        "roles": header_text(auth::USER_ROLES_HEADER),
    }))
}

fn test_router() -> Router {
    let state = test_state();
    Router::new()
        .fallback(echo_identity)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ))
        .with_state(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

fn request(method: Method, path: &str) -> Request {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

fn bearer_request(path: &str, token: &str) -> Request {
    Request::builder()
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn public_prefixes_forward_without_credentials_for_any_method() {
    for method in [Method::GET, Method::POST, Method::DELETE] {
        let response = test_router()
            .oneshot(request(method.clone(), "/api/listings/some/sub/path"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "method {method}");
    }
}

#[tokio::test]
async fn public_requests_pass_through_unmodified() {
    let response = test_router()
        .oneshot(request(Method::GET, "/swagger-ui/index.html"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["userId"], Value::Null);
    assert_eq!(body["roles"], Value::Null);
}

#[tokio::test]
async fn missing_credential_is_rejected_without_forwarding() {
    let response = test_router()
        .oneshot(request(Method::GET, "/api/wallets/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn all_rejection_modes_are_indistinguishable() {
    let missing = test_router()
        .oneshot(request(Method::GET, "/api/wallets/1"))
        .await
        .unwrap();

    let wrong_scheme = test_router()
        .oneshot(
            Request::builder()
                .uri("/api/wallets/1")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let garbage_token = test_router()
        .oneshot(bearer_request("/api/wallets/1", "not-a-jwt"))
        .await
        .unwrap();

    let expired = {
        let token = issue_token(SECRET, Uuid::new_v4(), "USER", -600).unwrap();
        test_router()
            .oneshot(bearer_request("/api/wallets/1", &token))
            .await
            .unwrap()
    };

    let wrong_secret = {
        let token = issue_token("other-secret", Uuid::new_v4(), "USER", 600).unwrap();
        test_router()
            .oneshot(bearer_request("/api/wallets/1", &token))
            .await
            .unwrap()
    };

    let mut bodies = Vec::new();
    for response in [missing, wrong_scheme, garbage_token, expired, wrong_secret] {
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        bodies.push(body_bytes(response).await);
    }
    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn valid_token_injects_subject_and_roles() {
    let user_id = Uuid::new_v4();
    let token = issue_token(SECRET, user_id, "USER,AGENT", 600).unwrap();

    let response = test_router()
        .oneshot(bearer_request("/api/wallets/1", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["userId"], json!(user_id.to_string()));
    assert_eq!(body["roles"], json!("USER,AGENT"));
}

#[tokio::test]
async fn client_supplied_identity_headers_are_overwritten() {
    let user_id = Uuid::new_v4();
    let token = issue_token(SECRET, user_id, "USER", 600).unwrap();

    let request = Request::builder()
        .uri("/api/wallets/1")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(auth::USER_ID_HEADER, "attacker")
        .header(auth::USER_ROLES_HEADER, "ADMIN")
        .body(Body::empty())
        .unwrap();

    let response = test_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["userId"], json!(user_id.to_string()));
    assert_eq!(body["roles"], json!("USER"));
}
