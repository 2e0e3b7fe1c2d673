use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use tower::ServiceExt;

use taskboard::auth::claims::{Claims, Subject};
use taskboard::auth::jwt::JwtKeys;
use taskboard::config::JwtConfig;

mod common;
use common::{bearer_token, body_json, get_request, json_request, test_app, TEST_SECRET};

#[tokio::test]
async fn health_endpoint_is_open() {
    let response = test_app()
        .oneshot(get_request("/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn protected_routes_require_token() {
    for (method, uri) in [
        ("GET", "/api/tasks"),
        ("GET", "/api/tasks/1"),
        ("GET", "/api/tasks/stats"),
        ("POST", "/api/tasks"),
        ("PUT", "/api/tasks/1"),
        ("DELETE", "/api/tasks/1"),
    ] {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{method} {uri} should require a token"
        );
        let json = body_json(response).await;
        assert_eq!(
            json,
            json!({"success": false, "error": "Access token required", "status": 401})
        );
    }
}

#[tokio::test]
async fn rejects_garbage_token() {
    let response = test_app()
        .oneshot(get_request("/api/tasks", Some("not-a-token")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid or expired token");
}

#[tokio::test]
async fn rejects_non_bearer_scheme() {
    let request = Request::builder()
        .method("GET")
        .uri("/api/tasks")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid or expired token");
}

#[tokio::test]
async fn rejects_token_signed_with_other_secret() {
    let forged = JwtKeys::new(&JwtConfig {
        secret: "other-secret".into(),
        ttl_seconds: 3600,
    })
    .issue(1)
    .unwrap();

    let response = test_app()
        .oneshot(get_request("/api/tasks", Some(&forged)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rejects_expired_token() {
    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    let claims = Claims {
        iat: (now - 7200) as usize,
        exp: (now - 3600) as usize,
        data: Subject { id: 1 },
    };
    let expired = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let response = test_app()
        .oneshot(get_request("/api/tasks", Some(&expired)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid or expired token");
}

#[tokio::test]
async fn valid_token_passes_the_gate() {
    // With a valid token the request reaches validation, not the gate.
    let token = bearer_token(7);
    let response = test_app()
        .oneshot(json_request("POST", "/api/tasks", Some(&token), json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_requires_all_fields() {
    let response = test_app()
        .oneshot(json_request("POST", "/api/register", None, json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json,
        json!({"success": false, "error": "All fields are required", "status": 400})
    );
}

#[tokio::test]
async fn register_rejects_invalid_email() {
    let body = json!({"name": "Ana", "email": "not-an-email", "password": "secret1"});
    let response = test_app()
        .oneshot(json_request("POST", "/api/register", None, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid email");
}

#[tokio::test]
async fn register_rejects_short_password() {
    let body = json!({"name": "Ana", "email": "ana@x.com", "password": "abc"});
    let response = test_app()
        .oneshot(json_request("POST", "/api/register", None, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Password must be at least 6 characters");
}

#[tokio::test]
async fn register_emptiness_check_runs_first() {
    // Email empty and password short: the emptiness rule must win.
    let body = json!({"name": "Ana", "email": "", "password": "abc"});
    let response = test_app()
        .oneshot(json_request("POST", "/api/register", None, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "All fields are required");
}

#[tokio::test]
async fn login_requires_fields() {
    let body = json!({"email": "ana@x.com"});
    let response = test_app()
        .oneshot(json_request("POST", "/api/login", None, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Email and password are required");
}
