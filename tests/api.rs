use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use content_api::{app::build_router, config::Config, state::AppState};

fn config(extra: &[(&str, &str)]) -> Config {
    let mut pairs: Vec<(String, String)> = vec![("JWT_SECRET".into(), "integration-secret".into())];
    pairs.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

    Config::from_lookup(move |key| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    })
    .unwrap()
}

fn app_with(extra: &[(&str, &str)]) -> Router {
    let config = config(extra);
    let state = AppState::in_memory(&config).unwrap();
    build_router(state, &config)
}

fn app() -> Router {
    app_with(&[])
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        req = req.header(header::AUTHORIZATION, auth);
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn register(app: &Router, email: &str, password: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

/// Returns (access token, refresh token).
async fn login(app: &Router, email: &str, password: &str) -> (String, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    (
        body["token"].as_str().unwrap().to_string(),
        body["refresh_token"].as_str().unwrap().to_string(),
    )
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[tokio::test]
async fn health_is_ok() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_hides_password_and_rejects_duplicates() {
    let app = app();
    let user = register(&app, "a@example.com", "password123").await;

    assert_eq!(user["email"], "a@example.com");
    assert_eq!(user["is_upgraded"], false);
    assert!(user.get("hashed_password").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({ "email": "a@example.com", "password": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({ "email": 42 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = app();
    register(&app, "a@example.com", "password123").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "email": "a@example.com", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Incorrect email or password");
}

#[tokio::test]
async fn protected_endpoints_reject_bad_credentials() {
    let app = app();
    let post = Some(json!({ "body": "hello" }));

    for auth in [None, Some("Bearer"), Some("Basic abc"), Some("Bearer not.a.jwt")] {
        let (status, body) = send(&app, Method::POST, "/api/v1/posts", auth, post.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "auth: {auth:?}");
        assert_eq!(body["error"]["message"], "Unauthorized access");
    }
}

#[tokio::test]
async fn only_the_owner_can_delete() {
    let app = app();
    register(&app, "a@example.com", "password123").await;
    register(&app, "b@example.com", "password456").await;
    let (token_a, _) = login(&app, "a@example.com", "password123").await;
    let (token_b, _) = login(&app, "b@example.com", "password456").await;

    let (status, post) = send(
        &app,
        Method::POST,
        "/api/v1/posts",
        Some(&bearer(&token_a)),
        Some(json!({ "body": "mine" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/v1/posts/{}", post["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&bearer(&token_b)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&bearer(&token_a)), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&bearer(&token_a)), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_authenticates_before_decoding_the_id() {
    let app = app();
    register(&app, "a@example.com", "password123").await;
    let (token, _) = login(&app, "a@example.com", "password123").await;

    for auth in [None, Some("Bearer not.a.jwt")] {
        let (status, _) = send(&app, Method::DELETE, "/api/v1/posts/!!notanid", auth, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "auth: {auth:?}");
    }

    // with a valid token the bad id is reported
    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/v1/posts/!!notanid",
        Some(&bearer(&token)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refresh_works_until_revoked() {
    let app = app();
    register(&app, "a@example.com", "password123").await;
    let (_, refresh_token) = login(&app, "a@example.com", "password123").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/refresh",
        Some(&bearer(&refresh_token)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let fresh = body["token"].as_str().unwrap().to_string();

    // the new access token is usable
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/posts",
        Some(&bearer(&fresh)),
        Some(json!({ "body": "after refresh" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/revoke",
        Some(&bearer(&refresh_token)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/refresh",
        Some(&bearer(&refresh_token)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rejects_unknown_and_access_tokens() {
    let app = app();
    register(&app, "a@example.com", "password123").await;
    let (access, _) = login(&app, "a@example.com", "password123").await;

    for auth in [bearer("deadbeef"), bearer(&access)] {
        let (status, _) = send(&app, Method::POST, "/api/v1/refresh", Some(&auth), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let unknown = bearer("deadbeef");
    let (status, _) = send(&app, Method::POST, "/api/v1/revoke", Some(&unknown), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn update_user_changes_login() {
    let app = app();
    register(&app, "a@example.com", "password123").await;
    let (token, _) = login(&app, "a@example.com", "password123").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/users",
        Some(&bearer(&token)),
        Some(json!({ "email": "new@example.com", "password": "newpass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "new@example.com");

    login(&app, "new@example.com", "newpass").await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/users",
        None,
        Some(json!({ "email": "x@example.com", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn posts_validate_filter_and_sort() {
    let app = app();
    let a = register(&app, "a@example.com", "password123").await;
    register(&app, "b@example.com", "password456").await;
    let (token_a, _) = login(&app, "a@example.com", "password123").await;
    let (token_b, _) = login(&app, "b@example.com", "password456").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/posts",
        Some(&bearer(&token_a)),
        Some(json!({ "body": "x".repeat(141) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for (token, text) in [(&token_a, "first"), (&token_b, "second"), (&token_a, "third")] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/posts",
            Some(&bearer(token)),
            Some(json!({ "body": text })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let uri = format!(
        "/api/v1/posts?author_id={}&sort=desc",
        a["id"].as_str().unwrap()
    );
    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    let bodies: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["body"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, ["third", "first"]);

    let (status, _) = send(&app, Method::GET, "/api/v1/posts?author_id=nope", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/api/v1/posts/!!!", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn webhook_upgrades_user() {
    let app = app_with(&[("WEBHOOK_API_KEY", "k-123")]);
    let user = register(&app, "a@example.com", "password123").await;
    let payload = json!({
        "event": "user.upgraded",
        "data": { "user_id": user["id"] }
    });

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/webhooks/upgrade",
        Some("ApiKey wrong"),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/webhooks/upgrade",
        Some("ApiKey k-123"),
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "email": "a@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(body["is_upgraded"], true);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/webhooks/upgrade",
        Some("ApiKey k-123"),
        Some(json!({
            "event": "user.upgraded",
            "data": { "user_id": "00000000-0000-0000-0000-000000000000" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/webhooks/upgrade",
        Some("ApiKey k-123"),
        Some(json!({
            "event": "user.downgraded",
            "data": { "user_id": user["id"] }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn metrics_count_api_hits_and_reset_clears() {
    let app = app();
    register(&app, "a@example.com", "password123").await;
    send(&app, Method::GET, "/api/v1/health", None, None).await;

    let (status, body) = send(&app, Method::GET, "/admin/metrics", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hits"], 2);

    let (status, body) = send(&app, Method::POST, "/admin/reset", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_users"], 1);

    let (_, body) = send(&app, Method::GET, "/admin/metrics", None, None).await;
    assert_eq!(body["hits"], 0);

    // the account is gone
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "email": "a@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reset_is_forbidden_in_production() {
    let app = app_with(&[("APP_ENV", "production"), ("DATABASE_URL", "postgres://unused")]);

    let (status, _) = send(&app, Method::POST, "/admin/reset", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = app();
    let req = Request::builder()
        .uri("/api/v1/health")
        .body(Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert!(res.headers().contains_key("x-request-id"));
}
