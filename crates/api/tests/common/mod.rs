#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use taskforge_api::app::{build_app, cors_layer};
use taskforge_api::auth::jwt::JwtConfig;
use taskforge_api::config::ServerConfig;
use taskforge_api::state::AppState;
use taskforge_llm::{GenerationConfig, TaskGenerator};

/// Build a test `ServerConfig` with safe defaults and no model key.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        allow_anonymous: true,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        generation: GenerationConfig {
            api_key: None,
            model: "test-model".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
        },
    }
}

/// Full application router with a fallback-only generator.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_with(pool, test_config(), TaskGenerator::fallback_only())
}

/// Full application router with the given configuration and generator.
pub fn build_app_with(pool: PgPool, config: ServerConfig, generator: TaskGenerator) -> Router {
    let cors = cors_layer(&config.cors_origins).unwrap();
    let state = AppState {
        pool,
        config: Arc::new(config),
        generator: Arc::new(generator),
    };
    build_app(state, cors)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Sign in a fresh anonymous user and return its access token.
pub async fn anonymous_token(pool: &PgPool) -> String {
    let response = send(
        build_test_app(pool.clone()),
        Method::POST,
        "/api/v1/auth/anonymous",
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Create a project through the API and return its id.
pub async fn create_project(
    pool: &PgPool,
    token: &str,
    name: &str,
    description: Option<&str>,
) -> i64 {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/projects",
        token,
        serde_json::json!({ "name": name, "description": description }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}
