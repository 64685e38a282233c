//! Shared harness for HTTP-level integration tests.
//!
//! Builds the application through the production router builder so tests
//! exercise the same middleware stack (CORS, request ID, timeout, panic
//! recovery) the binary uses, with a scripted assistant provider in place
//! of the external service.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use thesia_api::assistant::{
    CompletionProvider, ProviderError, ProviderMessage, SectionRequest, SectionStream,
};
use thesia_api::auth::jwt::JwtConfig;
use thesia_api::auth::password::hash_password;
use thesia_api::config::ServerConfig;
use thesia_api::router::build_app_router;
use thesia_api::state::AppState;
use thesia_db::models::usuario::{CreateUsuario, Usuario};
use thesia_db::repositories::UsuarioRepo;

/// Password used for every test account.
pub const TEST_PASSWORD: &str = "contrasena_123!";

/// Deterministic assistant used by the tests: fixed chat reply, fixed
/// section chunks.
pub struct ScriptedProvider;

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, mensajes: &[ProviderMessage]) -> Result<String, ProviderError> {
        let ultimo = mensajes.last().map(|m| m.contenido.as_str()).unwrap_or("");
        Ok(format!("Respuesta a: {ultimo}"))
    }

    async fn stream_section(
        &self,
        _request: &SectionRequest,
    ) -> Result<SectionStream, ProviderError> {
        let chunks = vec![Ok("Primer fragmento".to_string()), Ok("Segundo".to_string())];
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}

/// Build a test `ServerConfig` with safe defaults and a known JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        storage_dir: std::env::temp_dir().join("thesia-test-storage"),
        max_upload_bytes: 1024 * 1024,
        assistant_base_url: "http://localhost:0".to_string(),
        assistant_api_key: None,
        jwt: JwtConfig {
            secret: "integration-test-secret-key".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and the scripted assistant.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(thesia_events::EventBus::default()),
        assistant: Arc::new(ScriptedProvider),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, path: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, "POST", path, None, body).await
}

pub async fn post_json_auth(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    json_request(app, "POST", path, Some(token), body).await
}

pub async fn put_json_auth(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    json_request(app, "PUT", path, Some(token), body).await
}

pub async fn patch_json_auth(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    json_request(app, "PATCH", path, Some(token), body).await
}

pub async fn delete_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn json_request(
    app: Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| panic!("invalid JSON body: {e}"))
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a test user directly in the database. All accounts share
/// [`TEST_PASSWORD`].
pub async fn create_test_user(pool: &PgPool, email: &str, rol: &str) -> Usuario {
    let hashed = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    UsuarioRepo::create(
        pool,
        &CreateUsuario {
            email: email.to_string(),
            password_hash: hashed,
            nombre: "Nombre".to_string(),
            apellido: "Apellido".to_string(),
            rol: rol.to_string(),
            cedula: None,
            telefono: None,
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Log in via the API and return the access token.
pub async fn login_token(app: Router, email: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["data"]["token"]
        .as_str()
        .expect("login response must contain data.token")
        .to_string()
}
