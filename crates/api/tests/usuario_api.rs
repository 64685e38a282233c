//! HTTP-level integration tests for user administration and the public
//! email-existence check.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_test_user, delete_auth, get, get_auth, login_token, post_json_auth,
    TEST_PASSWORD,
};
use sqlx::PgPool;

/// Administrators create tutor accounts; the new tutor can log in.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_creates_tutor(pool: PgPool) {
    create_test_user(&pool, "admin@uni.edu", "administrador").await;
    let app = common::build_test_app(pool);
    let admin_token = login_token(app.clone(), "admin@uni.edu").await;

    let body = serde_json::json!({
        "email": "nuevo-tutor@uni.edu",
        "password": TEST_PASSWORD,
        "nombre": "Nuevo",
        "apellido": "Tutor",
        "rol": "tutor"
    });
    let response = post_json_auth(app.clone(), "/api/v1/usuarios", &admin_token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["rol"], "tutor");

    let tutor_token = login_token(app.clone(), "nuevo-tutor@uni.edu").await;
    assert!(!tutor_token.is_empty());

    // The directory lists the new tutor.
    let response = get_auth(app, "/api/v1/usuarios/tutores", &tutor_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

/// Student accounts are not admin-creatable.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_cannot_create_student(pool: PgPool) {
    create_test_user(&pool, "admin@uni.edu", "administrador").await;
    let app = common::build_test_app(pool);
    let admin_token = login_token(app.clone(), "admin@uni.edu").await;

    let body = serde_json::json!({
        "email": "alumna@uni.edu",
        "password": TEST_PASSWORD,
        "nombre": "Alumna",
        "apellido": "Nueva",
        "rol": "estudiante"
    });
    let response = post_json_auth(app, "/api/v1/usuarios", &admin_token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// User administration is admin-only.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_user_management_requires_admin(pool: PgPool) {
    create_test_user(&pool, "estudiante@uni.edu", "estudiante").await;
    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "estudiante@uni.edu").await;

    let response = get_auth(app.clone(), "/api/v1/usuarios", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = serde_json::json!({
        "email": "x@uni.edu",
        "password": TEST_PASSWORD,
        "nombre": "X",
        "apellido": "Y",
        "rol": "tutor"
    });
    let response = post_json_auth(app, "/api/v1/usuarios", &token, body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Deactivation is soft: the account stops authenticating but remains.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_deactivation_blocks_login(pool: PgPool) {
    create_test_user(&pool, "admin@uni.edu", "administrador").await;
    let tutor = create_test_user(&pool, "tutor@uni.edu", "tutor").await;
    let app = common::build_test_app(pool);
    let admin_token = login_token(app.clone(), "admin@uni.edu").await;

    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/usuarios/{}", tutor.id),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = serde_json::json!({ "email": "tutor@uni.edu", "password": TEST_PASSWORD });
    let response = common::post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Administrators cannot deactivate themselves.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_cannot_self_deactivate(pool: PgPool) {
    let admin = create_test_user(&pool, "admin@uni.edu", "administrador").await;
    let app = common::build_test_app(pool);
    let admin_token = login_token(app.clone(), "admin@uni.edu").await;

    let response = delete_auth(
        app,
        &format!("/api/v1/usuarios/{}", admin.id),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// The email-existence check is public and case-insensitive.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_existe_email_public(pool: PgPool) {
    create_test_user(&pool, "ana@uni.edu", "estudiante").await;
    let app = common::build_test_app(pool);

    let response = get(
        app.clone(),
        "/api/v1/usuarios/existe-email?email=ANA@UNI.EDU",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["existe"], true);

    let response = get(app, "/api/v1/usuarios/existe-email?email=libre@uni.edu").await;
    assert_eq!(body_json(response).await["data"]["existe"], false);
}
