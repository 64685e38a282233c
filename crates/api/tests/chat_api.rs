//! HTTP-level integration tests for the assistant chat, backed by the
//! scripted provider.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_test_user, delete_auth, get_auth, login_token, post_json_auth};
use sqlx::PgPool;

/// Sending a message without a conversation starts one, stores both
/// turns, and returns the assistant reply.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_mensaje_starts_conversation(pool: PgPool) {
    create_test_user(&pool, "ana@uni.edu", "estudiante").await;
    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "ana@uni.edu").await;

    let body = serde_json::json!({ "mensaje": "¿Cómo delimito mi problema?" });
    let response = post_json_auth(app.clone(), "/api/v1/chat/mensaje", &token, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let conversacion_id = json["data"]["conversacion_id"].as_i64().unwrap();
    assert_eq!(json["data"]["mensaje"]["rol"], "assistant");
    assert_eq!(
        json["data"]["mensaje"]["contenido"],
        "Respuesta a: ¿Cómo delimito mi problema?"
    );

    // Both turns are in the history, oldest first.
    let response = get_auth(
        app.clone(),
        &format!("/api/v1/chat/historial?conversacion_id={conversacion_id}"),
        &token,
    )
    .await;
    let json = body_json(response).await;
    let mensajes = json["data"].as_array().unwrap();
    assert_eq!(mensajes.len(), 2);
    assert_eq!(mensajes[0]["rol"], "user");
    assert_eq!(mensajes[1]["rol"], "assistant");

    // The conversation appears in the list, titled after the message.
    let response = get_auth(app, "/api/v1/chat/conversaciones", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["titulo"], "¿Cómo delimito mi problema?");
}

/// Empty messages are rejected before anything is stored.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_mensaje_empty_rejected(pool: PgPool) {
    create_test_user(&pool, "ana@uni.edu", "estudiante").await;
    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "ana@uni.edu").await;

    let body = serde_json::json!({ "mensaje": "   " });
    let response = post_json_auth(app, "/api/v1/chat/mensaje", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Conversations are private to their owner.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_conversation_ownership(pool: PgPool) {
    create_test_user(&pool, "ana@uni.edu", "estudiante").await;
    create_test_user(&pool, "otra@uni.edu", "estudiante").await;
    let app = common::build_test_app(pool);
    let ana_token = login_token(app.clone(), "ana@uni.edu").await;
    let otra_token = login_token(app.clone(), "otra@uni.edu").await;

    let body = serde_json::json!({ "mensaje": "Hola" });
    let response = post_json_auth(app.clone(), "/api/v1/chat/mensaje", &ana_token, body).await;
    let conversacion_id = body_json(response).await["data"]["conversacion_id"]
        .as_i64()
        .unwrap();

    let response = get_auth(
        app.clone(),
        &format!("/api/v1/chat/historial?conversacion_id={conversacion_id}"),
        &otra_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/chat/conversaciones/{conversacion_id}"),
        &otra_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The owner can delete it.
    let response = delete_auth(
        app,
        &format!("/api/v1/chat/conversaciones/{conversacion_id}"),
        &ana_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
