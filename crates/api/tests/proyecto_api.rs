//! HTTP-level integration tests for the project lifecycle: creation,
//! role-gated transitions, observation guards, edit gating, tutor
//! assignment, and statistics.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{
    body_json, create_test_user, delete_auth, get_auth, login_token, patch_json_auth,
    post_json_auth, put_json_auth,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const DESCRIPCION: &str = "Plataforma web para gestionar propuestas de tesis universitarias.";

/// Create a project through the API as the given student token. Returns
/// its id.
async fn crear_proyecto(app: Router, token: &str, titulo: &str) -> i64 {
    let body = serde_json::json!({ "titulo": titulo, "descripcion": DESCRIPCION });
    let response = post_json_auth(app, "/api/v1/proyectos", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["estado"], "borrador");
    json["data"]["id"].as_i64().expect("project id")
}

/// Transition a project through the estado endpoint.
async fn cambiar_estado(
    app: Router,
    token: &str,
    proyecto_id: i64,
    estado: &str,
    observacion: Option<&str>,
) -> axum::http::Response<axum::body::Body> {
    let mut body = serde_json::json!({ "estado": estado });
    if let Some(texto) = observacion {
        body["observacion"] = serde_json::json!(texto);
    }
    patch_json_auth(
        app,
        &format!("/api/v1/proyectos/{proyecto_id}/estado"),
        token,
        body,
    )
    .await
}

/// Common fixture: a student with a draft project, its assigned tutor, and
/// an administrator. Returns (proyecto_id, student token, tutor token,
/// admin token).
async fn fixture(pool: &PgPool, app: Router) -> (i64, String, String, String) {
    create_test_user(pool, "estudiante@uni.edu", "estudiante").await;
    let tutor = create_test_user(pool, "tutor@uni.edu", "tutor").await;
    create_test_user(pool, "admin@uni.edu", "administrador").await;

    let estudiante_token = login_token(app.clone(), "estudiante@uni.edu").await;
    let tutor_token = login_token(app.clone(), "tutor@uni.edu").await;
    let admin_token = login_token(app.clone(), "admin@uni.edu").await;

    let proyecto_id = crear_proyecto(
        app.clone(),
        &estudiante_token,
        "Sistema de gestión académica",
    )
    .await;

    let body = serde_json::json!({ "tutor_id": tutor.id });
    let response = patch_json_auth(
        app,
        &format!("/api/v1/proyectos/{proyecto_id}/asignar-tutor"),
        &admin_token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    (proyecto_id, estudiante_token, tutor_token, admin_token)
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// A valid proposal lands in `borrador`; submitting it sets `enviado`
/// and stamps `fecha_envio`.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_and_submit_flow(pool: PgPool) {
    create_test_user(&pool, "estudiante@uni.edu", "estudiante").await;
    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "estudiante@uni.edu").await;

    let proyecto_id = crear_proyecto(app.clone(), &token, "Sistema de gestión académica").await;

    let response = cambiar_estado(app, &token, proyecto_id, "enviado", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["estado"], "enviado");
    assert!(json["data"]["fecha_envio"].is_string(), "fecha_envio must be set");
}

/// Titles under five characters are rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_short_title_rejected(pool: PgPool) {
    create_test_user(&pool, "estudiante@uni.edu", "estudiante").await;
    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "estudiante@uni.edu").await;

    let body = serde_json::json!({ "titulo": "abcd", "descripcion": DESCRIPCION });
    let response = post_json_auth(app, "/api/v1/proyectos", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

/// Descriptions under 25 characters are rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_short_description_rejected(pool: PgPool) {
    create_test_user(&pool, "estudiante@uni.edu", "estudiante").await;
    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "estudiante@uni.edu").await;

    let body = serde_json::json!({ "titulo": "Proyecto válido", "descripcion": "demasiado corta" });
    let response = post_json_auth(app, "/api/v1/proyectos", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Only students create proposals.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_tutor_cannot_create_project(pool: PgPool) {
    create_test_user(&pool, "tutor@uni.edu", "tutor").await;
    let app = common::build_test_app(pool);
    let token = login_token(app.clone(), "tutor@uni.edu").await;

    let body = serde_json::json!({ "titulo": "Proyecto de tutor", "descripcion": DESCRIPCION });
    let response = post_json_auth(app, "/api/v1/proyectos", &token, body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Role-scoped visibility
// ---------------------------------------------------------------------------

/// Students see their own projects, tutors their assigned ones,
/// administrators everything.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_is_role_scoped(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_proyecto_id, estudiante_token, tutor_token, admin_token) =
        fixture(&pool, app.clone()).await;

    // A second student with an unassigned project.
    create_test_user(&pool, "otra@uni.edu", "estudiante").await;
    let otra_token = login_token(app.clone(), "otra@uni.edu").await;
    crear_proyecto(app.clone(), &otra_token, "Otro proyecto distinto").await;

    for (token, esperado) in [
        (&estudiante_token, 1),
        (&otra_token, 1),
        (&tutor_token, 1),
        (&admin_token, 2),
    ] {
        let response = get_auth(app.clone(), "/api/v1/proyectos", token).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json["data"].as_array().unwrap().len(),
            esperado,
            "unexpected list size"
        );
    }
}

/// A student cannot fetch someone else's project.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_get_foreign_project_forbidden(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (proyecto_id, ..) = fixture(&pool, app.clone()).await;

    create_test_user(&pool, "intrusa@uni.edu", "estudiante").await;
    let token = login_token(app.clone(), "intrusa@uni.edu").await;

    let response = get_auth(app, &format!("/api/v1/proyectos/{proyecto_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Lifecycle authorization
// ---------------------------------------------------------------------------

/// Review transitions belong to the assigned tutor: the student and an
/// unassigned tutor are both rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_review_requires_assigned_tutor(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (proyecto_id, estudiante_token, tutor_token, _) = fixture(&pool, app.clone()).await;

    let response = cambiar_estado(
        app.clone(),
        &estudiante_token,
        proyecto_id,
        "enviado",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The owning student cannot start the review.
    let response = cambiar_estado(
        app.clone(),
        &estudiante_token,
        proyecto_id,
        "en_revision",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Nor can a tutor who is not assigned to this project.
    create_test_user(&pool, "ajeno@uni.edu", "tutor").await;
    let ajeno_token = login_token(app.clone(), "ajeno@uni.edu").await;
    let response = cambiar_estado(app.clone(), &ajeno_token, proyecto_id, "en_revision", None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The assigned tutor can.
    let response = cambiar_estado(app, &tutor_token, proyecto_id, "en_revision", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["fecha_revision"].is_string());
}

/// Submitting someone else's draft is forbidden; submitting twice
/// conflicts.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_submit_guards(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (proyecto_id, estudiante_token, tutor_token, _) = fixture(&pool, app.clone()).await;

    // The tutor cannot submit on the student's behalf.
    let response = cambiar_estado(app.clone(), &tutor_token, proyecto_id, "enviado", None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response =
        cambiar_estado(app.clone(), &estudiante_token, proyecto_id, "enviado", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // `enviado` → `enviado` is not in the lifecycle table.
    let response = cambiar_estado(app, &estudiante_token, proyecto_id, "enviado", None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Observation guards
// ---------------------------------------------------------------------------

/// `corregir` demands a non-empty observation; once in `corregir`,
/// "dar otra revisión" appends exactly one more observation and leaves the
/// state unchanged.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_corregir_observation_contract(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (proyecto_id, estudiante_token, tutor_token, _) = fixture(&pool, app.clone()).await;

    cambiar_estado(app.clone(), &estudiante_token, proyecto_id, "enviado", None).await;
    cambiar_estado(app.clone(), &tutor_token, proyecto_id, "en_revision", None).await;

    // Missing and blank observations are rejected with no state change.
    for obs in [None, Some("   ")] {
        let response =
            cambiar_estado(app.clone(), &tutor_token, proyecto_id, "corregir", obs).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
    let response = get_auth(
        app.clone(),
        &format!("/api/v1/proyectos/{proyecto_id}"),
        &tutor_token,
    )
    .await;
    assert_eq!(body_json(response).await["data"]["estado"], "en_revision");

    // With text: transition applies and the observation is recorded.
    let response = cambiar_estado(
        app.clone(),
        &tutor_token,
        proyecto_id,
        "corregir",
        Some("Revisar la metodología"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // "Dar otra revisión": state stays `corregir`, one more observation.
    let response = cambiar_estado(
        app.clone(),
        &tutor_token,
        proyecto_id,
        "corregir",
        Some("También falta bibliografía"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["estado"], "corregir");

    let response = get_auth(
        app,
        &format!("/api/v1/proyectos/{proyecto_id}/observaciones"),
        &tutor_token,
    )
    .await;
    let json = body_json(response).await;
    let observaciones = json["data"].as_array().unwrap();
    assert_eq!(observaciones.len(), 2);
    // Oldest first.
    assert_eq!(observaciones[0]["observacion"], "Revisar la metodología");
    assert_eq!(observaciones[1]["observacion"], "También falta bibliografía");
}

/// Rejection works with or without observation text.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_rechazo_observation_is_optional(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (proyecto_id, estudiante_token, tutor_token, _) = fixture(&pool, app.clone()).await;

    cambiar_estado(app.clone(), &estudiante_token, proyecto_id, "enviado", None).await;
    cambiar_estado(app.clone(), &tutor_token, proyecto_id, "en_revision", None).await;

    let response = cambiar_estado(app.clone(), &tutor_token, proyecto_id, "rechazado", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["estado"], "rechazado");

    // A rejected project can still be approved later; `aprobado` is
    // terminal.
    let response = cambiar_estado(app.clone(), &tutor_token, proyecto_id, "aprobado", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["fecha_aprobacion"].is_string());

    let response = cambiar_estado(app, &tutor_token, proyecto_id, "rechazado", None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Submitting an observation on a transition that takes none is rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_submit_does_not_accept_observation(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (proyecto_id, estudiante_token, ..) = fixture(&pool, app.clone()).await;

    let response = cambiar_estado(
        app,
        &estudiante_token,
        proyecto_id,
        "enviado",
        Some("nota fuera de lugar"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Edit gating
// ---------------------------------------------------------------------------

/// The owning student edits drafts (version bumps); once submitted the
/// content is frozen until corrections are requested.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_edit_gated_by_state(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (proyecto_id, estudiante_token, tutor_token, _) = fixture(&pool, app.clone()).await;

    let body = serde_json::json!({ "planteamiento": "Planteamiento inicial del problema" });
    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/proyectos/{proyecto_id}"),
        &estudiante_token,
        body.clone(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["version"], 2);

    cambiar_estado(app.clone(), &estudiante_token, proyecto_id, "enviado", None).await;

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/proyectos/{proyecto_id}"),
        &estudiante_token,
        body.clone(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // After `corregir`, editing reopens and a resubmission is possible.
    cambiar_estado(app.clone(), &tutor_token, proyecto_id, "en_revision", None).await;
    cambiar_estado(
        app.clone(),
        &tutor_token,
        proyecto_id,
        "corregir",
        Some("Ajustar el planteamiento"),
    )
    .await;

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/proyectos/{proyecto_id}"),
        &estudiante_token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = cambiar_estado(app, &estudiante_token, proyecto_id, "enviado", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// The tutor never edits student content.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_tutor_cannot_edit_content(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (proyecto_id, _, tutor_token, _) = fixture(&pool, app.clone()).await;

    let body = serde_json::json!({ "titulo": "Título impuesto por el tutor" });
    let response = put_json_auth(
        app,
        &format!("/api/v1/proyectos/{proyecto_id}"),
        &tutor_token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

/// Students delete their own drafts only; administrators delete anything.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_rules(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (proyecto_id, estudiante_token, _, admin_token) = fixture(&pool, app.clone()).await;

    cambiar_estado(app.clone(), &estudiante_token, proyecto_id, "enviado", None).await;

    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/proyectos/{proyecto_id}"),
        &estudiante_token,
    )
    .await;
    assert_eq!(
        response.status(),
        StatusCode::CONFLICT,
        "submitted projects are no longer the student's to delete"
    );

    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/proyectos/{proyecto_id}"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(
        app,
        &format!("/api/v1/proyectos/{proyecto_id}"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Tutor assignment
// ---------------------------------------------------------------------------

/// Only administrators assign tutors, and only to active tutor accounts.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_asignar_tutor_rules(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (proyecto_id, estudiante_token, _, admin_token) = fixture(&pool, app.clone()).await;

    let estudiante = create_test_user(&pool, "falso-tutor@uni.edu", "estudiante").await;

    // Students cannot touch the assignment.
    let response = patch_json_auth(
        app.clone(),
        &format!("/api/v1/proyectos/{proyecto_id}/asignar-tutor"),
        &estudiante_token,
        serde_json::json!({ "tutor_id": estudiante.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A non-tutor account is not assignable.
    let response = patch_json_auth(
        app.clone(),
        &format!("/api/v1/proyectos/{proyecto_id}/asignar-tutor"),
        &admin_token,
        serde_json::json!({ "tutor_id": estudiante.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Clearing the assignment works.
    let response = patch_json_auth(
        app,
        &format!("/api/v1/proyectos/{proyecto_id}/asignar-tutor"),
        &admin_token,
        serde_json::json!({ "tutor_id": null }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"]["tutor_id"].is_null());
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Per-state counts and the monthly series reflect the caller's scope.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_estadisticas_and_grafico(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (proyecto_id, estudiante_token, _, admin_token) = fixture(&pool, app.clone()).await;

    cambiar_estado(app.clone(), &estudiante_token, proyecto_id, "enviado", None).await;
    crear_proyecto(app.clone(), &estudiante_token, "Segundo proyecto en borrador").await;

    let response = get_auth(
        app.clone(),
        "/api/v1/proyectos/estadisticas",
        &estudiante_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 2);
    let por_estado = json["data"]["por_estado"].as_array().unwrap();
    assert!(por_estado
        .iter()
        .any(|c| c["estado"] == "enviado" && c["cantidad"] == 1));
    assert!(por_estado
        .iter()
        .any(|c| c["estado"] == "borrador" && c["cantidad"] == 1));

    let response = get_auth(app, "/api/v1/proyectos/grafico", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let serie = json["data"].as_array().unwrap();
    assert_eq!(serie.len(), 1, "all fixture projects were created this month");
    assert_eq!(serie[0]["creados"], 2);
    assert_eq!(serie[0]["aprobados"], 0);
}
