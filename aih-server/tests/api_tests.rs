//! Integration tests for aih-server API endpoints
//!
//! Each test drives the router with `oneshot` against a fresh in-memory
//! database seeded with one operator account.

use aih_common::db::init_memory_database;
use aih_server::{accounts, build_router, AppState};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app over a fresh database plus the seeded user's id
async fn setup_app() -> (Router, i64) {
    let db = init_memory_database().await.unwrap();
    let user = accounts::create_user(&db, "ana", "secret").await.unwrap();
    (build_router(AppState::new(db)), user.id)
}

fn get(uri: &str, user: i64) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-user-id", user.to_string())
        .body(Body::empty())
        .unwrap()
}

fn delete(uri: &str, user: i64) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("x-user-id", user.to_string())
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, user: Option<i64>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn registration() -> Value {
    json!({
        "number": "12345678901",
        "initial_value": 1000.00,
        "competency": "05/2024",
        "attendances": ["A1", "A2"]
    })
}

// =============================================================================
// Health and accounts
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let (app, _) = setup_app().await;

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "aih-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_create_user_and_login() {
    let (app, _) = setup_app().await;

    let (status, body) = send(
        &app,
        post("/api/users", None, json!({"name": "bruno", "password": "hunter22"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "bruno");
    assert!(body.get("password_hash").is_none());

    let (status, _) = send(
        &app,
        post("/api/users", None, json!({"name": "bruno", "password": "other"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        post("/api/login", None, json!({"name": "bruno", "password": "hunter22"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "bruno");

    let (status, body) = send(
        &app,
        post("/api/login", None, json!({"name": "bruno", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

// =============================================================================
// Record lifecycle
// =============================================================================

#[tokio::test]
async fn test_register_fetch_and_move() {
    let (app, user) = setup_app().await;

    let (status, body) = send(&app, post("/api/aih", Some(user), registration())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(&app, get("/api/aih/12345678901", user)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["status"], 3);
    assert_eq!(body["status_description"], "Active in discussion");
    assert_eq!(body["finalized"], false);
    assert_eq!(body["current_value"], 1000.0);
    assert_eq!(body["attendances"], json!(["A1", "A2"]));
    assert_eq!(body["movements"].as_array().unwrap().len(), 1);

    let movement = json!({
        "kind": "saida_hospital",
        "status": 1,
        "value": "950.00",
        "competency": "05/2024",
        "professionals": {"medicine": "Dra. Silva"}
    });
    let (status, body) = send(
        &app,
        post(&format!("/api/aih/{}/movements", id), Some(user), movement),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["record"]["status"], 1);
    assert_eq!(body["record"]["current_value"], 950.0);
    assert_eq!(body["active_glosas"], 0);

    let (status, body) = send(&app, get(&format!("/api/aih/{}", id), user)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["finalized"], true);
    assert_eq!(body["movements"].as_array().unwrap().len(), 2);
    assert_eq!(body["movements"][0]["kind"], "saida_hospital");
}

#[tokio::test]
async fn test_register_errors() {
    let (app, user) = setup_app().await;
    send(&app, post("/api/aih", Some(user), registration())).await;

    let (status, body) = send(&app, post("/api/aih", Some(user), registration())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("12345678901"));

    let mut bad = registration();
    bad["number"] = json!("123");
    let (status, _) = send(&app, post("/api/aih", Some(user), bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/api/aih/99999999999", user)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/api/aih/not-a-number", user)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_rejects_sub_cent_amounts() {
    let (app, user) = setup_app().await;

    for amount in [json!(1000.456), json!("1000.456")] {
        let mut bad = registration();
        bad["initial_value"] = amount;
        let (status, _) = send(&app, post("/api/aih", Some(user), bad)).await;
        assert!(status.is_client_error(), "accepted {}", status);
    }

    let (status, _) = send(&app, get("/api/aih/12345678901", user)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_movement_with_invalid_status_code() {
    let (app, user) = setup_app().await;
    let (_, body) = send(&app, post("/api/aih", Some(user), registration())).await;
    let id = body["id"].as_i64().unwrap();

    let movement = json!({
        "kind": "saida_hospital",
        "status": 7,
        "value": 10,
        "competency": "05/2024"
    });
    let (status, _) = send(
        &app,
        post(&format!("/api/aih/{}/movements", id), Some(user), movement),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Glosas and catalogs
// =============================================================================

#[tokio::test]
async fn test_glosa_endpoints() {
    let (app, user) = setup_app().await;
    let (_, body) = send(&app, post("/api/aih", Some(user), registration())).await;
    let id = body["id"].as_i64().unwrap();

    let glosa = json!({
        "line_ref": "Line 3",
        "glosa_type": "Missing signature",
        "professional": "Dra. Silva"
    });
    let (status, body) = send(
        &app,
        post(&format!("/api/aih/{}/glosas", id), Some(user), glosa),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quantity"], 1);
    let glosa_id = body["id"].as_i64().unwrap();

    let (status, body) = send(&app, get(&format!("/api/aih/{}/glosas", id), user)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pending"], true);
    assert_eq!(body["glosas"].as_array().unwrap().len(), 1);

    for _ in 0..2 {
        let (status, _) = send(&app, delete(&format!("/api/glosas/{}", glosa_id), user)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (_, body) = send(&app, get(&format!("/api/aih/{}/glosas", id), user)).await;
    assert_eq!(body["pending"], false);
    assert!(body["glosas"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_catalog_endpoints() {
    let (app, user) = setup_app().await;

    let (status, body) = send(
        &app,
        post(
            "/api/professionals",
            Some(user),
            json!({"name": "Enf. Costa", "specialty": "nursing"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let professional_id = body["id"].as_i64().unwrap();

    let (_, body) = send(&app, get("/api/professionals", user)).await;
    assert_eq!(body[0]["name"], "Enf. Costa");
    assert_eq!(body[0]["specialty"], "nursing");

    let (status, _) = send(
        &app,
        delete(&format!("/api/professionals/{}", professional_id), user),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(
        &app,
        delete(&format!("/api/professionals/{}", professional_id), user),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        post(
            "/api/glosa-types",
            Some(user),
            json!({"description": "Missing signature"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let type_id = body["id"].as_i64().unwrap();

    let (_, body) = send(&app, get("/api/glosa-types", user)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, delete(&format!("/api/glosa-types/{}", type_id), user)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, get("/api/glosa-types", user)).await;
    assert!(body.as_array().unwrap().is_empty());
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn test_search_dashboard_reports_export() {
    let (app, user) = setup_app().await;
    send(&app, post("/api/aih", Some(user), registration())).await;

    let (status, body) = send(
        &app,
        post("/api/search", Some(user), json!({"value_min": 900, "value_max": 1000})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["number"], "12345678901");
    assert_eq!(body[0]["active_glosa_count"], 0);

    let (status, body) = send(&app, get("/api/dashboard?competency=05/2024", user)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["competency"], "05/2024");
    assert_eq!(body["in_process"], 1);
    assert_eq!(body["total"], 1);

    let (status, body) = send(&app, get("/api/dashboard", user)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["competency"].is_string());

    let (status, _) = send(&app, get("/api/dashboard?competency=13/2024", user)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/api/reports/aprovacoes", user)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "aprovacoes");
    assert_eq!(body["result"]["total"], 1);

    let (status, _) = send(&app, get("/api/reports/unknown", user)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/api/export", user)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["attendances"], "A1,A2");
}
