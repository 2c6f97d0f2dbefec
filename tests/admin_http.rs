mod common;

use axum::http::{Method, StatusCode};

use card_backend::services::starter_catalog::StarterContent;
use common::app::{spawn_test_app, spawn_with, TEST_ADMIN_KEY};
use common::auth::{auth_header, register_and_get_token};
use common::fixtures::{seed_expired_session, seed_user};
use common::http::{assert_json_error, assert_status_ok_json, request, response_json};

fn admin_header(key: &str) -> (&'static str, String) {
    ("x-admin-key", key.to_string())
}

#[tokio::test]
async fn it_cleanup_removes_only_expired_sessions() {
    let app = spawn_test_app().await;
    let live_token = register_and_get_token(&app.app).await;
    let user = seed_user(&app.store, "stale@test.com", "stale", "Passw0rd!");
    for i in 0..3 {
        seed_expired_session(&app.store, &user.id, &format!("expired-{i}"), i + 1);
    }
    assert_eq!(app.store.count_sessions().unwrap(), 4);

    let response = request(
        &app.app,
        Method::POST,
        "/api/admin/sessions/cleanup",
        None,
        &[admin_header(TEST_ADMIN_KEY)],
    )
    .await;
    let (status, _, body) = response_json(response).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["deleted"], 3);
    assert_eq!(app.store.count_sessions().unwrap(), 1);

    let response = request(&app.app, Method::GET, "/api/users/me", None, &[auth_header(&live_token)]).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn it_cleanup_with_nothing_expired_reports_zero() {
    let app = spawn_test_app().await;
    register_and_get_token(&app.app).await;

    let response = request(
        &app.app,
        Method::POST,
        "/api/admin/sessions/cleanup",
        None,
        &[admin_header(TEST_ADMIN_KEY)],
    )
    .await;
    let (status, _, body) = response_json(response).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["deleted"], 0);
}

#[tokio::test]
async fn it_cleanup_rejects_missing_or_wrong_key() {
    let app = spawn_test_app().await;

    let response = request(&app.app, Method::POST, "/api/admin/sessions/cleanup", None, &[]).await;
    let (status, _, body) = response_json(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_json_error(&body, "AUTH_UNAUTHORIZED");

    let response = request(
        &app.app,
        Method::POST,
        "/api/admin/sessions/cleanup",
        None,
        &[admin_header("wrong-key")],
    )
    .await;
    let (status, _, _) = response_json(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn it_cleanup_is_disabled_without_configured_key() {
    let app = spawn_with(StarterContent::default(), "").await;

    let response = request(
        &app.app,
        Method::POST,
        "/api/admin/sessions/cleanup",
        None,
        &[admin_header("")],
    )
    .await;
    let (status, _, body) = response_json(response).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_json_error(&body, "FORBIDDEN");
}
