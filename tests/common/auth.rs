use axum::http::{Method, StatusCode};
use axum::Router;
use serde_json::Value;

use super::http::{request, response_json};

pub const TEST_PASSWORD: &str = "Passw0rd!";

pub fn auth_header(token: &str) -> (&'static str, String) {
    ("authorization", format!("Bearer {token}"))
}

/// Register a fresh account and return the `data` object of the response.
pub async fn register(app: &Router, email: &str, username: &str) -> Value {
    let response = request(
        app,
        Method::POST,
        "/api/auth/register",
        Some(serde_json::json!({
            "email": email,
            "username": username,
            "password": TEST_PASSWORD,
        })),
        &[],
    )
    .await;

    let (status, _, body) = response_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["data"].clone()
}

/// Register a random account and return its session token.
pub async fn register_and_get_token(app: &Router) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    let data = register(app, &format!("player-{id}@test.com"), &format!("p-{}", &id[..12])).await;
    data["token"].as_str().expect("token").to_string()
}
