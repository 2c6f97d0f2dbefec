pub mod admin;
pub mod auth;
pub mod cards;
pub mod health;
pub mod users;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::response::AppError;
use crate::state::AppState;

/// Maximum request body size: 64 KiB.
const MAX_BODY_SIZE: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/cards", cards::router())
        .nest("/admin", admin::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE));

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::router())
        .fallback(route_not_found)
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::not_found("Not found")
}
