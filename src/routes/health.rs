use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .route("/database", get(database_health))
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "uptimeSecs": state.uptime_secs(),
        "sessionReaper": {
            "running": state.reaper().is_running(),
            "intervalSecs": state.reaper().interval().as_secs(),
            "scheduledPasses": state.reaper().scheduled_passes(),
        }
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Ready once the catalog is seeded; registration grants nothing before that.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().list_card_variants() {
        Ok(variants) if !variants.is_empty() => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Times a scan of the users and sessions trees.
pub async fn database_health(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let counts = state
        .store()
        .count_users()
        .and_then(|users| Ok((users, state.store().count_sessions()?)));
    let latency_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    match counts {
        Ok((users, sessions)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "healthy": true,
                "latencyUs": latency_us,
                "users": users,
                "sessions": sessions,
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "healthy": false, "latencyUs": latency_us })),
            )
        }
    }
}
