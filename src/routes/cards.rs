use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_cards))
}

/// Every catalog variant, sorted by name then rarity.
async fn list_cards(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().list_card_variants()?))
}
