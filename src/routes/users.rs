use std::collections::HashMap;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::response::{ok, AppError};
use crate::routes::auth::UserProfile;
use crate::state::AppState;
use crate::store::operations::cards::{CardRarity, CardVariant};
use crate::store::operations::decks::Deck;
use crate::store::operations::owned_cards::OwnedCard;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/me/collection", get(collection))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionCard {
    pub id: String,
    pub card_variant_id: String,
    /// `None` if the variant row has since been removed from the catalog.
    pub name: Option<String>,
    pub rarity: Option<CardRarity>,
    pub level: u32,
    pub experience: u64,
    pub acquired_at: chrono::DateTime<chrono::Utc>,
}

impl CollectionCard {
    fn new(card: OwnedCard, variant: Option<&CardVariant>) -> Self {
        Self {
            id: card.id,
            card_variant_id: card.card_variant_id,
            name: variant.map(|v| v.name.clone()),
            rarity: variant.map(|v| v.rarity),
            level: card.level,
            experience: card.experience,
            acquired_at: card.acquired_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionResponse {
    pub cards: Vec<CollectionCard>,
    pub decks: Vec<Deck>,
    pub pack_balance: u32,
}

async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .store()
        .get_user_by_id(&auth.user_id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(ok(UserProfile::from(&user)))
}

async fn collection(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store();
    let user = store
        .get_user_by_id(&auth.user_id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let owned = store.list_owned_cards(&user.id)?;
    let mut variants: HashMap<String, Option<CardVariant>> = HashMap::new();
    let mut cards = Vec::with_capacity(owned.len());
    for card in owned {
        if !variants.contains_key(&card.card_variant_id) {
            let variant = store.get_card_variant(&card.card_variant_id)?;
            variants.insert(card.card_variant_id.clone(), variant);
        }
        let variant = variants.get(&card.card_variant_id).and_then(Option::as_ref);
        cards.push(CollectionCard::new(card, variant));
    }

    Ok(ok(CollectionResponse {
        cards,
        decks: store.list_decks(&user.id)?,
        pack_balance: user.pack_balance,
    }))
}
