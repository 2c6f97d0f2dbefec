//! Starter content granted to newly registered users: one owned copy per
//! catalog entry and unit of quantity, a starter deck built from those
//! copies, and a pack credit.
//!
//! Cards and deck are written in one sled transaction. The pack credit runs
//! afterwards in its own transaction, so a failure there leaves the user with
//! cards but no packs. Storage errors on that step are retried a few times
//! before the grant gives up.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use sled::Transactional;
use thiserror::Error;

use crate::constants::PACK_CREDIT_MAX_ATTEMPTS;
use crate::services::starter_catalog::StarterContent;
use crate::store::operations::cards::{lookup_variant_tx, CardRarity};
use crate::store::operations::decks::{put_deck_tx, Deck};
use crate::store::operations::owned_cards::{put_owned_card_tx, OwnedCard};
use crate::store::operations::users::User;
use crate::store::{Store, StoreError, TxResult};

#[derive(Debug, Error)]
pub enum StarterContentError {
    #[error("starter content storage failure: {0}")]
    Store(#[from] StoreError),
    #[error("pack credit matched no user: {user_id}")]
    PackCreditRejected { user_id: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StarterGrant {
    pub user_id: String,
    /// Created instances, in catalog order.
    pub card_instance_ids: Vec<String>,
    pub deck: Deck,
    /// Catalog names with no canonical variant; nothing was granted for them.
    pub missing_cards: Vec<String>,
    pub packs_credited: u32,
    pub pack_balance: u32,
}

/// Outcome of the transactional part of a grant.
struct StarterCollection {
    card_instance_ids: Vec<String>,
    deck: Deck,
    missing_cards: Vec<String>,
}

/// First `deck_size` instance ids, keeping their order.
pub fn assemble_deck(card_instance_ids: &[String], deck_size: usize) -> Vec<String> {
    card_instance_ids.iter().take(deck_size).cloned().collect()
}

#[derive(Debug, Clone)]
pub struct StarterContentService {
    store: Arc<Store>,
    content: Arc<StarterContent>,
}

impl StarterContentService {
    pub fn new(store: Arc<Store>, content: Arc<StarterContent>) -> Self {
        Self { store, content }
    }

    pub fn content(&self) -> &StarterContent {
        &self.content
    }

    pub fn grant(&self, user_id: &str) -> Result<StarterGrant, StarterContentError> {
        let collection = match self.create_collection(user_id) {
            Ok(collection) => collection,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Starter collection rolled back");
                return Err(e.into());
            }
        };

        let expected_names = self.content.entries.len();
        if !collection.missing_cards.is_empty() {
            tracing::warn!(
                user_id,
                expected = expected_names,
                resolved = expected_names - collection.missing_cards.len(),
                missing = ?collection.missing_cards,
                enhanced_only = ?self.enhanced_only(&collection.missing_cards),
                "Starter catalog lookup returned fewer cards than expected"
            );
        }

        let created = collection.card_instance_ids.len();
        if created != self.content.deck_size {
            tracing::warn!(
                user_id,
                created,
                expected = self.content.deck_size,
                "Starter card count does not match deck size"
            );
        }

        let user = self.credit_packs(user_id)?;

        tracing::info!(
            user_id,
            cards = created,
            deck_id = %collection.deck.id,
            packs = self.content.pack_quantity,
            "Granted starter content"
        );

        Ok(StarterGrant {
            user_id: user_id.to_string(),
            card_instance_ids: collection.card_instance_ids,
            deck: collection.deck,
            missing_cards: collection.missing_cards,
            packs_credited: self.content.pack_quantity,
            pack_balance: user.pack_balance,
        })
    }

    /// Resolve the catalog, create the owned cards and the starter deck in a
    /// single transaction.
    fn create_collection(&self, user_id: &str) -> Result<StarterCollection, StoreError> {
        let store = &self.store;
        let content = &self.content;

        let collection = (&store.cards, &store.owned_cards, &store.decks).transaction(
            |(cards, owned_cards, decks)| -> TxResult<StarterCollection> {
                let now = Utc::now();
                let mut missing_cards = Vec::new();
                let mut card_instance_ids = Vec::with_capacity(content.deck_size);

                for entry in &content.entries {
                    let Some(variant) = lookup_variant_tx(cards, &entry.name, CardRarity::Standard)?
                    else {
                        missing_cards.push(entry.name.clone());
                        continue;
                    };
                    for _ in 0..entry.quantity {
                        let card = OwnedCard::new(user_id, &variant.id, now);
                        put_owned_card_tx(owned_cards, &card)?;
                        card_instance_ids.push(card.id);
                    }
                }

                let deck = Deck::new(
                    user_id,
                    &content.deck_name,
                    assemble_deck(&card_instance_ids, content.deck_size),
                );
                put_deck_tx(decks, &deck)?;

                Ok(StarterCollection {
                    card_instance_ids,
                    deck,
                    missing_cards,
                })
            },
        )?;

        Ok(collection)
    }

    /// Missing names that exist in the catalog only as enhanced printings.
    fn enhanced_only(&self, missing: &[String]) -> Vec<String> {
        missing
            .iter()
            .filter(|name| {
                CardRarity::ALL
                    .into_iter()
                    .filter(|rarity| rarity.is_enhanced())
                    .any(|rarity| matches!(self.store.find_card_variant(name, rarity), Ok(Some(_))))
            })
            .cloned()
            .collect()
    }

    fn credit_packs(&self, user_id: &str) -> Result<User, StarterContentError> {
        let quantity = self.content.pack_quantity;
        let mut attempt = 1;
        loop {
            match self.store.add_pack_credit(user_id, quantity) {
                Ok(Some(user)) => return Ok(user),
                Ok(None) => {
                    tracing::error!(user_id, quantity, "Pack credit matched no user; cards and deck are kept");
                    return Err(StarterContentError::PackCreditRejected {
                        user_id: user_id.to_string(),
                    });
                }
                Err(e) if attempt < PACK_CREDIT_MAX_ATTEMPTS => {
                    tracing::warn!(user_id, attempt, error = %e, "Pack credit failed, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(user_id, attempt, error = %e, "Pack credit failed; cards and deck are kept");
                    return Err(e.into());
                }
            }
        }
    }
}
