use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::transaction::TransactionalTree;

use crate::constants::{INITIAL_CARD_EXPERIENCE, INITIAL_CARD_LEVEL};
use crate::store::keys;
use crate::store::{Store, StoreError, TxResult};

/// A user's copy of a card variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OwnedCard {
    pub id: String,
    pub user_id: String,
    pub card_variant_id: String,
    pub level: u32,
    pub experience: u64,
    pub acquired_at: DateTime<Utc>,
}

impl OwnedCard {
    pub fn new(user_id: &str, card_variant_id: &str, acquired_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            card_variant_id: card_variant_id.to_string(),
            level: INITIAL_CARD_LEVEL,
            experience: INITIAL_CARD_EXPERIENCE,
            acquired_at,
        }
    }
}

/// Write an owned card and its user index entry inside a transaction over
/// the `owned_cards` tree.
pub fn put_owned_card_tx(owned_cards: &TransactionalTree, card: &OwnedCard) -> TxResult<()> {
    let key = keys::owned_card_key(&card.id);
    let index_key = keys::owned_card_user_index_key(&card.user_id, &card.id);
    owned_cards.insert(key.as_bytes(), Store::serialize_tx(card)?)?;
    owned_cards.insert(index_key.as_bytes(), &[] as &[u8])?;
    Ok(())
}

impl Store {
    pub fn get_owned_card(&self, instance_id: &str) -> Result<Option<OwnedCard>, StoreError> {
        let key = keys::owned_card_key(instance_id);
        match self.owned_cards.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn list_owned_cards(&self, user_id: &str) -> Result<Vec<OwnedCard>, StoreError> {
        let prefix = keys::user_index_prefix(user_id);
        let mut cards = Vec::new();

        for item in self.owned_cards.scan_prefix(prefix.as_bytes()) {
            let (k, _) = item?;
            let Some(instance_id) = keys::id_from_user_index_key(&k) else {
                tracing::warn!("Skipping malformed owned card index key");
                continue;
            };
            if let Some(card) = self.get_owned_card(&instance_id)? {
                cards.push(card);
            }
        }

        cards.sort_by(|a, b| a.acquired_at.cmp(&b.acquired_at).then_with(|| a.id.cmp(&b.id)));
        Ok(cards)
    }

    pub fn count_owned_cards(&self, user_id: &str) -> Result<usize, StoreError> {
        let prefix = keys::user_index_prefix(user_id);
        let mut count = 0usize;
        for item in self.owned_cards.scan_prefix(prefix.as_bytes()) {
            let _ = item?;
            count += 1;
        }
        Ok(count)
    }
}
