use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::transaction::TransactionalTree;

use crate::store::keys;
use crate::store::{Store, StoreError, TxResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// Owned card instance ids, in deck order.
    pub card_instance_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Deck {
    pub fn new(user_id: &str, name: &str, card_instance_ids: Vec<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            card_instance_ids,
            created_at: Utc::now(),
        }
    }
}

/// Write a deck and its user index entry inside a transaction over the
/// `decks` tree.
pub fn put_deck_tx(decks: &TransactionalTree, deck: &Deck) -> TxResult<()> {
    let key = keys::deck_key(&deck.id);
    let index_key = keys::deck_user_index_key(&deck.user_id, &deck.id);
    decks.insert(key.as_bytes(), Store::serialize_tx(deck)?)?;
    decks.insert(index_key.as_bytes(), &[] as &[u8])?;
    Ok(())
}

impl Store {
    pub fn get_deck(&self, deck_id: &str) -> Result<Option<Deck>, StoreError> {
        let key = keys::deck_key(deck_id);
        match self.decks.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn list_decks(&self, user_id: &str) -> Result<Vec<Deck>, StoreError> {
        let prefix = keys::user_index_prefix(user_id);
        let mut decks = Vec::new();

        for item in self.decks.scan_prefix(prefix.as_bytes()) {
            let (k, _) = item?;
            let Some(deck_id) = keys::id_from_user_index_key(&k) else {
                continue;
            };
            if let Some(deck) = self.get_deck(&deck_id)? {
                decks.push(deck);
            }
        }

        decks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(decks)
    }
}
