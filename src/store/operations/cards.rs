use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::transaction::TransactionalTree;

use crate::store::keys;
use crate::store::{Store, StoreError, TxResult};

/// Printing of a card. `Standard` is the canonical variant; the others are
/// enhanced forms of the same card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CardRarity {
    Standard,
    Foil,
    Golden,
}

impl CardRarity {
    pub const ALL: [CardRarity; 3] = [CardRarity::Standard, CardRarity::Foil, CardRarity::Golden];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Foil => "foil",
            Self::Golden => "golden",
        }
    }

    pub fn is_enhanced(self) -> bool {
        self != Self::Standard
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardVariant {
    pub id: String,
    pub name: String,
    pub rarity: CardRarity,
    pub created_at: DateTime<Utc>,
}

impl CardVariant {
    pub fn new(name: &str, rarity: CardRarity) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            rarity,
            created_at: Utc::now(),
        }
    }
}

/// Catalog lookup usable inside a multi-tree transaction over the `cards` tree.
pub fn lookup_variant_tx(
    cards: &TransactionalTree,
    name: &str,
    rarity: CardRarity,
) -> TxResult<Option<CardVariant>> {
    let index_key = keys::card_name_index_key(name, rarity.as_str());
    let Some(id_raw) = cards.get(index_key.as_bytes())? else {
        return Ok(None);
    };
    let Some(raw) = cards.get(id_raw)? else {
        tracing::warn!(name, rarity = rarity.as_str(), "Card name index points at a missing variant");
        return Ok(None);
    };
    Ok(Some(Store::deserialize_tx(&raw)?))
}

impl Store {
    /// Insert a variant unless one with the same name and rarity already exists.
    /// Returns the stored variant either way.
    pub fn ensure_card_variant(&self, variant: &CardVariant) -> Result<CardVariant, StoreError> {
        let index_key = keys::card_name_index_key(&variant.name, variant.rarity.as_str());
        let record_key = keys::card_key(&variant.id);

        let stored = self.cards.transaction(|tx| -> TxResult<CardVariant> {
            if let Some(existing) = lookup_variant_tx(tx, &variant.name, variant.rarity)? {
                return Ok(existing);
            }
            tx.insert(record_key.as_bytes(), Self::serialize_tx(variant)?)?;
            tx.insert(index_key.as_bytes(), variant.id.as_bytes())?;
            Ok(variant.clone())
        })?;
        Ok(stored)
    }

    pub fn get_card_variant(&self, variant_id: &str) -> Result<Option<CardVariant>, StoreError> {
        let key = keys::card_key(variant_id);
        match self.cards.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn find_card_variant(
        &self,
        name: &str,
        rarity: CardRarity,
    ) -> Result<Option<CardVariant>, StoreError> {
        let found = self
            .cards
            .transaction(|tx| lookup_variant_tx(tx, name, rarity))?;
        Ok(found)
    }

    /// Whole catalog, ordered by name and then rarity.
    pub fn list_card_variants(&self) -> Result<Vec<CardVariant>, StoreError> {
        let mut variants = Vec::new();
        for item in self.cards.iter() {
            let (k, v) = item?;
            if keys::is_index_key(&k) {
                continue;
            }
            variants.push(Self::deserialize::<CardVariant>(&v)?);
        }
        variants.sort_by(|a, b| a.name.cmp(&b.name).then(a.rarity.cmp(&b.rarity)));
        Ok(variants)
    }
}
