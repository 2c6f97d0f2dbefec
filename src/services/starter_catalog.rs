use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    MAX_STARTER_ENTRY_QUANTITY, STARTER_DECK_NAME, STARTER_DECK_SIZE, STARTER_PACK_QUANTITY,
};

/// Base cards every new user receives, with the number of copies.
pub const DEFAULT_STARTER_CARDS: &[(&str, u32)] = &[
    ("Apprentice Mage", 2),
    ("Goblin Scout", 2),
    ("Iron Sentinel", 2),
    ("Forest Sprite", 2),
    ("Ember Drake", 1),
    ("Tide Caller", 2),
    ("Stone Golem", 1),
    ("Shadow Rogue", 2),
    ("Healing Acolyte", 2),
    ("Storm Archer", 1),
    ("Frost Wisp", 1),
    ("Ironbark Druid", 1),
    ("Wandering Knight", 1),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StarterEntry {
    pub name: String,
    pub quantity: u32,
}

/// Everything granted to a new user. Immutable once loaded; the service
/// holds it behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct StarterContent {
    pub entries: Vec<StarterEntry>,
    pub deck_name: String,
    pub deck_size: usize,
    pub pack_quantity: u32,
}

#[derive(Debug, Error)]
pub enum StarterContentConfigError {
    #[error("cannot read starter content file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid starter content JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid starter content: {0}")]
    Invalid(String),
}

impl Default for StarterContent {
    fn default() -> Self {
        Self {
            entries: DEFAULT_STARTER_CARDS
                .iter()
                .map(|(name, quantity)| StarterEntry {
                    name: (*name).to_string(),
                    quantity: *quantity,
                })
                .collect(),
            deck_name: STARTER_DECK_NAME.to_string(),
            deck_size: STARTER_DECK_SIZE,
            pack_quantity: STARTER_PACK_QUANTITY,
        }
    }
}

impl StarterContent {
    /// Built-in content when `path` is `None`, otherwise the JSON file at `path`.
    /// Fields missing from the file keep their built-in values.
    pub fn load(path: Option<&str>) -> Result<Self, StarterContentConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| StarterContentConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        let content = Self::from_json(&raw)?;
        tracing::info!(
            path,
            entries = content.entries.len(),
            total_cards = content.total_cards(),
            "Loaded starter content"
        );
        Ok(content)
    }

    pub fn from_json(raw: &str) -> Result<Self, StarterContentConfigError> {
        let content: Self = serde_json::from_str(raw)?;
        content.validate()?;
        Ok(content)
    }

    pub fn validate(&self) -> Result<(), StarterContentConfigError> {
        if self.entries.is_empty() {
            return Err(StarterContentConfigError::Invalid(
                "at least one starter card is required".to_string(),
            ));
        }
        if self.deck_name.trim().is_empty() {
            return Err(StarterContentConfigError::Invalid(
                "deck name must not be empty".to_string(),
            ));
        }
        if self.deck_size == 0 {
            return Err(StarterContentConfigError::Invalid(
                "deck size must be positive".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            let name = entry.name.trim();
            if name.is_empty() {
                return Err(StarterContentConfigError::Invalid(
                    "card name must not be empty".to_string(),
                ));
            }
            if entry.quantity == 0 {
                return Err(StarterContentConfigError::Invalid(format!(
                    "quantity of '{name}' must be positive"
                )));
            }
            if entry.quantity > MAX_STARTER_ENTRY_QUANTITY {
                return Err(StarterContentConfigError::Invalid(format!(
                    "quantity of '{name}' must be at most {MAX_STARTER_ENTRY_QUANTITY}"
                )));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(StarterContentConfigError::Invalid(format!(
                    "duplicate card '{name}'"
                )));
            }
        }
        Ok(())
    }

    /// Copies granted when every entry resolves. Saturates at `u32::MAX`.
    pub fn total_cards(&self) -> u32 {
        self.entries
            .iter()
            .try_fold(0u32, |total, e| total.checked_add(e.quantity))
            .unwrap_or(u32::MAX)
    }
}
