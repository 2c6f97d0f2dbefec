use std::time::Duration;

/// Level of a freshly granted card.
pub const INITIAL_CARD_LEVEL: u32 = 1;

/// Experience of a freshly granted card.
pub const INITIAL_CARD_EXPERIENCE: u64 = 0;

/// Name of the deck created for every new user.
pub const STARTER_DECK_NAME: &str = "Starter Deck";

/// Cards in the starter deck, and the number of cards the starter catalog should yield.
pub const STARTER_DECK_SIZE: usize = 20;

/// Packs credited to every new user.
pub const STARTER_PACK_QUANTITY: u32 = 10;

/// Upper bound on copies of one starter card in a loaded catalog.
pub const MAX_STARTER_ENTRY_QUANTITY: u32 = 100;

/// Pack credit attempts before the grant gives up on a storage error.
pub const PACK_CREDIT_MAX_ATTEMPTS: u32 = 3;

/// Default session reaper period.
pub const SESSION_REAPER_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Default session lifetime (hours).
pub const DEFAULT_SESSION_TTL_HOURS: u64 = 24;

/// Header carrying the admin API key.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";
