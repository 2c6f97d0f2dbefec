pub const USERS: &str = "users";
pub const SESSIONS: &str = "sessions";

// Card catalog and per-user collection
pub const CARDS: &str = "cards";
pub const OWNED_CARDS: &str = "owned_cards";
pub const DECKS: &str = "decks";

/// Schema version and other bookkeeping.
pub const META: &str = "meta";
