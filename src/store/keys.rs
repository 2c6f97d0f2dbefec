//! Key layout for every tree. Primary records are keyed by id; secondary
//! indexes share the tree under a fixed prefix and carry an empty value
//! (or the primary id, for unique lookups).

pub const USER_INDEX_PREFIX: &str = "user:";
pub const EMAIL_INDEX_PREFIX: &str = "email:";
pub const NAME_INDEX_PREFIX: &str = "name:";

/// True for keys that belong to a secondary index rather than a record.
pub fn is_index_key(key: &[u8]) -> bool {
    [USER_INDEX_PREFIX, EMAIL_INDEX_PREFIX, NAME_INDEX_PREFIX]
        .iter()
        .any(|prefix| key.starts_with(prefix.as_bytes()))
}

pub fn user_key(user_id: &str) -> String {
    user_id.to_string()
}

pub fn user_email_index_key(email: &str) -> String {
    format!("{EMAIL_INDEX_PREFIX}{}", email.trim().to_lowercase())
}

pub fn session_key(token_hash: &str) -> String {
    token_hash.to_string()
}

pub fn session_user_index_key(user_id: &str, token_hash: &str) -> String {
    format!("{USER_INDEX_PREFIX}{}:{}", user_id, token_hash)
}

pub fn card_key(variant_id: &str) -> String {
    variant_id.to_string()
}

/// Card names are matched case-insensitively; one variant per (name, rarity).
pub fn card_name_index_key(name: &str, rarity: &str) -> String {
    format!("{NAME_INDEX_PREFIX}{}:{}", name.trim().to_lowercase(), rarity)
}

pub fn owned_card_key(instance_id: &str) -> String {
    instance_id.to_string()
}

pub fn owned_card_user_index_key(user_id: &str, instance_id: &str) -> String {
    format!("{USER_INDEX_PREFIX}{}:{}", user_id, instance_id)
}

pub fn deck_key(deck_id: &str) -> String {
    deck_id.to_string()
}

pub fn deck_user_index_key(user_id: &str, deck_id: &str) -> String {
    format!("{USER_INDEX_PREFIX}{}:{}", user_id, deck_id)
}

/// Prefix shared by every per-user index entry, in any tree.
pub fn user_index_prefix(user_id: &str) -> String {
    format!("{USER_INDEX_PREFIX}{}:", user_id)
}

/// Extract the trailing record id from a `user:{user_id}:{id}` index key.
pub fn id_from_user_index_key(key: &[u8]) -> Option<String> {
    let key = std::str::from_utf8(key).ok()?;
    let rest = key.strip_prefix(USER_INDEX_PREFIX)?;
    let (_, id) = rest.rsplit_once(':')?;
    (!id.is_empty()).then(|| id.to_string())
}
