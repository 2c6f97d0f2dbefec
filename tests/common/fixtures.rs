use chrono::{Duration, Utc};

use card_backend::auth::hash_password;
use card_backend::services::starter_catalog::{StarterContent, StarterEntry};
use card_backend::store::operations::sessions::Session;
use card_backend::store::operations::users::User;
use card_backend::store::Store;

pub fn seed_user(store: &Store, email: &str, username: &str, password: &str) -> User {
    let now = Utc::now();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.to_string(),
        username: username.to_string(),
        password_hash: hash_password(password).expect("hash password"),
        pack_balance: 0,
        created_at: now,
        updated_at: now,
    };
    store.create_user(&user).expect("create seed user");
    user
}

/// Insert a session that expired `hours_ago` hours ago.
pub fn seed_expired_session(store: &Store, user_id: &str, token_hash: &str, hours_ago: i64) {
    let now = Utc::now();
    store
        .create_session(&Session {
            token_hash: token_hash.to_string(),
            user_id: user_id.to_string(),
            created_at: now - Duration::hours(hours_ago + 24),
            expires_at: now - Duration::hours(hours_ago),
        })
        .expect("create expired session");
}

/// Default content with one entry swapped for a name the catalog lacks.
pub fn content_with_unknown_card() -> StarterContent {
    let mut content = StarterContent::default();
    content.entries[0] = StarterEntry {
        name: "Nonexistent Card".to_string(),
        quantity: content.entries[0].quantity,
    };
    content
}
