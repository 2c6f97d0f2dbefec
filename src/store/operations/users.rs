use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::transaction::ConflictableTransactionError;

use crate::store::keys;
use crate::store::{Store, StoreError, TxResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    /// Unopened card packs the user can redeem.
    #[serde(default)]
    pub pack_balance: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    /// Insert a new user together with its email index entry. Fails with
    /// `Conflict` when the (case-insensitive) email is already registered.
    pub fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let record_key = keys::user_key(&user.id);
        let email_key = keys::user_email_index_key(&user.email);
        let record = Self::serialize(user)?;

        self.users.transaction(|tx| -> TxResult<()> {
            if tx.get(email_key.as_bytes())?.is_some() {
                return Err(ConflictableTransactionError::Abort(StoreError::Conflict {
                    entity: "user_email".to_string(),
                    key: user.email.clone(),
                }));
            }
            tx.insert(email_key.as_bytes(), user.id.as_bytes())?;
            tx.insert(record_key.as_bytes(), record.as_slice())?;
            Ok(())
        })?;
        Ok(())
    }

    pub fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        self.users
            .get(keys::user_key(user_id).as_bytes())?
            .map(|raw| Self::deserialize(&raw))
            .transpose()
    }

    /// Email lookup is case-insensitive. A dangling or non-UTF-8 index entry
    /// reads as no user.
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let Some(id) = self.users.get(keys::user_email_index_key(email).as_bytes())? else {
            return Ok(None);
        };
        match std::str::from_utf8(&id) {
            Ok(user_id) => self.get_user_by_id(user_id),
            Err(e) => {
                tracing::warn!(error = %e, "Email index entry is not a valid user id");
                Ok(None)
            }
        }
    }

    pub fn count_users(&self) -> Result<usize, StoreError> {
        self.users.iter().keys().try_fold(0usize, |count, key| {
            Ok(count + usize::from(!keys::is_index_key(&key?)))
        })
    }

    /// Add `quantity` packs to the user's balance.
    ///
    /// Returns the updated user, or `None` when no user with this id exists
    /// (nothing is written in that case).
    pub fn add_pack_credit(
        &self,
        user_id: &str,
        quantity: u32,
    ) -> Result<Option<User>, StoreError> {
        let key = keys::user_key(user_id);
        let updated = self.users.transaction(|tx| -> TxResult<Option<User>> {
            let Some(raw) = tx.get(key.as_bytes())? else {
                return Ok(None);
            };
            let mut user: User = Self::deserialize_tx(&raw)?;
            user.pack_balance = user.pack_balance.saturating_add(quantity);
            user.updated_at = Utc::now();
            tx.insert(key.as_bytes(), Self::serialize_tx(&user)?)?;
            Ok(Some(user))
        })?;
        Ok(updated)
    }
}
