use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError, TxResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token_hash: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl Store {
    pub fn create_session(&self, session: &Session) -> Result<(), StoreError> {
        let key = keys::session_key(&session.token_hash);
        let index_key = keys::session_user_index_key(&session.user_id, &session.token_hash);
        let session_bytes = Self::serialize(session)?;

        self.sessions.transaction(|tx| -> TxResult<()> {
            tx.insert(key.as_bytes(), session_bytes.as_slice())?;
            tx.insert(index_key.as_bytes(), &[] as &[u8])?;
            Ok(())
        })?;
        Ok(())
    }

    /// Returns the session only while it is still valid. Expired rows are left
    /// in place for the session reaper.
    pub fn get_session(&self, token_hash: &str) -> Result<Option<Session>, StoreError> {
        let key = keys::session_key(token_hash);
        let Some(raw) = self.sessions.get(key.as_bytes())? else {
            return Ok(None);
        };

        let session = Self::deserialize::<Session>(&raw)?;
        if session.is_expired_at(Utc::now()) {
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Delete a session and its user index entry. Returns `false` if it was
    /// already gone.
    pub fn delete_session(&self, token_hash: &str) -> Result<bool, StoreError> {
        let key = keys::session_key(token_hash);

        let removed = self.sessions.transaction(|tx| -> TxResult<bool> {
            let Some(raw) = tx.remove(key.as_bytes())? else {
                return Ok(false);
            };
            let session: Session = Self::deserialize_tx(&raw)?;
            let index_key = keys::session_user_index_key(&session.user_id, token_hash);
            tx.remove(index_key.as_bytes())?;
            Ok(true)
        })?;

        Ok(removed)
    }

    /// Delete every session whose expiry is at or before `now`.
    ///
    /// Returns how many sessions this call removed. Rows removed concurrently
    /// by another pass are not counted twice. Rows that fail to decode are
    /// left in place and skipped.
    pub fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut expired = Vec::new();
        for item in self.sessions.iter() {
            let (k, v) = item?;
            if keys::is_index_key(&k) {
                continue;
            }
            let session: Session = match Self::deserialize(&v) {
                Ok(session) => session,
                Err(e) => {
                    tracing::warn!(
                        key = %String::from_utf8_lossy(&k),
                        error = %e,
                        "Skipping undecodable session row"
                    );
                    continue;
                }
            };
            if session.is_expired_at(now) {
                expired.push(session.token_hash);
            }
        }

        let mut deleted = 0u64;
        for token_hash in expired {
            if self.delete_session(&token_hash)? {
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    pub fn count_sessions(&self) -> Result<usize, StoreError> {
        let mut count = 0usize;
        for item in self.sessions.iter() {
            let (k, _) = item?;
            if !keys::is_index_key(&k) {
                count += 1;
            }
        }
        Ok(count)
    }
}
