pub mod keys;
pub mod migrate;
pub mod operations;
pub mod trees;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{ConflictableTransactionError, ConflictableTransactionResult, TransactionError};
use sled::Db;
use thiserror::Error;

#[derive(Debug)]
pub struct Store {
    db: Db,
    pub users: sled::Tree,
    pub sessions: sled::Tree,
    pub cards: sled::Tree,
    pub owned_cards: sled::Tree,
    pub decks: sled::Tree,
    pub meta: sled::Tree,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("conflict: entity={entity}, key={key}")]
    Conflict { entity: String, key: String },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("migration error at version {version}: {message}")]
    Migration { version: u32, message: String },
}

/// Result type for closures run inside a sled transaction.
pub type TxResult<T> = ConflictableTransactionResult<T, StoreError>;

impl From<TransactionError<StoreError>> for StoreError {
    fn from(value: TransactionError<StoreError>) -> Self {
        match value {
            TransactionError::Abort(e) => e,
            TransactionError::Storage(se) => StoreError::Sled(se),
        }
    }
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        let users = db.open_tree(trees::USERS)?;
        let sessions = db.open_tree(trees::SESSIONS)?;
        let cards = db.open_tree(trees::CARDS)?;
        let owned_cards = db.open_tree(trees::OWNED_CARDS)?;
        let decks = db.open_tree(trees::DECKS)?;
        let meta = db.open_tree(trees::META)?;

        Ok(Self {
            db,
            users,
            sessions,
            cards,
            owned_cards,
            decks,
            meta,
        })
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        migrate::run(self)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Same as [`Store::serialize`], but aborts the enclosing transaction on failure.
    pub(crate) fn serialize_tx<T: Serialize>(value: &T) -> TxResult<Vec<u8>> {
        Self::serialize(value).map_err(ConflictableTransactionError::Abort)
    }

    pub(crate) fn deserialize_tx<T: DeserializeOwned>(bytes: &[u8]) -> TxResult<T> {
        Self::deserialize(bytes).map_err(ConflictableTransactionError::Abort)
    }
}
