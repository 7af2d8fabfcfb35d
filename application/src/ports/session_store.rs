//! Persistence ports
//!
//! Two kinds of record are stored: the single session registry, and small
//! independent key/value preference records (credentials, active models,
//! agent model, tree expand state).

use agentic_domain::SessionRegistry;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Persistence failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Failed to read {0}")]
    Read(String),

    #[error("Failed to write {0}")]
    Write(String),

    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),

    #[error("Storage quota exceeded. Please delete some old sessions.")]
    QuotaExceeded,
}

/// Storage for the session registry.
///
/// `load_registry` returns an empty registry when nothing was stored yet or
/// the stored record cannot be parsed.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_registry(&self) -> Result<SessionRegistry, StoreError>;

    async fn save_registry(&self, registry: &SessionRegistry) -> Result<(), StoreError>;
}

/// Key/value preference records.
///
/// A missing or unreadable record reads as `None`.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
