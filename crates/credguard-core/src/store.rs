use chrono::{DateTime, Utc};

use crate::model::{CredentialRecord, PasswordHistoryEntry};

/// An error resulting from operations on a credential or history store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The backing storage is unavailable or failed mid-operation. The core propagates
    /// this without retrying; retry policy belongs to the storage implementation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A serialization or deserialization error.
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// Key-value contract the core needs from credential persistence. Implemented by the
/// surrounding application; `put` must replace the subject's record atomically.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the record for a subject, if one exists.
    async fn get(&self, subject: &str) -> Result<Option<CredentialRecord>, StoreError>;
    /// Atomically insert or replace the record for `record.subject`.
    async fn put(&self, record: CredentialRecord) -> Result<(), StoreError>;
    /// Delete the record for a subject.
    async fn delete(&self, subject: &str) -> Result<(), StoreError>;
    /// List all known subject identifiers. Used by the resalt sweep and auditing.
    async fn subjects(&self) -> Result<Vec<String>, StoreError>;
}

/// Bounded history of retired password hashes per subject.
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a retired hash for its subject.
    async fn append(&self, entry: PasswordHistoryEntry) -> Result<(), StoreError>;
    /// The most recent entries for a subject, newest first, at most `limit`.
    async fn list_recent(
        &self,
        subject: &str,
        limit: usize,
    ) -> Result<Vec<PasswordHistoryEntry>, StoreError>;
    /// Discard all but the `keep` most recent entries for a subject.
    async fn trim(&self, subject: &str, keep: usize) -> Result<(), StoreError>;
}

/// Time source, injected so lockout behavior is deterministic under test.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// [Clock] backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
