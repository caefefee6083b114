use std::sync::Arc;

use crate::{
    error::CoreError,
    model::{CredentialRecord, PasswordHistoryEntry},
    store::{HistoryStore, StoreError},
};

/// Blocks reuse of a subject's current password or any of its N most recent prior ones.
///
/// Consulted only on explicit password-change requests; migration rehashes keep the same
/// password and never pass through here.
pub struct PasswordHistoryGuard {
    history: Arc<dyn HistoryStore>,
    depth: usize,
}

impl PasswordHistoryGuard {
    /// Build a guard over the given history store, keeping `depth` entries per subject.
    pub fn new(history: Arc<dyn HistoryStore>, depth: usize) -> Self {
        PasswordHistoryGuard { history, depth }
    }

    /// Accept or reject a candidate password for the record's subject.
    ///
    /// The candidate is verified against the live record first, then against each stored
    /// history entry with that entry's own algorithm — entries hashed under retired
    /// schemes still block reuse.
    pub async fn check(
        &self,
        record: &CredentialRecord,
        candidate: &str,
    ) -> Result<(), CoreError> {
        if let Some((algorithm, hash, salt)) = record.verification_material() {
            if credguard_crypto::verify(candidate, algorithm, hash, salt.as_explicit()) {
                return Err(CoreError::ReusedPassword { historical: false });
            }
        }
        for entry in self.history.list_recent(&record.subject, self.depth).await? {
            if credguard_crypto::verify(
                candidate,
                &entry.algorithm,
                &entry.hash,
                entry.salt.as_explicit(),
            ) {
                return Err(CoreError::ReusedPassword { historical: true });
            }
        }
        Ok(())
    }

    /// Record an outgoing hash immediately before a password change is applied, trimming
    /// the subject's history to the configured depth.
    pub async fn record(&self, entry: PasswordHistoryEntry) -> Result<(), StoreError> {
        let subject = entry.subject.clone();
        self.history.append(entry).await?;
        self.history.trim(&subject, self.depth).await
    }
}
