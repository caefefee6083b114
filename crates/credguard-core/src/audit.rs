//! Read-only migration-posture reporting over a credential store.

use std::collections::BTreeMap;

use credguard_crypto::{Algorithm, HashFormat, identify};

use crate::{
    error::CoreError,
    model::{CredentialRecord, RecordAlgorithm},
    store::CredentialStore,
};

/// Aggregate view of how far a population of records has migrated.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AuditSummary {
    /// Records seen.
    pub total: usize,
    /// Records per effective security tier.
    pub by_tier: BTreeMap<u8, usize>,
    /// Records migrated away from their registration-time algorithm.
    pub upgraded: usize,
    /// Records carrying at least one resalt wrap layer.
    pub wrapped: usize,
    /// Records whose stored bytes do not match their algorithm tag.
    pub inconsistent: usize,
}

/// Walk the store and classify every record.
///
/// Each record's hash bytes are run through the format identifier and cross-checked
/// against the record's own algorithm tag; a disagreement is counted as inconsistent
/// rather than failing the audit. Wrapped records are checked for a plausible wrap
/// digest instead, since their top-layer bytes identify as a bare strong digest by
/// construction.
pub async fn audit_summary(store: &dyn CredentialStore) -> Result<AuditSummary, CoreError> {
    let mut summary = AuditSummary::default();
    for subject in store.subjects().await? {
        let Some(record) = store.get(&subject).await? else {
            continue;
        };
        summary.total += 1;
        if record.upgraded {
            summary.upgraded += 1;
        }
        if record.chain_depth > 0 {
            summary.wrapped += 1;
        }
        match record.effective_tier() {
            Some(tier) => *summary.by_tier.entry(tier).or_default() += 1,
            None => {
                // Wrapped with no preserved origin: unverifiable, flag and move on.
                summary.inconsistent += 1;
                continue;
            }
        }
        if !record_is_consistent(&record) {
            summary.inconsistent += 1;
        }
    }
    Ok(summary)
}

fn record_is_consistent(record: &CredentialRecord) -> bool {
    match &record.algorithm {
        // The wrap digest is plain sha256 hex; anything else means the bytes were
        // damaged after wrapping.
        RecordAlgorithm::Wrapped => {
            record.hash.len() == 64 && record.hash.bytes().all(|b| b.is_ascii_hexdigit())
        }
        RecordAlgorithm::Plain(algorithm) => {
            let format = identify(&record.hash).format;
            match algorithm {
                Algorithm::WeakDigest | Algorithm::SaltedWeakDigest => {
                    matches!(format, HashFormat::WeakDigest { .. })
                }
                Algorithm::KeyDerivation { .. } => {
                    matches!(format, HashFormat::KeyDerivation { .. })
                }
                Algorithm::MemoryHard { .. } => matches!(format, HashFormat::MemoryHard { .. }),
            }
        }
    }
}
