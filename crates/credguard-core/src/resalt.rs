//! Layered re-hashing of stored bytes without the plaintext.
//!
//! A wrap replaces the stored hash with `sha256(old_hash ‖ fresh_salt)` and preserves the
//! pre-wrap material so the original algorithm remains verifiable. This obscures what is
//! at rest but adds nothing against an attacker who already holds the pre-wrap hash — it
//! is explicitly not a substitute for the verifier's migration path, which rehashes the
//! actual password.

use std::sync::Arc;

use credguard_crypto::{SALT_LEN, SaltSource, wrap_digest};

use crate::{
    error::CoreError,
    model::{CredentialRecord, RecordAlgorithm, Salt, WrapOrigin},
    verifier::CredentialVerifier,
};

/// Applies and audits resalt wrap layers on credential records.
pub struct ResaltChain {
    salts: Arc<dyn SaltSource>,
}

/// What a resalt sweep did across the store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResaltSweepReport {
    /// Records that gained a wrap layer.
    pub wrapped: usize,
    /// Records skipped because they could not be wrapped or written.
    pub failed: usize,
}

impl ResaltChain {
    /// Build a chain drawing salts from the given source.
    pub fn new(salts: Arc<dyn SaltSource>) -> Self {
        ResaltChain { salts }
    }

    /// Add one wrap layer to the record in place.
    ///
    /// Safe to call repeatedly; each call adds a layer and bumps the chain depth. The
    /// first wrap captures the record's verifiable material as its origin; later wraps
    /// leave that origin untouched.
    pub fn wrap(&self, record: &mut CredentialRecord) -> Result<(), CoreError> {
        if record.origin.is_none() {
            let RecordAlgorithm::Plain(algorithm) = &record.algorithm else {
                // Wrapped bytes with no preserved origin cannot be wrapped further
                // without losing verifiability for good.
                return Err(CoreError::UnsupportedAlgorithm);
            };
            record.origin = Some(WrapOrigin {
                algorithm: algorithm.clone(),
                hash: record.hash.clone(),
                salt: record.salt.clone(),
            });
        }

        let mut salt = [0u8; SALT_LEN];
        self.salts.fill(&mut salt);
        record.hash = wrap_digest(&record.hash, &salt);
        record.salt = Salt::Hex(hex::encode(salt));
        record.algorithm = RecordAlgorithm::Wrapped;
        record.chain_depth += 1;
        Ok(())
    }

    /// Audit-only consistency check: does `supplied_old_hash` reproduce the record's top
    /// wrap layer? Not part of login — wrapped bytes cannot authenticate a user.
    pub fn verify_layer(&self, record: &CredentialRecord, supplied_old_hash: &str) -> bool {
        if record.algorithm != RecordAlgorithm::Wrapped {
            return false;
        }
        let Salt::Hex(salt_hex) = &record.salt else {
            return false;
        };
        let Ok(salt) = hex::decode(salt_hex) else {
            return false;
        };
        wrap_digest(supplied_old_hash, &salt) == record.hash
    }
}

impl CredentialVerifier {
    /// Apply one resalt wrap to a single subject's record, under its subject lock.
    pub async fn resalt(&self, chain: &ResaltChain, subject: &str) -> Result<u32, CoreError> {
        let lock = self.locks.for_subject(subject);
        let _held = lock.lock().await;

        let Some(mut record) = self.store.get(subject).await? else {
            return Err(CoreError::SubjectNotFound);
        };
        chain.wrap(&mut record)?;
        let depth = record.chain_depth;
        self.store.put(record).await?;
        Ok(depth)
    }

    /// Wrap every stored record, taking each subject's lock around its read-modify-write
    /// so the sweep cooperates with concurrent logins instead of racing them.
    pub async fn resalt_sweep(&self, chain: &ResaltChain) -> Result<ResaltSweepReport, CoreError> {
        let mut report = ResaltSweepReport::default();
        for subject in self.store.subjects().await? {
            match self.resalt(chain, &subject).await {
                Ok(depth) => {
                    log::debug!("resalted record to chain depth {depth}");
                    report.wrapped += 1;
                }
                // Individual records must not abort the sweep; a subject deleted
                // mid-sweep is simply skipped.
                Err(CoreError::SubjectNotFound) => {}
                Err(error) => {
                    log::error!("resalt failed for a record: {error}");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }
}
