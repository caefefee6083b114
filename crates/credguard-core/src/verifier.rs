//! Login, registration and password-change orchestration.
//!
//! The verifier composes the hashing registry, the rate limiter, the history guard and
//! the stores into the state machine every authentication attempt walks through. It is
//! the only writer of credential records besides the resalt chain, and both go through
//! the same per-subject locks.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use credguard_crypto::{Algorithm, HashedCredential, SaltSource};

use crate::{
    config::CoreConfig,
    error::CoreError,
    history::PasswordHistoryGuard,
    model::{CredentialRecord, PasswordHistoryEntry, RecordAlgorithm, Salt},
    rate_limit::{RateLimitStatus, RateLimiter},
    store::{Clock, CredentialStore, HistoryStore},
};

/// Outcome of a login verification attempt.
///
/// These are outcomes, not errors: a mismatch is a normal result of running the state
/// machine. Only storage failures surface as [CoreError].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The subject is locked out. The attempt was not counted and no record was read.
    Locked {
        /// When the lockout expires, assuming no further failures.
        until: DateTime<Utc>,
    },
    /// No record exists for this subject. Still recorded as a failure so the response
    /// behavior cannot be used to probe which subjects exist.
    NotFound,
    /// The password did not match.
    Mismatch,
    /// The password matched; the record was already at or above the target tier and its
    /// stored bytes were left untouched.
    VerifiedNoMigration,
    /// The password matched and the record was transparently rehashed at the target
    /// algorithm before the caller saw the success.
    VerifiedMigrated,
}

impl VerificationOutcome {
    /// True for either verified state.
    pub fn is_verified(&self) -> bool {
        matches!(
            self,
            VerificationOutcome::VerifiedNoMigration | VerificationOutcome::VerifiedMigrated
        )
    }

    /// Caller-facing message. Identical for [VerificationOutcome::NotFound] and
    /// [VerificationOutcome::Mismatch]: responses must not reveal whether the subject
    /// exists.
    pub fn public_message(&self) -> &'static str {
        match self {
            VerificationOutcome::Locked { .. } => {
                "Too many failed attempts; try again later"
            }
            VerificationOutcome::NotFound | VerificationOutcome::Mismatch => "Invalid credentials",
            VerificationOutcome::VerifiedNoMigration | VerificationOutcome::VerifiedMigrated => {
                "Login successful"
            }
        }
    }
}

/// Per-subject exclusive locks serializing read-verify-write sequences.
///
/// A login-triggered migration and a background resalt racing on the same subject must
/// not interleave their store round-trips; subjects never contend with each other.
#[derive(Default)]
pub(crate) struct SubjectLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SubjectLocks {
    pub(crate) fn for_subject(&self, subject: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.inner.lock().expect("subject lock map poisoned");
        locks.entry(subject.to_owned()).or_default().clone()
    }
}

/// Orchestrates registration, login and password changes over the collaborator traits.
pub struct CredentialVerifier {
    pub(crate) store: Arc<dyn CredentialStore>,
    pub(crate) guard: PasswordHistoryGuard,
    pub(crate) limiter: Arc<RateLimiter>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) salts: Arc<dyn SaltSource>,
    pub(crate) config: CoreConfig,
    pub(crate) locks: SubjectLocks,
}

/// Salt encoding for a freshly produced hash fragment.
fn salt_of(hashed: &HashedCredential) -> Salt {
    match (&hashed.algorithm, &hashed.salt) {
        (Algorithm::KeyDerivation { .. } | Algorithm::MemoryHard { .. }, _) => Salt::Embedded,
        (_, Some(salt)) => Salt::Hex(salt.clone()),
        (_, None) => Salt::None,
    }
}

impl CredentialVerifier {
    /// Build a verifier over the given collaborators.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        history: Arc<dyn HistoryStore>,
        clock: Arc<dyn Clock>,
        salts: Arc<dyn SaltSource>,
        config: CoreConfig,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::new(&config, clock.clone()));
        let guard = PasswordHistoryGuard::new(history, config.history_depth);
        CredentialVerifier {
            store,
            guard,
            limiter,
            clock,
            salts,
            config,
            locks: SubjectLocks::default(),
        }
    }

    /// The rate limiter backing this verifier, for callers that need to consult lockout
    /// state out of band.
    pub fn limiter(&self) -> Arc<RateLimiter> {
        self.limiter.clone()
    }

    /// Register a new subject, hashing at the requested algorithm (default: the
    /// configured target).
    pub async fn register(
        &self,
        subject: &str,
        password: &str,
        algorithm: Option<Algorithm>,
    ) -> Result<CredentialRecord, CoreError> {
        if subject.trim().is_empty() {
            return Err(CoreError::InvalidInput("subject must not be empty"));
        }
        if password.is_empty() {
            return Err(CoreError::InvalidInput("password must not be empty"));
        }

        let lock = self.locks.for_subject(subject);
        let _held = lock.lock().await;

        if self.store.get(subject).await?.is_some() {
            return Err(CoreError::DuplicateSubject);
        }

        let algorithm = algorithm.unwrap_or_else(|| self.config.target_algorithm.clone());
        let hashed = credguard_crypto::hash(password, &algorithm, self.salts.as_ref())?;
        let record = CredentialRecord {
            subject: subject.to_owned(),
            salt: salt_of(&hashed),
            algorithm: RecordAlgorithm::Plain(hashed.algorithm),
            hash: hashed.hash,
            chain_depth: 0,
            origin: None,
            upgraded: false,
            created_at: self.clock.now(),
            last_verified_at: None,
        };
        self.store.put(record.clone()).await?;
        log::debug!("registered subject at tier {}", algorithm.tier());
        Ok(record)
    }

    /// Run a login attempt through the verification state machine.
    ///
    /// On a match below the target tier the record is rehashed with the plaintext at the
    /// target algorithm before this returns; the rehash either fully replaces the record
    /// or, on storage failure, leaves the old record untouched and surfaces the error.
    pub async fn login(
        &self,
        subject: &str,
        password: &str,
    ) -> Result<VerificationOutcome, CoreError> {
        if subject.trim().is_empty() || password.is_empty() {
            return Err(CoreError::InvalidInput("subject and password are required"));
        }

        // Locked subjects are rejected before any record access so the attempt neither
        // counts as a failure nor leaks timing.
        if let RateLimitStatus::Locked { until } = self.limiter.status(subject) {
            return Ok(VerificationOutcome::Locked { until });
        }

        let lock = self.locks.for_subject(subject);
        let _held = lock.lock().await;

        let Some(mut record) = self.store.get(subject).await? else {
            self.limiter.record_failure(subject);
            return Ok(VerificationOutcome::NotFound);
        };

        // Wrapped records authenticate via their preserved origin; wrapping alone never
        // incorporates the plaintext. A wrapped record with no origin is corrupt and can
        // only mismatch.
        let Some((algorithm, hash, salt)) = record
            .verification_material()
            .map(|(a, h, s)| (a.clone(), h.to_owned(), s.clone()))
        else {
            self.limiter.record_failure(subject);
            return Ok(VerificationOutcome::Mismatch);
        };

        if !credguard_crypto::verify(password, &algorithm, &hash, salt.as_explicit()) {
            self.limiter.record_failure(subject);
            return Ok(VerificationOutcome::Mismatch);
        }

        let now = self.clock.now();
        let target_tier = self.config.target_algorithm.tier();
        let outcome = if algorithm.tier() < target_tier {
            let hashed =
                credguard_crypto::hash(password, &self.config.target_algorithm, self.salts.as_ref())?;
            record.salt = salt_of(&hashed);
            record.algorithm = RecordAlgorithm::Plain(hashed.algorithm);
            record.hash = hashed.hash;
            // The record is rehashed from the plaintext; any wrap layers are obsolete.
            record.origin = None;
            record.chain_depth = 0;
            record.upgraded = true;
            record.last_verified_at = Some(now);
            self.store.put(record).await?;
            log::info!("migrated credential to tier {target_tier} on login");
            VerificationOutcome::VerifiedMigrated
        } else {
            // At or above the target: stored hash bytes stay exactly as they are.
            record.last_verified_at = Some(now);
            self.store.put(record).await?;
            VerificationOutcome::VerifiedNoMigration
        };

        self.limiter.clear(subject);
        Ok(outcome)
    }

    /// Change a subject's password after verifying the old one and consulting the
    /// history guard. The outgoing hash is recorded into history before the new record
    /// is written.
    pub async fn change_password(
        &self,
        subject: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), CoreError> {
        if subject.trim().is_empty() {
            return Err(CoreError::InvalidInput("subject must not be empty"));
        }
        if old_password.is_empty() || new_password.is_empty() {
            return Err(CoreError::InvalidInput("password must not be empty"));
        }

        if let RateLimitStatus::Locked { until } = self.limiter.status(subject) {
            return Err(CoreError::RateLimited { until });
        }

        let lock = self.locks.for_subject(subject);
        let _held = lock.lock().await;

        let Some(mut record) = self.store.get(subject).await? else {
            self.limiter.record_failure(subject);
            return Err(CoreError::SubjectNotFound);
        };

        let Some((algorithm, hash, salt)) = record
            .verification_material()
            .map(|(a, h, s)| (a.clone(), h.to_owned(), s.clone()))
        else {
            self.limiter.record_failure(subject);
            return Err(CoreError::VerificationMismatch);
        };

        if !credguard_crypto::verify(old_password, &algorithm, &hash, salt.as_explicit()) {
            self.limiter.record_failure(subject);
            return Err(CoreError::VerificationMismatch);
        }

        self.guard.check(&record, new_password).await?;

        let now = self.clock.now();
        let hashed =
            credguard_crypto::hash(new_password, &self.config.target_algorithm, self.salts.as_ref())?;

        // History gets the outgoing verifiable material, then the change applies.
        self.guard
            .record(PasswordHistoryEntry {
                subject: subject.to_owned(),
                algorithm,
                hash,
                salt,
                created_at: now,
            })
            .await?;

        record.salt = salt_of(&hashed);
        record.algorithm = RecordAlgorithm::Plain(hashed.algorithm);
        record.hash = hashed.hash;
        record.origin = None;
        record.chain_depth = 0;
        record.last_verified_at = Some(now);
        self.store.put(record).await?;

        self.limiter.clear(subject);
        Ok(())
    }
}
