use chrono::{DateTime, Utc};
use credguard_crypto::CryptoError;
use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by the credential core.
///
/// Login verification itself reports its result as a [crate::VerificationOutcome], not an
/// error; these variants cover registration, password changes and the operations around
/// them. The `Display` strings for [CoreError::SubjectNotFound] and
/// [CoreError::VerificationMismatch] are deliberately identical so that surfacing them
/// verbatim cannot be used to enumerate subjects.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Empty or otherwise unusable input.
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    /// No credential record exists for the subject.
    #[error("Invalid credentials")]
    SubjectNotFound,

    /// The supplied password did not verify.
    #[error("Invalid credentials")]
    VerificationMismatch,

    /// A record already exists for the subject.
    #[error("Subject is already registered")]
    DuplicateSubject,

    /// Too many recent failures for this subject.
    #[error("Too many failed attempts; locked until {until}")]
    RateLimited {
        /// When the lockout expires, assuming no further failures.
        until: DateTime<Utc>,
    },

    /// The candidate password matches the current or a recent password.
    #[error("Password was already used")]
    ReusedPassword {
        /// False when the candidate matches the current password, true when it matches a
        /// history entry.
        historical: bool,
    },

    /// The record carries a tag that cannot be processed, e.g. wrapped bytes with no
    /// preserved origin.
    #[error("Unsupported algorithm tag")]
    UnsupportedAlgorithm,

    /// Hashing failed (bad cost parameters, unusable input).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Backing storage failed. The operation was aborted with no partial state.
    #[error(transparent)]
    Store(#[from] StoreError),
}
