use chrono::{DateTime, Utc};
use credguard_crypto::Algorithm;
use serde::{Deserialize, Serialize};

/// Salt encoding for a stored hash value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Salt {
    /// The scheme is unsalted.
    None,
    /// The salt is embedded in the hash string itself (PHC and pbkdf2 formats).
    Embedded,
    /// Explicit hex salt stored alongside the hash.
    Hex(String),
}

impl Salt {
    /// The explicit salt string, for schemes that keep one outside the hash value.
    pub fn as_explicit(&self) -> Option<&str> {
        match self {
            Salt::Hex(salt) => Some(salt),
            Salt::None | Salt::Embedded => None,
        }
    }
}

/// Algorithm tag stored on a credential record.
///
/// `Wrapped` marks records whose bytes have been resalt-wrapped without the plaintext.
/// The pre-wrap material lives in [WrapOrigin] and remains the thing that actually
/// authenticates the user; the wrapped bytes alone cannot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RecordAlgorithm {
    /// A directly verifiable scheme.
    Plain(Algorithm),
    /// Resalt-wrapped bytes; verification falls back to the preserved origin.
    Wrapped,
}

/// The verifiable material a record had before its first resalt wrap. Untouched by
/// subsequent wraps, so the original algorithm verification stays reconstructible for
/// audit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WrapOrigin {
    /// Algorithm of the pre-wrap hash.
    pub algorithm: Algorithm,
    /// The pre-wrap hash value.
    pub hash: String,
    /// Salt encoding of the pre-wrap hash.
    pub salt: Salt,
}

/// One stored credential per subject.
///
/// Invariant: the algorithm tag and the format of `hash` are always mutually consistent,
/// and any mutation replaces the record atomically for its subject — the verifier and the
/// resalt chain are the only writers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    /// Opaque subject (user) identifier.
    pub subject: String,
    /// Active algorithm tag.
    pub algorithm: RecordAlgorithm,
    /// Opaque hash value in the algorithm's storage format.
    pub hash: String,
    /// Salt encoding for `hash`.
    pub salt: Salt,
    /// Number of resalt layers applied on top of the original hash.
    pub chain_depth: u32,
    /// Pre-wrap material, set by the first wrap and stable thereafter.
    pub origin: Option<WrapOrigin>,
    /// True once the record has been migrated away from its registration-time algorithm.
    pub upgraded: bool,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// Last successful verification, if any.
    pub last_verified_at: Option<DateTime<Utc>>,
}

impl CredentialRecord {
    /// The material a login attempt verifies against: the record's own hash for plain
    /// records, the preserved origin for wrapped ones. `None` for the corrupt case of
    /// wrapped bytes with no origin.
    pub fn verification_material(&self) -> Option<(&Algorithm, &str, &Salt)> {
        match &self.algorithm {
            RecordAlgorithm::Plain(algorithm) => Some((algorithm, &self.hash, &self.salt)),
            RecordAlgorithm::Wrapped => self
                .origin
                .as_ref()
                .map(|origin| (&origin.algorithm, origin.hash.as_str(), &origin.salt)),
        }
    }

    /// Security tier of the algorithm that actually authenticates this record. Wrapping
    /// does not raise the tier.
    pub fn effective_tier(&self) -> Option<u8> {
        self.verification_material()
            .map(|(algorithm, _, _)| algorithm.tier())
    }
}

/// A retired password hash kept to block reuse.
///
/// Created on explicit password changes only; migration rehashes are the same password
/// and never enter history.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PasswordHistoryEntry {
    /// Subject the entry belongs to.
    pub subject: String,
    /// Algorithm of the retired hash.
    pub algorithm: Algorithm,
    /// The retired hash value.
    pub hash: String,
    /// Salt encoding of the retired hash.
    pub salt: Salt,
    /// When the entry was created, i.e. when the password was changed away from.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CredentialRecord {
        CredentialRecord {
            subject: "alice".to_owned(),
            algorithm: RecordAlgorithm::Plain(Algorithm::WeakDigest),
            hash: "5f4dcc3b5aa765d61d8327deb882cf99".to_owned(),
            salt: Salt::None,
            chain_depth: 0,
            origin: None,
            upgraded: false,
            created_at: Utc::now(),
            last_verified_at: None,
        }
    }

    #[test]
    fn plain_records_verify_against_their_own_hash() {
        let record = record();
        let (algorithm, hash, _) = record.verification_material().expect("material");
        assert_eq!(algorithm, &Algorithm::WeakDigest);
        assert_eq!(hash, record.hash);
        assert_eq!(record.effective_tier(), Some(0));
    }

    #[test]
    fn wrapped_records_fall_back_to_origin() {
        let mut record = record();
        record.origin = Some(WrapOrigin {
            algorithm: Algorithm::WeakDigest,
            hash: record.hash.clone(),
            salt: Salt::None,
        });
        record.algorithm = RecordAlgorithm::Wrapped;
        record.hash = "ff".repeat(32);
        record.chain_depth = 1;

        let (_, hash, _) = record.verification_material().expect("material");
        assert_eq!(hash, "5f4dcc3b5aa765d61d8327deb882cf99");
        // Wrapping does not change the effective tier.
        assert_eq!(record.effective_tier(), Some(0));
    }

    #[test]
    fn wrapped_without_origin_is_unverifiable() {
        let mut record = record();
        record.algorithm = RecordAlgorithm::Wrapped;
        record.origin = None;
        assert!(record.verification_material().is_none());
        assert_eq!(record.effective_tier(), None);
    }

    #[test]
    fn record_serde_round_trip() {
        let record = record();
        let json = serde_json::to_string(&record).expect("serializes");
        let back: CredentialRecord = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(record, back);
    }
}
