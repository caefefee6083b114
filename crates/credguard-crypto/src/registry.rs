//! Uniform hash/verify entry points over the closed [Algorithm] set.
//!
//! Both functions are pure: they touch no storage and keep no state. The caller persists
//! the returned fragment and hands its fields back for verification.

use crate::{
    Algorithm, CryptoError, Result,
    salt::{SaltSource, generate_salt},
    scheme::{key_derivation, memory_hard, weak_digest},
};

/// Everything the caller needs to persist after hashing a password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedCredential {
    /// The algorithm, with the cost parameters actually used echoed back.
    pub algorithm: Algorithm,
    /// Opaque hash value in the algorithm's storage format.
    pub hash: String,
    /// Explicit salt, for schemes that do not embed one in `hash`.
    pub salt: Option<String>,
}

/// Hash `password` under the given algorithm with a fresh salt where the scheme is salted.
///
/// Fails only on unusable input or rejected cost parameters, never on the password's
/// content beyond emptiness.
pub fn hash(
    password: &str,
    algorithm: &Algorithm,
    salts: &dyn SaltSource,
) -> Result<HashedCredential> {
    if password.is_empty() {
        return Err(CryptoError::InvalidInput("password must not be empty"));
    }
    match algorithm {
        Algorithm::WeakDigest => Ok(HashedCredential {
            algorithm: algorithm.clone(),
            hash: weak_digest::md5_hex(password, None),
            salt: None,
        }),
        Algorithm::SaltedWeakDigest => {
            let salt = hex::encode(generate_salt(salts));
            let hash = weak_digest::md5_hex(password, Some(&salt));
            Ok(HashedCredential {
                algorithm: algorithm.clone(),
                hash,
                salt: Some(salt),
            })
        }
        Algorithm::KeyDerivation { iterations } => Ok(HashedCredential {
            algorithm: algorithm.clone(),
            hash: key_derivation::hash(password, *iterations, salts),
            salt: None,
        }),
        Algorithm::MemoryHard {
            iterations,
            memory,
            parallelism,
        } => Ok(HashedCredential {
            algorithm: algorithm.clone(),
            hash: memory_hard::hash(password, *iterations, *memory, *parallelism, salts)?,
            salt: None,
        }),
    }
}

/// Verify `password` against a stored hash.
///
/// `salt` is the explicit salt for schemes that keep one outside the hash string; the
/// self-describing formats ignore it. Returns `false` — never an error — on malformed
/// stored material, and compares in constant time.
pub fn verify(password: &str, algorithm: &Algorithm, hash: &str, salt: Option<&str>) -> bool {
    if password.is_empty() {
        return false;
    }
    match algorithm {
        Algorithm::WeakDigest => weak_digest::verify(password, salt, hash),
        Algorithm::SaltedWeakDigest => match salt {
            // A salted record without its salt cannot be reconstructed.
            Some(salt) => weak_digest::verify(password, Some(salt), hash),
            None => false,
        },
        Algorithm::KeyDerivation { .. } => key_derivation::verify(password, hash),
        Algorithm::MemoryHard { .. } => memory_hard::verify(password, hash),
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::OsRandomSaltSource;

    fn all_algorithms() -> Vec<Algorithm> {
        vec![
            Algorithm::WeakDigest,
            Algorithm::SaltedWeakDigest,
            Algorithm::KeyDerivation {
                iterations: NonZeroU32::new(1000).expect("non-zero"),
            },
            Algorithm::MemoryHard {
                iterations: NonZeroU32::new(2).expect("non-zero"),
                memory: NonZeroU32::new(16 * 1024).expect("non-zero"),
                parallelism: NonZeroU32::new(1).expect("non-zero"),
            },
        ]
    }

    #[test]
    fn every_algorithm_round_trips() {
        let salts = OsRandomSaltSource;
        for algorithm in all_algorithms() {
            let hashed = hash("Secret1!", &algorithm, &salts).expect("hashes");
            assert_eq!(hashed.algorithm, algorithm);
            assert!(
                verify("Secret1!", &algorithm, &hashed.hash, hashed.salt.as_deref()),
                "{algorithm:?} failed to verify its own hash"
            );
            assert!(
                !verify("Secret2!", &algorithm, &hashed.hash, hashed.salt.as_deref()),
                "{algorithm:?} verified the wrong password"
            );
        }
    }

    #[test]
    fn empty_password_is_rejected() {
        let salts = OsRandomSaltSource;
        for algorithm in all_algorithms() {
            assert!(hash("", &algorithm, &salts).is_err());
            assert!(!verify("", &algorithm, "whatever", None));
        }
    }

    #[test]
    fn cost_parameters_are_echoed_into_the_stored_string() {
        let salts = OsRandomSaltSource;
        let algorithm = Algorithm::KeyDerivation {
            iterations: NonZeroU32::new(1234).expect("non-zero"),
        };
        let hashed = hash("pw", &algorithm, &salts).expect("hashes");
        assert!(hashed.hash.starts_with("pbkdf2:sha256:1234:"));
    }

    #[test]
    fn salted_weak_digest_needs_its_salt() {
        let salts = OsRandomSaltSource;
        let hashed = hash("pw", &Algorithm::SaltedWeakDigest, &salts).expect("hashes");
        assert!(!verify("pw", &Algorithm::SaltedWeakDigest, &hashed.hash, None));
    }

    #[test]
    fn verify_handles_malformed_records() {
        for algorithm in all_algorithms() {
            assert!(!verify("pw", &algorithm, "", None));
            assert!(!verify("pw", &algorithm, "$garbage$", Some("00")));
        }
    }
}
