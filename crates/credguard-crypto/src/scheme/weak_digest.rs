//! Tier 0/1: bare hex digests, optionally over `salt ‖ password`.
//!
//! New weak hashes are always MD5. Stored 40-hex values are treated as SHA-1 so records
//! imported from other systems still verify; both are broken and exist only as migration
//! sources.

use md5::{Digest, Md5};
use sha1::Sha1;

use super::ct_eq;

pub(crate) fn md5_hex(password: &str, salt: Option<&str>) -> String {
    let mut hasher = Md5::new();
    if let Some(salt) = salt {
        hasher.update(salt.as_bytes());
    }
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn sha1_hex(password: &str, salt: Option<&str>) -> String {
    let mut hasher = Sha1::new();
    if let Some(salt) = salt {
        hasher.update(salt.as_bytes());
    }
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Recompute the digest with the stored salt and compare. The salt-then-password order
/// must match hashing exactly.
pub(crate) fn verify(password: &str, salt: Option<&str>, stored: &str) -> bool {
    let computed = match stored.len() {
        40 => sha1_hex(password, salt),
        _ => md5_hex(password, salt),
    };
    ct_eq(computed.as_bytes(), stored.to_lowercase().as_bytes())
}
