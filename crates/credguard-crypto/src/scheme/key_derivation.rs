//! Tier 2: PBKDF2-HMAC-SHA256, stored as a self-describing colon-delimited string:
//! `pbkdf2:sha256:<iterations>:<salt-hex>:<hash-hex>`.

use std::num::NonZeroU32;

use sha2::Sha256;
use zeroize::Zeroizing;

use super::ct_eq;
use crate::salt::{SaltSource, generate_salt};

pub(crate) type PbkdfSha256Hmac = hmac::Hmac<Sha256>;
// HMAC-SHA256 output width.
pub(crate) const PBKDF_SHA256_HMAC_OUT_SIZE: usize = 32;

const PREFIX: &str = "pbkdf2";
const INNER_DIGEST: &str = "sha256";

/// Derive pbkdf2 of a given password and salt
pub(crate) fn derive(
    password: &[u8],
    salt: &[u8],
    rounds: u32,
) -> [u8; PBKDF_SHA256_HMAC_OUT_SIZE] {
    pbkdf2::pbkdf2_array::<PbkdfSha256Hmac, PBKDF_SHA256_HMAC_OUT_SIZE>(password, salt, rounds)
        .expect("hash is a valid fixed size")
}

pub(crate) fn hash(password: &str, iterations: NonZeroU32, salts: &dyn SaltSource) -> String {
    let salt = generate_salt(salts);
    let hash = derive(password.as_bytes(), &salt, iterations.get());
    format!(
        "{PREFIX}:{INNER_DIGEST}:{}:{}:{}",
        iterations,
        hex::encode(salt),
        hex::encode(hash)
    )
}

/// Re-derive from the parameters embedded in `stored` and compare. The embedded iteration
/// count wins over whatever the record tag claims, so records hashed under an older
/// configuration keep verifying.
pub(crate) fn verify(password: &str, stored: &str) -> bool {
    let fields: Vec<&str> = stored.split(':').collect();
    let [prefix, digest, iterations, salt, hash] = fields.as_slice() else {
        return false;
    };
    if *prefix != PREFIX || *digest != INNER_DIGEST {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    if iterations == 0 {
        return false;
    }
    let Ok(salt) = hex::decode(salt) else {
        return false;
    };
    let Ok(expected) = hex::decode(hash) else {
        return false;
    };
    let computed = Zeroizing::new(derive(password.as_bytes(), &salt, iterations));
    ct_eq(computed.as_slice(), &expected)
}
