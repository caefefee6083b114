//! Tier 3: Argon2id, stored as a PHC string with the salt and all cost parameters
//! embedded: `$argon2id$v=19$m=65536,t=3,p=2$<salt-b64>$<hash-b64>`.

use std::num::NonZeroU32;

use argon2::{Argon2, Params, Version};
use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};
use zeroize::Zeroizing;

use super::ct_eq;
use crate::{
    Result,
    salt::{SaltSource, generate_salt},
};

const HASH_LEN: usize = 32;

/// Parsed form of an Argon2 PHC string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Argon2Phc {
    pub(crate) variant: String,
    pub(crate) version: u32,
    pub(crate) memory: u32,
    pub(crate) iterations: u32,
    pub(crate) parallelism: u32,
    pub(crate) salt: Vec<u8>,
    pub(crate) hash: Vec<u8>,
}

/// Parse a `$argon2<variant>$v=..$m=..,t=..,p=..$<salt>$<hash>` string. `None` for anything
/// that does not follow the PHC structure; the caller decides whether that is a verification
/// failure or an "unknown format" classification.
pub(crate) fn parse_phc(input: &str) -> Option<Argon2Phc> {
    let mut segments = input.split('$');
    if !segments.next()?.is_empty() {
        return None;
    }
    let variant = segments.next()?;
    if !variant.starts_with("argon2") {
        return None;
    }
    let version = segments.next()?.strip_prefix("v=")?.parse::<u32>().ok()?;

    let (mut memory, mut iterations, mut parallelism) = (None, None, None);
    for param in segments.next()?.split(',') {
        let (name, value) = param.split_once('=')?;
        let value = value.parse::<u32>().ok()?;
        match name {
            "m" => memory = Some(value),
            "t" => iterations = Some(value),
            "p" => parallelism = Some(value),
            _ => return None,
        }
    }

    let salt = STANDARD_NO_PAD.decode(segments.next()?).ok()?;
    let hash = STANDARD_NO_PAD.decode(segments.next()?).ok()?;
    if segments.next().is_some() {
        return None;
    }

    Some(Argon2Phc {
        variant: variant.to_owned(),
        version,
        memory: memory?,
        iterations: iterations?,
        parallelism: parallelism?,
        salt,
        hash,
    })
}

fn derive(
    password: &[u8],
    salt: &[u8],
    variant: argon2::Algorithm,
    version: Version,
    memory: u32,
    iterations: u32,
    parallelism: u32,
    out_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let params = Params::new(memory, iterations, parallelism, Some(out_len))?;
    let argon = Argon2::new(variant, version, params);

    let mut hash = Zeroizing::new(vec![0u8; out_len]);
    argon.hash_password_into(password, salt, &mut hash)?;
    Ok(hash)
}

pub(crate) fn hash(
    password: &str,
    iterations: NonZeroU32,
    memory: NonZeroU32,
    parallelism: NonZeroU32,
    salts: &dyn SaltSource,
) -> Result<String> {
    let salt = generate_salt(salts);
    let hash = derive(
        password.as_bytes(),
        &salt,
        argon2::Algorithm::Argon2id,
        Version::V0x13,
        memory.get(),
        iterations.get(),
        parallelism.get(),
        HASH_LEN,
    )?;
    Ok(format!(
        "$argon2id$v=19$m={},t={},p={}${}${}",
        memory,
        iterations,
        parallelism,
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(&hash)
    ))
}

/// Re-derive using the parameters embedded in the stored PHC string and compare.
pub(crate) fn verify(password: &str, stored: &str) -> bool {
    let Some(parsed) = parse_phc(stored) else {
        return false;
    };
    let variant = match parsed.variant.as_str() {
        "argon2id" => argon2::Algorithm::Argon2id,
        "argon2i" => argon2::Algorithm::Argon2i,
        "argon2d" => argon2::Algorithm::Argon2d,
        _ => return false,
    };
    let version = match parsed.version {
        0x10 => Version::V0x10,
        0x13 => Version::V0x13,
        _ => return false,
    };
    if parsed.hash.is_empty() {
        return false;
    }
    let Ok(computed) = derive(
        password.as_bytes(),
        &parsed.salt,
        variant,
        version,
        parsed.memory,
        parsed.iterations,
        parsed.parallelism,
        parsed.hash.len(),
    ) else {
        return false;
    };
    ct_eq(&computed, &parsed.hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ZeroSalt;
    impl SaltSource for ZeroSalt {
        fn fill(&self, buf: &mut [u8]) {
            buf.fill(0);
        }
    }

    // Cheap parameters; these tests exercise the format, not the hardness.
    fn cheap() -> (NonZeroU32, NonZeroU32, NonZeroU32) {
        (
            NonZeroU32::new(2).expect("non-zero"),
            NonZeroU32::new(16 * 1024).expect("non-zero"),
            NonZeroU32::new(1).expect("non-zero"),
        )
    }

    #[test]
    fn round_trip() {
        let (t, m, p) = cheap();
        let stored = hash("hunter2", t, m, p, &ZeroSalt).expect("hashes");
        assert!(stored.starts_with("$argon2id$v=19$m=16384,t=2,p=1$"));
        assert!(verify("hunter2", &stored));
        assert!(!verify("hunter3", &stored));
    }

    #[test]
    fn parse_extracts_parameters() {
        let (t, m, p) = cheap();
        let stored = hash("pw", t, m, p, &ZeroSalt).expect("hashes");
        let parsed = parse_phc(&stored).expect("parses");
        assert_eq!(parsed.variant, "argon2id");
        assert_eq!(parsed.version, 19);
        assert_eq!(parsed.memory, 16 * 1024);
        assert_eq!(parsed.iterations, 2);
        assert_eq!(parsed.parallelism, 1);
        assert_eq!(parsed.hash.len(), HASH_LEN);
    }

    #[test]
    fn malformed_phc_is_false() {
        assert!(!verify("pw", "$argon2id$v=19$m=16384,t=2$AAAA$AAAA"));
        assert!(!verify("pw", "$argon2id$v=19$m=16384,t=2,p=1$!!$AAAA"));
        assert!(!verify("pw", "$argon2zz$v=19$m=16384,t=2,p=1$AAAA$AAAA"));
        assert!(!verify("pw", "argon2id"));
        assert!(!verify("pw", ""));
    }
}
