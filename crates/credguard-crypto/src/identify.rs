//! Best-effort classification of an opaque hash string, with no plaintext and no record
//! context. Used for auditing imported credential tables.
//!
//! The decision procedure is a fixed priority list; the first rule that matches wins.
//! Nothing in here returns an error: a string that matches a prefix but has broken
//! substructure degrades to [HashFormat::Unknown] with empty parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scheme::memory_hard::parse_phc;

/// Formats the identifier knows how to recognize, listed as diagnostics on unknown input.
pub const KNOWN_FORMAT_HINTS: &[&str] = &[
    "md5/ntlm (32 hex chars)",
    "sha1 (40 hex chars)",
    "sha224 (56 hex chars)",
    "sha256 (64 hex chars)",
    "sha384 (96 hex chars)",
    "sha512 (128 hex chars)",
    "bcrypt ($2a$/$2b$/$2y$ prefix)",
    "argon2 ($argon2 PHC string)",
    "pbkdf2 (pbkdf2:<digest>:<iterations>:<salt>:<hash>)",
];

/// How sure the identifier is about a classification.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Confidence {
    /// The string is self-describing (PHC or prefixed formats).
    High,
    /// Only the length and alphabet matched; several formats share it.
    Ambiguous,
    /// Nothing matched.
    NoMatch,
}

/// Identified hash format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashFormat {
    /// Bare hex digest of the given width.
    WeakDigest {
        /// Digest width in bits.
        bits: u16,
    },
    /// Modular-crypt salted adaptive digest (bcrypt family).
    SaltedAdaptive {
        /// Cost factor; work is `2^cost`.
        cost: u32,
        /// Expanded iteration count, `2^cost`.
        iterations: u64,
    },
    /// PBKDF2-style key derivation.
    KeyDerivation {
        /// Inner digest name, e.g. `sha256`.
        digest: String,
        /// Iteration count.
        iterations: u32,
    },
    /// Argon2 family.
    MemoryHard {
        /// Variant name, e.g. `argon2id`.
        variant: String,
        /// PHC version field.
        version: u32,
        /// Memory cost in KiB.
        memory: u32,
        /// Number of passes.
        iterations: u32,
        /// Number of lanes.
        parallelism: u32,
    },
    /// Nothing recognized.
    Unknown,
}

/// Result of identifying an opaque hash string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashIdentification {
    /// The classified format.
    pub format: HashFormat,
    /// Extracted parameters by name, for display and export tooling.
    pub parameters: BTreeMap<String, String>,
    /// Confidence in the classification.
    pub confidence: Confidence,
    /// Recognized format hints; populated when the format is unknown.
    pub hints: Vec<&'static str>,
}

impl HashIdentification {
    fn unknown() -> Self {
        HashIdentification {
            format: HashFormat::Unknown,
            parameters: BTreeMap::new(),
            confidence: Confidence::NoMatch,
            hints: KNOWN_FORMAT_HINTS.to_vec(),
        }
    }
}

fn is_hex(input: &str) -> bool {
    !input.is_empty() && input.chars().all(|c| c.is_ascii_hexdigit())
}

fn param(map: &mut BTreeMap<String, String>, name: &str, value: impl ToString) {
    map.insert(name.to_owned(), value.to_string());
}

fn identify_modular_crypt(input: &str) -> Option<HashIdentification> {
    // "$2b$12$..." splits as ["", "2b", "12", "..."].
    let fields: Vec<&str> = input.split('$').collect();
    let cost = fields.get(2)?.parse::<u32>().ok()?;
    let iterations = 1u64.checked_shl(cost)?;

    let mut parameters = BTreeMap::new();
    param(&mut parameters, "cost", cost);
    param(&mut parameters, "iterations", iterations);
    Some(HashIdentification {
        format: HashFormat::SaltedAdaptive { cost, iterations },
        parameters,
        confidence: Confidence::High,
        hints: Vec::new(),
    })
}

fn identify_argon2(input: &str) -> Option<HashIdentification> {
    let parsed = parse_phc(input)?;

    let mut parameters = BTreeMap::new();
    param(&mut parameters, "variant", &parsed.variant);
    param(&mut parameters, "version", parsed.version);
    param(&mut parameters, "memory", parsed.memory);
    param(&mut parameters, "iterations", parsed.iterations);
    param(&mut parameters, "parallelism", parsed.parallelism);
    Some(HashIdentification {
        format: HashFormat::MemoryHard {
            variant: parsed.variant,
            version: parsed.version,
            memory: parsed.memory,
            iterations: parsed.iterations,
            parallelism: parsed.parallelism,
        },
        parameters,
        confidence: Confidence::High,
        hints: Vec::new(),
    })
}

fn identify_pbkdf2(input: &str) -> Option<HashIdentification> {
    let fields: Vec<&str> = input.split(':').collect();
    let [_, digest, iterations, _salt, _hash] = fields.as_slice() else {
        return None;
    };
    let iterations = iterations.parse::<u32>().ok()?;

    let mut parameters = BTreeMap::new();
    param(&mut parameters, "digest", digest);
    param(&mut parameters, "iterations", iterations);
    Some(HashIdentification {
        format: HashFormat::KeyDerivation {
            digest: (*digest).to_owned(),
            iterations,
        },
        parameters,
        confidence: Confidence::High,
        hints: Vec::new(),
    })
}

fn hex_digest(bits: u16) -> HashIdentification {
    let mut parameters = BTreeMap::new();
    param(&mut parameters, "bits", bits);
    HashIdentification {
        format: HashFormat::WeakDigest { bits },
        parameters,
        // Raw hex carries no algorithm marker; several 128/160-bit formats share
        // these widths (MD5 vs NTLM, SHA-1 vs old MySQL5).
        confidence: Confidence::Ambiguous,
        hints: Vec::new(),
    }
}

/// Classify an opaque hash string.
pub fn identify(input: &str) -> HashIdentification {
    let input = input.trim();

    if is_hex(input) && input.len() == 32 {
        return hex_digest(128);
    }
    if is_hex(input) && input.len() == 40 {
        return hex_digest(160);
    }
    if ["$2a$", "$2b$", "$2y$"].iter().any(|p| input.starts_with(p)) {
        return identify_modular_crypt(input).unwrap_or_else(HashIdentification::unknown);
    }
    if input.starts_with("$argon2") {
        return identify_argon2(input).unwrap_or_else(HashIdentification::unknown);
    }
    if input.starts_with("pbkdf2:") {
        return identify_pbkdf2(input).unwrap_or_else(HashIdentification::unknown);
    }
    HashIdentification::unknown()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_two_hex_is_a_128_bit_weak_digest() {
        let id = identify("5f4dcc3b5aa765d61d8327deb882cf99");
        assert_eq!(id.format, HashFormat::WeakDigest { bits: 128 });
        assert_eq!(id.confidence, Confidence::Ambiguous);
    }

    #[test]
    fn forty_hex_is_a_160_bit_weak_digest() {
        let id = identify("5BAA61E4C9B93F3F0682250B6CF8331B7EE68FD8");
        assert_eq!(id.format, HashFormat::WeakDigest { bits: 160 });
    }

    #[test]
    fn bcrypt_cost_expands_to_iterations() {
        let id = identify("$2b$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW");
        assert_eq!(
            id.format,
            HashFormat::SaltedAdaptive {
                cost: 12,
                iterations: 4096
            }
        );
        assert_eq!(id.confidence, Confidence::High);
        assert_eq!(id.parameters.get("iterations").map(String::as_str), Some("4096"));
    }

    #[test]
    fn argon2id_phc_parses_parameters() {
        let id = identify("$argon2id$v=19$m=65536,t=3,p=2$c29tZXNhbHQ$aGFzaGhhc2hoYXNoaGFzaA");
        match id.format {
            HashFormat::MemoryHard {
                ref variant,
                version,
                memory,
                iterations,
                parallelism,
            } => {
                assert_eq!(variant, "argon2id");
                assert_eq!(version, 19);
                assert_eq!(memory, 65536);
                assert_eq!(iterations, 3);
                assert_eq!(parallelism, 2);
            }
            other => panic!("unexpected format: {other:?}"),
        }
        assert_eq!(id.confidence, Confidence::High);
    }

    #[test]
    fn pbkdf2_five_fields_classify_as_key_derivation() {
        let id = identify("pbkdf2:sha256:600000:73616c74:68617368");
        assert_eq!(
            id.format,
            HashFormat::KeyDerivation {
                digest: "sha256".to_owned(),
                iterations: 600_000
            }
        );
    }

    #[test]
    fn pbkdf2_with_wrong_field_count_is_unknown() {
        let id = identify("pbkdf2:sha256:600000:73616c74");
        assert_eq!(id.format, HashFormat::Unknown);
        assert!(id.parameters.is_empty());
    }

    #[test]
    fn matched_prefix_with_broken_substructure_degrades_to_unknown() {
        let id = identify("$argon2id$v=19$m=oops$AAAA$AAAA");
        assert_eq!(id.format, HashFormat::Unknown);
        assert!(id.parameters.is_empty());

        let id = identify("$2b$notacost$whatever");
        assert_eq!(id.format, HashFormat::Unknown);
    }

    #[test]
    fn unrecognized_input_reports_hints() {
        // 64 hex chars is a plausible sha256 but outside the classified set.
        let id = identify(&"ab".repeat(32));
        assert_eq!(id.format, HashFormat::Unknown);
        assert_eq!(id.confidence, Confidence::NoMatch);
        assert!(id.hints.iter().any(|h| h.contains("sha256")));
    }

    #[test]
    fn priority_order_is_fixed() {
        // 32 hex chars that also happen to be a valid-looking prefix cannot exist, but a
        // hex string must win over later rules even when trimmed input is odd.
        let id = identify("  5f4dcc3b5aa765d61d8327deb882cf99  ");
        assert_eq!(id.format, HashFormat::WeakDigest { bits: 128 });
    }

    #[test]
    fn never_panics_on_garbage() {
        for garbage in ["", "$", "$$", "$2b$", "pbkdf2:", "$argon2", "::::", "\u{fffd}"] {
            let id = identify(garbage);
            assert_eq!(id.format, HashFormat::Unknown, "input: {garbage:?}");
        }
    }
}
