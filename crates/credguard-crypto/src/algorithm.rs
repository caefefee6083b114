use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Password hashing algorithm for a stored credential.
///
/// This is a closed set: adding a scheme means adding a variant here and an arm in the
/// registry, not editing string comparisons scattered over call sites. Cost parameters
/// live on the variant so a record's tag always carries everything needed to re-derive
/// its hash.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub enum Algorithm {
    /// Unsalted hex digest (MD5). Broken; kept only so legacy records verify.
    WeakDigest,
    /// Hex digest over `salt ‖ password` with an explicit random salt. Still weak.
    SaltedWeakDigest,
    /// PBKDF2-HMAC-SHA256 with a tunable iteration count.
    KeyDerivation {
        /// Number of PBKDF2 rounds.
        iterations: NonZeroU32,
    },
    /// Argon2id, memory-hard.
    MemoryHard {
        /// Number of passes.
        iterations: NonZeroU32,
        /// Memory cost in KiB.
        memory: NonZeroU32,
        /// Number of lanes.
        parallelism: NonZeroU32,
    },
}

impl Algorithm {
    /// Ordinal security tier: weak-digest = 0 up to memory-hard = 3.
    ///
    /// Used by the orchestrator to decide migration eligibility. The registry never ranks
    /// on its own; the target tier is injected as configuration.
    pub fn tier(&self) -> u8 {
        match self {
            Algorithm::WeakDigest => 0,
            Algorithm::SaltedWeakDigest => 1,
            Algorithm::KeyDerivation { .. } => 2,
            Algorithm::MemoryHard { .. } => 3,
        }
    }

    /// Key derivation with the default iteration count.
    pub fn default_key_derivation() -> Self {
        Algorithm::KeyDerivation {
            iterations: default_pbkdf2_iterations(),
        }
    }

    /// Memory-hard hashing with the default cost parameters.
    pub fn default_memory_hard() -> Self {
        Algorithm::MemoryHard {
            iterations: default_argon2_iterations(),
            memory: default_argon2_memory(),
            parallelism: default_argon2_parallelism(),
        }
    }
}

/// Default PBKDF2 iterations
pub fn default_pbkdf2_iterations() -> NonZeroU32 {
    NonZeroU32::new(600_000).expect("Non-zero number")
}
/// Default Argon2id iterations
pub fn default_argon2_iterations() -> NonZeroU32 {
    NonZeroU32::new(3).expect("Non-zero number")
}
/// Default Argon2id memory cost, in KiB
pub fn default_argon2_memory() -> NonZeroU32 {
    NonZeroU32::new(64 * 1024).expect("Non-zero number")
}
/// Default Argon2id parallelism
pub fn default_argon2_parallelism() -> NonZeroU32 {
    NonZeroU32::new(2).expect("Non-zero number")
}
