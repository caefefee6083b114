use chrono::Duration;
use credguard_crypto::Algorithm;

/// Tunable behavior for the credential core.
///
/// Passed in at construction of the verifier and rate limiter; there is no process-global
/// configuration and nothing here mutates after construction.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Algorithm newly registered credentials are hashed with, and the tier existing
    /// records are migrated towards on successful login.
    pub target_algorithm: Algorithm,
    /// Failed attempts within [CoreConfig::lockout_window] before a subject is locked.
    pub max_failures: u32,
    /// Trailing window over which failures are counted; also the lockout duration.
    pub lockout_window: Duration,
    /// Retired hashes kept per subject for password-reuse checks.
    pub history_depth: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            target_algorithm: Algorithm::default_memory_hard(),
            max_failures: 5,
            lockout_window: Duration::minutes(15),
            history_depth: 5,
        }
    }
}
