#![doc = include_str!("../README.md")]

mod audit;
pub use audit::{AuditSummary, audit_summary};
mod config;
pub use config::CoreConfig;
mod error;
pub use error::CoreError;
mod history;
pub use history::PasswordHistoryGuard;
mod model;
pub use model::{CredentialRecord, PasswordHistoryEntry, RecordAlgorithm, Salt, WrapOrigin};
mod rate_limit;
pub use rate_limit::{RateLimitStatus, RateLimiter};
mod resalt;
pub use resalt::{ResaltChain, ResaltSweepReport};
mod store;
pub use store::{Clock, CredentialStore, HistoryStore, StoreError, SystemClock};
mod verifier;
pub use verifier::{CredentialVerifier, VerificationOutcome};
