use thiserror::Error;

/// Errors produced by the hashing schemes.
///
/// Note that `verify` never returns an error: malformed stored material verifies as `false`.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The supplied input cannot be hashed.
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    /// The requested cost parameters were rejected by the underlying scheme.
    #[error("Invalid cost parameters")]
    InvalidParameters,
}

impl From<argon2::Error> for CryptoError {
    fn from(_: argon2::Error) -> Self {
        CryptoError::InvalidParameters
    }
}

pub(crate) type Result<T, E = CryptoError> = std::result::Result<T, E>;
