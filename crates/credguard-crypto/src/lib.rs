#![doc = include_str!("../README.md")]

mod algorithm;
pub use algorithm::{
    Algorithm, default_argon2_iterations, default_argon2_memory, default_argon2_parallelism,
    default_pbkdf2_iterations,
};
mod error;
pub use error::CryptoError;
pub(crate) use error::Result;
mod identify;
pub use identify::{Confidence, HashFormat, HashIdentification, identify};
mod registry;
pub use registry::{HashedCredential, hash, verify};
mod salt;
pub use salt::{OsRandomSaltSource, SALT_LEN, SaltSource};
mod scheme;
mod wrap;
pub use wrap::wrap_digest;
