use rand::RngCore;

/// Number of salt bytes generated for salted schemes.
pub const SALT_LEN: usize = 16;

/// Cryptographically secure source of salt bytes.
///
/// Injected rather than called directly so tests can be deterministic.
pub trait SaltSource: Send + Sync {
    /// Fill `buf` with random bytes.
    fn fill(&self, buf: &mut [u8]);
}

/// [SaltSource] backed by the operating system RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandomSaltSource;

impl SaltSource for OsRandomSaltSource {
    fn fill(&self, buf: &mut [u8]) {
        rand::thread_rng().fill_bytes(buf);
    }
}

pub(crate) fn generate_salt(source: &dyn SaltSource) -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    source.fill(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_salts_differ() {
        let source = OsRandomSaltSource;
        assert_ne!(generate_salt(&source), generate_salt(&source));
    }
}
