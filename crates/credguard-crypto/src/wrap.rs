use sha2::Digest;

/// Digest used by the resalt chain to wrap an existing stored hash with a fresh salt:
/// hex-encoded SHA-256 over `old_hash ‖ salt`.
///
/// Wrapping never sees the plaintext, so it cannot strengthen the password-verification
/// function itself: an attacker who already holds the pre-wrap hash loses nothing. It only
/// changes the bytes at rest. Actual strengthening goes through the verifier's migration
/// path, which does have the plaintext.
pub fn wrap_digest(old_hash: &str, salt: &[u8]) -> String {
    let digest = sha2::Sha256::new()
        .chain_update(old_hash.as_bytes())
        .chain_update(salt)
        .finalize();
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_is_deterministic_in_both_inputs() {
        let a = wrap_digest("5f4dcc3b5aa765d61d8327deb882cf99", &[1, 2, 3]);
        let b = wrap_digest("5f4dcc3b5aa765d61d8327deb882cf99", &[1, 2, 3]);
        let c = wrap_digest("5f4dcc3b5aa765d61d8327deb882cf99", &[1, 2, 4]);
        let d = wrap_digest("5f4dcc3b5aa765d61d8327deb882cf98", &[1, 2, 3]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn output_is_sixty_four_hex_chars() {
        let wrapped = wrap_digest("anything", &[0u8; 16]);
        assert_eq!(wrapped.len(), 64);
        assert!(wrapped.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
