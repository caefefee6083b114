pub(crate) mod key_derivation;
pub(crate) mod memory_hard;
pub(crate) mod weak_digest;

use subtle::ConstantTimeEq;

/// Constant-time equality over byte slices. Length differences return early; the length of
/// a stored hash is not secret.
pub(crate) fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
