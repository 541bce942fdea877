//! SHA-256 digests of LUT payloads for op cache ids.

use std::fmt::Write;

use sha2::{Digest, Sha256};

/// Hex SHA-256 of the little-endian bytes of `values`, prefixed by `shape`.
pub(crate) fn digest_f32(shape: &[usize], values: &[f32]) -> String {
    let mut hasher = Sha256::new();
    for dim in shape {
        hasher.update((*dim as u64).to_le_bytes());
    }
    for v in values {
        hasher.update(v.to_le_bytes());
    }
    let result = hasher.finalize();

    let mut hex = String::with_capacity(2 * result.len());
    for byte in result {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_and_shape_sensitive() {
        let a = digest_f32(&[2], &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        assert_eq!(a.len(), 64);
        assert_eq!(a, digest_f32(&[2], &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]));
        assert_ne!(a, digest_f32(&[3], &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]));
        assert_ne!(a, digest_f32(&[2], &[0.0, 0.0, 0.0, 1.0, 1.0, 0.5]));
    }
}
