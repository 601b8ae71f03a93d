use num::BigUint;
use sha2::{Digest, Sha256};

/// SHA-256 over a sequence of big integers and return the raw digest.
///
/// Each operand is encoded as its minimal big-endian byte string prefixed
/// with a 32-bit big-endian length, so distinct operand sequences can
/// never produce colliding input streams by shifting bytes between
/// neighbours. Zero encodes as a bare length prefix of zero.
pub fn digest_uints(xs: &[&BigUint]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for x in xs {
        let bytes = crate::message::marshal_uint(x);
        hasher.update((bytes.len() as u32).to_be_bytes());
        hasher.update(&bytes);
    }
    hasher.finalize().into()
}

/// SHA-256 over a sequence of big integers, interpreted as a big-endian
/// integer. This is the challenge hash `H` of the non-interactive DL-EQ
/// transcripts.
pub fn hash_uints(xs: &[&BigUint]) -> BigUint {
    BigUint::from_bytes_be(&digest_uints(xs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint(x: u32) -> BigUint {
        BigUint::from(x)
    }

    #[test]
    fn deterministic() {
        let a = uint(1234);
        let b = uint(56789);
        assert_eq!(hash_uints(&[&a, &b]), hash_uints(&[&a, &b]));
    }

    #[test]
    fn order_matters() {
        let a = uint(1234);
        let b = uint(56789);
        assert_ne!(hash_uints(&[&a, &b]), hash_uints(&[&b, &a]));
    }

    #[test]
    fn length_prefix_separates_operands() {
        // 0x0102 ‖ 0x03 and 0x01 ‖ 0x0203 concatenate to the same bytes;
        // the length prefixes must keep them apart.
        let left = [uint(0x0102), uint(0x03)];
        let right = [uint(0x01), uint(0x0203)];
        assert_ne!(
            hash_uints(&[&left[0], &left[1]]),
            hash_uints(&[&right[0], &right[1]])
        );
    }

    #[test]
    fn zero_is_hashable() {
        let zero = BigUint::default();
        let one = uint(1);
        assert_ne!(hash_uints(&[&zero]), hash_uints(&[&one]));
    }
}
