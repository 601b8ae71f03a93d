//! Verification of the CA's certification of a pseudonym pair.
//!
//! The CA signs the committed nym with ECDSA over NIST P-256; its public
//! key is configured as the affine coordinates `(x, y)` of the verifying
//! point. The signed digest is SHA-256 over the length-prefixed
//! big-endian encoding of `(nymA, nymB)`.

use num::BigUint;
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::ecdsa::{Signature, VerifyingKey};
use p256::{EncodedPoint, FieldBytes};
use thiserror::Error;

use super::hash;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("CA public key is not a valid P-256 point")]
pub struct InvalidCaKey;

/// The certification authority's verifying key.
#[derive(Debug, Clone)]
pub struct CaPublicKey {
    key: VerifyingKey,
}

impl CaPublicKey {
    /// Reassemble the verifying key from the configured affine
    /// coordinates. Fails at startup if the point is not on the curve.
    pub fn from_coordinates(x: &BigUint, y: &BigUint) -> Result<CaPublicKey, InvalidCaKey> {
        let x = field_bytes(x).ok_or(InvalidCaKey)?;
        let y = field_bytes(y).ok_or(InvalidCaKey)?;
        let point = EncodedPoint::from_affine_coordinates(&x, &y, false);
        let key = VerifyingKey::from_encoded_point(&point).map_err(|_| InvalidCaKey)?;
        Ok(CaPublicKey { key })
    }

    /// Check the CA's signature `(r, s)` over the nym pair. Signature
    /// components outside the scalar field count as an invalid signature.
    pub fn verify_nym(
        &self,
        nym_a: &BigUint,
        nym_b: &BigUint,
        sig_r: &BigUint,
        sig_s: &BigUint,
    ) -> bool {
        let (r, s) = match (field_bytes(sig_r), field_bytes(sig_s)) {
            (Some(r), Some(s)) => (r, s),
            _ => return false,
        };
        let signature = match Signature::from_scalars(r, s) {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        let digest = hash::digest_uints(&[nym_a, nym_b]);
        self.key.verify_prehash(&digest, &signature).is_ok()
    }
}

/// Left-pad a big integer into a 32-byte P-256 field element, or `None`
/// if it does not fit.
fn field_bytes(x: &BigUint) -> Option<FieldBytes> {
    let bytes = x.to_bytes_be();
    if bytes.len() > 32 {
        return None;
    }
    let mut padded = [0_u8; 32];
    padded[32 - bytes.len()..].copy_from_slice(&bytes);
    Some(padded.into())
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use p256::ecdsa::signature::hazmat::PrehashSigner;
    use p256::ecdsa::SigningKey;

    /// A fresh CA keypair, the public half already in coordinate form.
    pub fn ca_keypair() -> (SigningKey, CaPublicKey) {
        let signing = SigningKey::random(&mut rand::rngs::OsRng);
        let point = signing.verifying_key().to_encoded_point(false);
        let x = BigUint::from_bytes_be(point.x().unwrap().as_slice());
        let y = BigUint::from_bytes_be(point.y().unwrap().as_slice());
        let public = CaPublicKey::from_coordinates(&x, &y).unwrap();
        (signing, public)
    }

    /// Sign a nym pair the way the CA does, returning `(r, s)`.
    pub fn sign_nym(signing: &SigningKey, nym_a: &BigUint, nym_b: &BigUint) -> (BigUint, BigUint) {
        let digest = hash::digest_uints(&[nym_a, nym_b]);
        let signature: Signature = signing.sign_prehash(&digest).unwrap();
        let (r, s) = signature.split_bytes();
        (
            BigUint::from_bytes_be(r.as_slice()),
            BigUint::from_bytes_be(s.as_slice()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{ca_keypair, sign_nym};
    use super::*;
    use num::{BigUint, One};

    fn uint(x: u32) -> BigUint {
        BigUint::from(x)
    }

    #[test]
    fn accepts_genuine_signature() {
        let (signing, public) = ca_keypair();
        let (nym_a, nym_b) = (uint(2), uint(9));
        let (r, s) = sign_nym(&signing, &nym_a, &nym_b);
        assert!(public.verify_nym(&nym_a, &nym_b, &r, &s));
    }

    #[test]
    fn rejects_perturbed_signature() {
        let (signing, public) = ca_keypair();
        let (nym_a, nym_b) = (uint(2), uint(9));
        let (r, s) = sign_nym(&signing, &nym_a, &nym_b);
        assert!(!public.verify_nym(&nym_a, &nym_b, &(r + BigUint::one()), &s));
    }

    #[test]
    fn rejects_signature_over_other_nym() {
        let (signing, public) = ca_keypair();
        let (r, s) = sign_nym(&signing, &uint(2), &uint(9));
        assert!(!public.verify_nym(&uint(4), &uint(12), &r, &s));
    }

    #[test]
    fn oversize_scalar_is_invalid_not_fatal() {
        let (signing, public) = ca_keypair();
        let (nym_a, nym_b) = (uint(2), uint(9));
        let (_, s) = sign_nym(&signing, &nym_a, &nym_b);
        let oversize = BigUint::from_bytes_be(&[0xff; 40]);
        assert!(!public.verify_nym(&nym_a, &nym_b, &oversize, &s));
    }

    #[test]
    fn rejects_off_curve_coordinates() {
        assert!(CaPublicKey::from_coordinates(&uint(1), &uint(1)).is_err());
    }
}
