use num::BigUint;
use rand::Rng;

use crate::crypto::dleq::{EqualityVerifier, Transcript};
use crate::crypto::group::Group;

/// A randomized credential as presented for transfer: the nym powers
/// `(â, b̂) = (a^γ, b^γ)`, the issued powers `(Â, B̂) = (A^γ, B^γ)`, and
/// the two DL-EQ transcripts binding them to the issuing organization's
/// public keys.
#[derive(Debug, Clone)]
pub struct Credential {
    pub small_a: BigUint,
    pub small_b: BigUint,
    pub big_a: BigUint,
    pub big_b: BigUint,
    pub t1: Transcript,
    pub t2: Transcript,
}

/// An organization's public pair `(h1, h2) = (g^{s1}, g^{s2})`.
#[derive(Debug, Clone)]
pub struct OrgPublicKeys {
    pub h1: BigUint,
    pub h2: BigUint,
}

/// The credential-transfer role, fresh state.
pub struct CredentialVerifier {
    group: Group,
}

impl CredentialVerifier {
    pub fn new(group: Group) -> CredentialVerifier {
        CredentialVerifier { group }
    }

    /// Seed a two-exponent verifier for the claim that the master secret
    /// behind the new nym `(nymA, nymB)` also underlies the presented
    /// credential powers `(â, b̂)`, and issue the challenge.
    #[allow(clippy::too_many_arguments)]
    pub fn authentication_challenge<R: Rng>(
        self,
        nym_a: BigUint,
        nym_b: BigUint,
        small_a: BigUint,
        small_b: BigUint,
        x1: BigUint,
        x2: BigUint,
        rng: &mut R,
    ) -> VerifierChallenged {
        let verifier =
            EqualityVerifier::new(&self.group, nym_a, nym_b, small_a, small_b, x1, x2, rng);
        VerifierChallenged {
            group: self.group,
            verifier,
        }
    }
}

/// The role after the challenge was issued.
pub struct VerifierChallenged {
    group: Group,
    verifier: EqualityVerifier,
}

impl VerifierChallenged {
    pub fn challenge(&self) -> &BigUint {
        self.verifier.challenge()
    }

    /// Final round: the two-exponent check must hold, and both credential
    /// transcripts must verify against the *issuing* organization's
    /// public keys — `t1` for `log_g h1 = log_{â·Â} B̂`, `t2` for
    /// `log_g h2 = log_{b̂} Â`.
    pub fn verify(
        self,
        z: &BigUint,
        credential: &Credential,
        issuer_keys: &OrgPublicKeys,
    ) -> bool {
        let VerifierChallenged { group, verifier } = self;
        if !verifier.verify(z) {
            return false;
        }
        let a_big_a = group.mul(&credential.small_a, &credential.big_a);
        credential.t1.verify(
            &group,
            &group.g,
            &issuer_keys.h1,
            &a_big_a,
            &credential.big_b,
        ) && credential.t2.verify(
            &group,
            &group.g,
            &issuer_keys.h2,
            &credential.small_b,
            &credential.big_a,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::group::test_support::toy_group;

    fn uint(x: u32) -> BigUint {
        BigUint::from(x)
    }

    /// Credential issued on nym (2, 9) by org secrets (3, 6), then
    /// randomized by γ = 2: (â, b̂, Â, B̂) = (4, 12, 9, 12).
    fn presented_credential(group: &Group) -> (Credential, OrgPublicKeys) {
        let mut rng = rand::thread_rng();
        let (s1, s2) = (uint(3), uint(6));
        let keys = OrgPublicKeys {
            h1: group.exp(&group.g, &s1),
            h2: group.exp(&group.g, &s2),
        };
        let (small_a, small_b) = (uint(4), uint(12));
        let (big_a, big_b) = (uint(9), uint(12));
        let a_big_a = group.mul(&small_a, &big_a);
        let t1 = Transcript::prove(group, &s1, &group.g, &a_big_a, &mut rng);
        let t2 = Transcript::prove(group, &s2, &group.g, &small_b, &mut rng);
        (
            Credential {
                small_a,
                small_b,
                big_a,
                big_b,
                t1,
                t2,
            },
            keys,
        )
    }

    /// Master secret 5; new nym (3, 13) at this organization; prover
    /// nonce 7 over bases (nymA, â).
    #[test]
    fn honest_transfer_verifies() {
        let group = toy_group();
        let (credential, keys) = presented_credential(&group);
        let (nym_a, nym_b) = (uint(3), uint(13));
        let m = uint(5);
        let r = uint(7);

        let role = CredentialVerifier::new(group.clone());
        let session = role.authentication_challenge(
            nym_a.clone(),
            nym_b,
            credential.small_a.clone(),
            credential.small_b.clone(),
            group.exp(&nym_a, &r),
            group.exp(&credential.small_a, &r),
            &mut rand::thread_rng(),
        );
        let z = group.add_exponents(&r, &group.mul_exponents(session.challenge(), &m));
        assert!(session.verify(&z, &credential, &keys));
    }

    #[test]
    fn transfer_fails_against_wrong_issuer_keys() {
        let group = toy_group();
        let (credential, _) = presented_credential(&group);
        let other_org = OrgPublicKeys {
            h1: group.exp(&group.g, &uint(4)),
            h2: group.exp(&group.g, &uint(5)),
        };
        let (nym_a, nym_b) = (uint(3), uint(13));
        let m = uint(5);
        let r = uint(7);

        let role = CredentialVerifier::new(group.clone());
        let session = role.authentication_challenge(
            nym_a.clone(),
            nym_b,
            credential.small_a.clone(),
            credential.small_b.clone(),
            group.exp(&nym_a, &r),
            group.exp(&credential.small_a, &r),
            &mut rand::thread_rng(),
        );
        let z = group.add_exponents(&r, &group.mul_exponents(session.challenge(), &m));
        assert!(!session.verify(&z, &credential, &other_org));
    }

    #[test]
    fn transfer_fails_with_tampered_transcript() {
        let group = toy_group();
        let (mut credential, keys) = presented_credential(&group);
        credential.t1.z_alpha = group.add_exponents(&credential.t1.z_alpha, &uint(1));
        let (nym_a, nym_b) = (uint(3), uint(13));
        let m = uint(5);
        let r = uint(7);

        let role = CredentialVerifier::new(group.clone());
        let session = role.authentication_challenge(
            nym_a.clone(),
            nym_b,
            credential.small_a.clone(),
            credential.small_b.clone(),
            group.exp(&nym_a, &r),
            group.exp(&credential.small_a, &r),
            &mut rand::thread_rng(),
        );
        let z = group.add_exponents(&r, &group.mul_exponents(session.challenge(), &m));
        assert!(!session.verify(&z, &credential, &keys));
    }
}
