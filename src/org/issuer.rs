use num::BigUint;
use rand::Rng;

use crate::crypto::dleq::EqualityProver;
use crate::crypto::group::Group;
use crate::crypto::schnorr::SchnorrVerifier;
use crate::error::ProtocolError;

/// The credential-issuance role, fresh state, holding the organization's
/// secret pair `(s1, s2)`.
///
/// Three rounds: authenticate the nym with a single-exponent Schnorr
/// proof, publish the issued pair together with the first moves of two
/// DL-EQ proofs over the organization secrets, then answer the client's
/// challenges.
pub struct CredentialIssuer {
    group: Group,
    s1: BigUint,
    s2: BigUint,
}

/// The issued pair and the DL-EQ first moves sent back in round 2.
pub struct IssuedData {
    pub x11: BigUint,
    pub x12: BigUint,
    pub x21: BigUint,
    pub x22: BigUint,
    pub big_a: BigUint,
    pub big_b: BigUint,
}

impl CredentialIssuer {
    pub fn new(group: Group, s1: BigUint, s2: BigUint) -> CredentialIssuer {
        CredentialIssuer { group, s1, s2 }
    }

    /// Round 1: take the nym `(a, b)` and the prover's commitment `x`,
    /// and issue the authentication challenge.
    pub fn authentication_challenge<R: Rng>(
        self,
        a: BigUint,
        b: BigUint,
        x: BigUint,
        rng: &mut R,
    ) -> IssuerChallenged {
        let verifier = SchnorrVerifier::new(&self.group, a.clone(), b.clone(), x, rng);
        IssuerChallenged {
            group: self.group,
            s1: self.s1,
            s2: self.s2,
            a,
            b,
            verifier,
        }
    }
}

/// Round 1 issued its challenge; waiting for the proof response.
pub struct IssuerChallenged {
    group: Group,
    s1: BigUint,
    s2: BigUint,
    a: BigUint,
    b: BigUint,
    verifier: SchnorrVerifier,
}

impl IssuerChallenged {
    pub fn challenge(&self) -> &BigUint {
        self.verifier.challenge()
    }

    /// Round 2: check that the client knows the master secret behind the
    /// nym, then compute the issued pair
    /// `A = b^{s2}`, `B = (a·A)^{s1}` and the first moves of the two
    /// DL-EQ proofs (`s1` over bases `(g, a·A)`, `s2` over `(g, b)`).
    pub fn verify_authentication<R: Rng>(
        self,
        z: &BigUint,
        rng: &mut R,
    ) -> Result<(IssuerProving, IssuedData), ProtocolError> {
        let IssuerChallenged {
            group,
            s1,
            s2,
            a,
            b,
            verifier,
        } = self;
        if !verifier.verify(z) {
            return Err(ProtocolError::AuthFailed);
        }

        let big_a = group.exp(&b, &s2);
        let a_big_a = group.mul(&a, &big_a);
        let big_b = group.exp(&a_big_a, &s1);

        let prover1 = EqualityProver::new(&group, &s1, &group.g, &a_big_a, rng);
        let prover2 = EqualityProver::new(&group, &s2, &group.g, &b, rng);

        let (x11, x12) = prover1.random_data();
        let (x21, x22) = prover2.random_data();
        let issued = IssuedData {
            x11: x11.clone(),
            x12: x12.clone(),
            x21: x21.clone(),
            x22: x22.clone(),
            big_a,
            big_b,
        };
        Ok((IssuerProving { prover1, prover2 }, issued))
    }
}

/// Round 2 published the issued pair; waiting for the client's DL-EQ
/// challenges.
pub struct IssuerProving {
    prover1: EqualityProver,
    prover2: EqualityProver,
}

impl IssuerProving {
    /// Round 3: answer `(c1, c2)` with
    /// `(z1, z2) = (γ1 + c1·s1 mod q, γ2 + c2·s2 mod q)`. Consumes the
    /// role; the ephemeral nonces answer exactly one challenge pair.
    pub fn equality_response(self, c1: &BigUint, c2: &BigUint) -> (BigUint, BigUint) {
        (self.prover1.respond(c1), self.prover2.respond(c2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::group::test_support::toy_group;

    fn uint(x: u32) -> BigUint {
        BigUint::from(x)
    }

    /// Drive a full issuance for nym (2, 9) under master secret 5 with
    /// org secrets (3, 6), playing the honest client.
    #[test]
    fn full_issuance_convinces_the_client() {
        let group = toy_group();
        let mut rng = rand::thread_rng();
        let (s1, s2) = (uint(3), uint(6));
        let (h1, h2) = (group.exp(&group.g, &s1), group.exp(&group.g, &s2));
        let (a, b) = (uint(2), uint(9));
        let m = uint(5);
        let r = uint(4);

        let issuer = CredentialIssuer::new(group.clone(), s1, s2);
        let x = group.exp(&a, &r);
        let challenged =
            issuer.authentication_challenge(a.clone(), b.clone(), x, &mut rng);
        let z = group.add_exponents(&r, &group.mul_exponents(challenged.challenge(), &m));

        let (proving, issued) = challenged.verify_authentication(&z, &mut rng).unwrap();
        assert_eq!(issued.big_a, uint(3));
        assert_eq!(issued.big_b, uint(9));

        let (c1, c2) = (uint(2), uint(5));
        let (z1, z2) = proving.equality_response(&c1, &c2);

        // the client's four checks of the issuer's DL-EQ proofs
        let a_big_a = group.mul(&a, &issued.big_a);
        assert_eq!(
            group.exp(&group.g, &z1),
            group.mul(&issued.x11, &group.exp(&h1, &c1))
        );
        assert_eq!(
            group.exp(&a_big_a, &z1),
            group.mul(&issued.x12, &group.exp(&issued.big_b, &c1))
        );
        assert_eq!(
            group.exp(&group.g, &z2),
            group.mul(&issued.x21, &group.exp(&h2, &c2))
        );
        assert_eq!(
            group.exp(&b, &z2),
            group.mul(&issued.x22, &group.exp(&issued.big_a, &c2))
        );
    }

    #[test]
    fn bad_authentication_refuses_to_issue() {
        let group = toy_group();
        let mut rng = rand::thread_rng();
        let issuer = CredentialIssuer::new(group.clone(), uint(3), uint(6));
        let x = group.exp(&uint(2), &uint(4));
        let challenged = issuer.authentication_challenge(uint(2), uint(9), x, &mut rng);
        // response off by one
        let z = group.add_exponents(
            &group.add_exponents(&uint(4), &group.mul_exponents(challenged.challenge(), &uint(5))),
            &uint(1),
        );
        assert!(matches!(
            challenged.verify_authentication(&z, &mut rng),
            Err(ProtocolError::AuthFailed)
        ));
    }
}
