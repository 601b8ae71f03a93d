use num::BigUint;
use rand::Rng;

use super::group::Group;

/// Verifier side of the single-exponent Schnorr proof of knowledge.
///
/// The prover claims to know `m` with `claim = base^m mod p` and has sent
/// the first-move commitment `x = base^r`. Constructing the verifier
/// samples a fresh challenge `c ← Z_q`; the prover answers with
/// `z = r + c·m mod q`, accepted iff `base^z ≡ x · claim^c (mod p)`.
///
/// One verifier serves exactly one session: `verify` consumes it.
pub struct SchnorrVerifier {
    group: Group,
    base: BigUint,
    claim: BigUint,
    commitment: BigUint,
    challenge: BigUint,
}

impl SchnorrVerifier {
    pub fn new<R: Rng>(
        group: &Group,
        base: BigUint,
        claim: BigUint,
        commitment: BigUint,
        rng: &mut R,
    ) -> SchnorrVerifier {
        let challenge = group.random_exponent(rng);
        SchnorrVerifier {
            group: group.clone(),
            base,
            claim,
            commitment,
            challenge,
        }
    }

    pub fn challenge(&self) -> &BigUint {
        &self.challenge
    }

    pub fn verify(self, z: &BigUint) -> bool {
        let left = self.group.exp(&self.base, z);
        let right = self.group.mul(
            &self.commitment,
            &self.group.exp(&self.claim, &self.challenge),
        );
        left == right
    }
}

#[cfg(test)]
mod tests {
    use super::super::group::test_support::toy_group;
    use super::*;

    fn uint(x: u32) -> BigUint {
        BigUint::from(x)
    }

    /// Play the honest prover for witness `m` and nonce `r`, returning the
    /// accepted-or-not verdict.
    fn run_proof(m: u32, r: u32, tamper: u32) -> bool {
        let group = toy_group();
        let base = group.g.clone();
        let claim = group.exp(&base, &uint(m));
        let commitment = group.exp(&base, &uint(r));

        let mut rng = rand::thread_rng();
        let verifier = SchnorrVerifier::new(&group, base, claim, commitment, &mut rng);
        let z = group.add_exponents(
            &uint(r),
            &group.mul_exponents(verifier.challenge(), &uint(m)),
        );
        verifier.verify(&group.add_exponents(&z, &uint(tamper)))
    }

    #[test]
    fn accepts_honest_prover() {
        assert!(run_proof(5, 3, 0));
    }

    #[test]
    fn rejects_shifted_response() {
        assert!(!run_proof(5, 3, 1));
    }

    #[test]
    fn works_off_the_default_generator() {
        // base 4 = g^2 also has order 11
        let group = toy_group();
        let base = uint(4);
        let m = uint(7);
        let claim = group.exp(&base, &m);
        let r = uint(2);
        let commitment = group.exp(&base, &r);

        let mut rng = rand::thread_rng();
        let verifier = SchnorrVerifier::new(&group, base, claim, commitment, &mut rng);
        let z = group.add_exponents(&r, &group.mul_exponents(verifier.challenge(), &m));
        assert!(verifier.verify(&z));
    }
}
