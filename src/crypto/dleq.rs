//! Discrete-log-equality machinery shared by every role.
//!
//! Three kernels live here:
//!
//! - [`EqualityVerifier`], the interactive two-exponent Schnorr verifier:
//!   the prover claims one exponent `m` underlies both `y1 = g1^m` and
//!   `y2 = g2^m`.
//! - [`EqualityProver`], the interactive counterpart used by the issuer to
//!   prove its own secrets to the client.
//! - [`Transcript`], the non-interactive (Fiat–Shamir) form verified when
//!   a credential is shown.

use num::BigUint;
use rand::Rng;

use super::group::Group;
use super::hash;

/// Verifier side of the two-exponent Schnorr proof.
///
/// Seeded with the prover's first-move pair `(x1, x2) = (g1^r, g2^r)`;
/// sampling the challenge happens at construction. The response `z`
/// is accepted iff `g1^z ≡ x1 · y1^c` and `g2^z ≡ x2 · y2^c` (mod p).
pub struct EqualityVerifier {
    group: Group,
    g1: BigUint,
    y1: BigUint,
    g2: BigUint,
    y2: BigUint,
    x1: BigUint,
    x2: BigUint,
    challenge: BigUint,
}

impl EqualityVerifier {
    #[allow(clippy::too_many_arguments)]
    pub fn new<R: Rng>(
        group: &Group,
        g1: BigUint,
        y1: BigUint,
        g2: BigUint,
        y2: BigUint,
        x1: BigUint,
        x2: BigUint,
        rng: &mut R,
    ) -> EqualityVerifier {
        let challenge = group.random_exponent(rng);
        EqualityVerifier {
            group: group.clone(),
            g1,
            y1,
            g2,
            y2,
            x1,
            x2,
            challenge,
        }
    }

    pub fn challenge(&self) -> &BigUint {
        &self.challenge
    }

    pub fn verify(self, z: &BigUint) -> bool {
        let EqualityVerifier {
            group,
            g1,
            y1,
            g2,
            y2,
            x1,
            x2,
            challenge,
        } = self;
        let first = group.exp(&g1, z) == group.mul(&x1, &group.exp(&y1, &challenge));
        let second = group.exp(&g2, z) == group.mul(&x2, &group.exp(&y2, &challenge));
        first && second
    }
}

/// Prover side of the interactive DL-EQ proof for a long-lived secret.
///
/// Holds the ephemeral nonce `γ` between the first move and the response;
/// `respond` consumes the prover, so the nonce can never answer two
/// challenges.
pub struct EqualityProver {
    group: Group,
    secret: BigUint,
    gamma: BigUint,
    t1: BigUint,
    t2: BigUint,
}

impl EqualityProver {
    pub fn new<R: Rng>(
        group: &Group,
        secret: &BigUint,
        g1: &BigUint,
        g2: &BigUint,
        rng: &mut R,
    ) -> EqualityProver {
        let gamma = group.random_exponent(rng);
        let t1 = group.exp(g1, &gamma);
        let t2 = group.exp(g2, &gamma);
        EqualityProver {
            group: group.clone(),
            secret: secret.clone(),
            gamma,
            t1,
            t2,
        }
    }

    /// The first-move pair `(g1^γ, g2^γ)`.
    pub fn random_data(&self) -> (&BigUint, &BigUint) {
        (&self.t1, &self.t2)
    }

    /// The response `γ + c·secret mod q`.
    pub fn respond(self, challenge: &BigUint) -> BigUint {
        self.group.add_exponents(
            &self.gamma,
            &self.group.mul_exponents(challenge, &self.secret),
        )
    }
}

/// A non-interactive DL-EQ transcript `(A, B, Hash, z_α)` for the
/// statement `log_{g1} y1 = log_{g2} y2`, with
/// `Hash = H(g1, y1, g2, y2, A, B)` and `z_α = α + Hash·secret mod q`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub a: BigUint,
    pub b: BigUint,
    pub hash: BigUint,
    pub z_alpha: BigUint,
}

impl Transcript {
    /// Produce a transcript for the statement `(g1, g1^secret, g2,
    /// g2^secret)`. The server only ever verifies transcripts; proving
    /// lives here so tests (and any client built on this crate) can play
    /// the honest prover.
    pub fn prove<R: Rng>(
        group: &Group,
        secret: &BigUint,
        g1: &BigUint,
        g2: &BigUint,
        rng: &mut R,
    ) -> Transcript {
        let y1 = group.exp(g1, secret);
        let y2 = group.exp(g2, secret);
        let alpha = group.random_exponent(rng);
        let a = group.exp(g1, &alpha);
        let b = group.exp(g2, &alpha);
        let hash = hash::hash_uints(&[g1, &y1, g2, &y2, &a, &b]);
        let z_alpha = group.add_exponents(&alpha, &group.mul_exponents(&hash, secret));
        Transcript { a, b, hash, z_alpha }
    }

    /// Verify this transcript against the claimed statement: recompute the
    /// challenge hash, then check both exponent equations.
    pub fn verify(
        &self,
        group: &Group,
        g1: &BigUint,
        y1: &BigUint,
        g2: &BigUint,
        y2: &BigUint,
    ) -> bool {
        if hash::hash_uints(&[g1, y1, g2, y2, &self.a, &self.b]) != self.hash {
            return false;
        }
        let first =
            group.exp(g1, &self.z_alpha) == group.mul(&self.a, &group.exp(y1, &self.hash));
        let second =
            group.exp(g2, &self.z_alpha) == group.mul(&self.b, &group.exp(y2, &self.hash));
        first && second
    }
}
