use num::bigint::RandBigInt;
use num::traits::{One, Zero};
use num::BigUint;
use rand::Rng;
use thiserror::Error;

/// A prime-order discrete-log group: the subgroup of `Z_p^*` of prime
/// order `q` generated by `g`, with `q | p-1`.
///
/// Group elements live in `Z_p^*` and are reduced modulo `p`; exponents
/// live in `Z_q` and are reduced modulo `q`. The bundle is built once from
/// configuration and shared read-only across sessions; tests construct toy
/// bundles directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub p: BigUint,
    pub g: BigUint,
    pub q: BigUint,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GroupError {
    #[error("group order does not divide p-1")]
    OrderDoesNotDivide,

    #[error("generator is not of the stated order")]
    BadGenerator,

    #[error("degenerate group parameter")]
    Degenerate,
}

impl Group {
    /// Validate and build a group bundle. `q | p-1` and `g^q ≡ 1 (mod p)`
    /// must hold; `g` must not be the identity.
    pub fn new(p: BigUint, g: BigUint, q: BigUint) -> Result<Group, GroupError> {
        let one = BigUint::one();
        if p <= one || q <= one || g <= one || g >= p {
            return Err(GroupError::Degenerate);
        }
        if !((&p - &one) % &q).is_zero() {
            return Err(GroupError::OrderDoesNotDivide);
        }
        if !g.modpow(&q, &p).is_one() {
            return Err(GroupError::BadGenerator);
        }
        Ok(Group { p, g, q })
    }

    /// `base^exp mod p`.
    pub fn exp(&self, base: &BigUint, exp: &BigUint) -> BigUint {
        base.modpow(exp, &self.p)
    }

    /// `a · b mod p`.
    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        a * b % &self.p
    }

    /// Multiplicative inverse modulo the prime `p`, by Fermat:
    /// `a^{-1} = a^{p-2} mod p`.
    pub fn inv(&self, a: &BigUint) -> BigUint {
        a.modpow(&(&self.p - 2_u8), &self.p)
    }

    /// `a + b mod q` (exponent arithmetic).
    pub fn add_exponents(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) % &self.q
    }

    /// `a · b mod q` (exponent arithmetic).
    pub fn mul_exponents(&self, a: &BigUint, b: &BigUint) -> BigUint {
        a * b % &self.q
    }

    /// Sample a uniform exponent from `Z_q`. Used for every challenge and
    /// every ephemeral prover nonce.
    pub fn random_exponent<R: Rng>(&self, rng: &mut R) -> BigUint {
        rng.gen_biguint_below(&self.q)
    }

    /// Whether `x` is an acceptable group element on the wire: `1 ≤ x < p`.
    pub fn contains_element(&self, x: &BigUint) -> bool {
        !x.is_zero() && *x < self.p
    }

    /// Whether `x` is an acceptable exponent on the wire: `x < q`.
    pub fn contains_exponent(&self, x: &BigUint) -> bool {
        *x < self.q
    }
}

#[cfg(test)]
pub mod test_support {
    use super::Group;
    use num::BigUint;

    /// The toy group `p = 23, g = 2, q = 11` used throughout the unit
    /// tests. `2` has order 11 in `Z_23^*`.
    pub fn toy_group() -> Group {
        Group::new(
            BigUint::from(23_u32),
            BigUint::from(2_u32),
            BigUint::from(11_u32),
        )
        .unwrap()
    }
}
