use num::BigUint;
use rand::Rng;

use crate::crypto::casig::CaPublicKey;
use crate::crypto::dleq::EqualityVerifier;
use crate::crypto::group::Group;
use crate::error::ProtocolError;

/// Round-1 input of pseudonym generation: the CA-certified nym pair, the
/// blinded pair committing to the same master secret, the prover's
/// two-exponent first moves, and the CA signature.
pub struct NymRequest {
    pub nym_a: BigUint,
    pub nym_b: BigUint,
    pub blinded_a: BigUint,
    pub blinded_b: BigUint,
    pub x1: BigUint,
    pub x2: BigUint,
    pub sig_r: BigUint,
    pub sig_s: BigUint,
}

/// The pseudonym-generation role, fresh state. A valid CA signature over
/// the nym admits the session into the challenged state.
pub struct NymGen {
    group: Group,
    ca_pubkey: CaPublicKey,
}

impl NymGen {
    pub fn new(group: Group, ca_pubkey: CaPublicKey) -> NymGen {
        NymGen { group, ca_pubkey }
    }

    /// Verify the CA's certification of `(nymA, nymB)`, then seed a
    /// two-exponent verifier for the claim that one master secret
    /// underlies both `nymA → nymB` and `blindedA → blindedB`.
    pub fn challenge<R: Rng>(
        self,
        req: NymRequest,
        rng: &mut R,
    ) -> Result<NymGenChallenged, ProtocolError> {
        if !self
            .ca_pubkey
            .verify_nym(&req.nym_a, &req.nym_b, &req.sig_r, &req.sig_s)
        {
            return Err(ProtocolError::InvalidCaSignature);
        }
        let verifier = EqualityVerifier::new(
            &self.group,
            req.nym_a,
            req.nym_b,
            req.blinded_a,
            req.blinded_b,
            req.x1,
            req.x2,
            rng,
        );
        Ok(NymGenChallenged { verifier })
    }
}

/// The role after the challenge was issued; only the final verification
/// remains.
pub struct NymGenChallenged {
    verifier: EqualityVerifier,
}

impl NymGenChallenged {
    pub fn challenge(&self) -> &BigUint {
        self.verifier.challenge()
    }

    pub fn verify(self, z: &BigUint) -> bool {
        self.verifier.verify(z)
    }
}
