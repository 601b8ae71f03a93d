//! The three organization roles of the pseudonym system. Each role is a
//! typestate machine: every round consumes the previous state, so a used
//! role can never be driven out of order or replayed.

pub mod issuer;
pub mod nym_gen;
pub mod verifier;

pub use issuer::CredentialIssuer;
pub use nym_gen::NymGen;
pub use verifier::{Credential, CredentialVerifier, OrgPublicKeys};
