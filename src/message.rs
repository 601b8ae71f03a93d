//! The tagged wire union exchanged between client and server, plus the
//! big-integer byte-string encoding used for every numeric field.
//!
//! All numeric fields travel as minimal big-endian byte strings: no sign,
//! no padding, and zero is the empty string. Parsing strips leading
//! zeros; range checks against the group are the handler's job.

use num::traits::Zero;
use num::BigUint;
use serde::{Deserialize, Serialize};

/// Minimal big-endian encoding. `marshal_uint(0)` is the empty string.
pub fn marshal_uint(x: &BigUint) -> Vec<u8> {
    if x.is_zero() {
        Vec::new()
    } else {
        x.to_bytes_be()
    }
}

/// Inverse of [`marshal_uint`]; accepts (and ignores) leading zeros, and
/// maps the empty string to zero.
pub fn unmarshal_uint(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// One framed message. `protocol_error` is populated on terminal
/// responses when the session failed at the protocol level; the carried
/// variant is then the one the client was expecting, with an empty or
/// partial payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub content: Content,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_error: Option<String>,
}

impl Envelope {
    pub fn new(content: Content) -> Envelope {
        Envelope {
            content,
            protocol_error: None,
        }
    }

    pub fn failure(content: Content, error: String) -> Envelope {
        Envelope {
            content,
            protocol_error: Some(error),
        }
    }
}

/// Every message variant of the protocol suite. Handlers match on this
/// exhaustively; an unexpected variant mid-session is a protocol error,
/// never a crash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Content {
    NymGenProofRandomData(NymGenProofRandomData),
    PedersenDecommitment(PedersenDecommitment),
    SchnorrProofData(SchnorrProofData),
    SchnorrProofRandomData(SchnorrProofRandomData),
    IssueProofRandomData(IssueProofRandomData),
    TransferCredentialData(TransferCredentialData),
    BigInt(BigIntData),
    DoubleBigInt(DoubleBigIntData),
    Status(Status),
}

/// Round-1 payload of pseudonym generation: the nym pair, the blinded
/// pair, the prover's two-exponent first moves, and the CA signature over
/// the nym.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NymGenProofRandomData {
    pub x1: Vec<u8>,
    pub a1: Vec<u8>,
    pub b1: Vec<u8>,
    pub x2: Vec<u8>,
    pub a2: Vec<u8>,
    pub b2: Vec<u8>,
    pub r: Vec<u8>,
    pub s: Vec<u8>,
}

/// Challenge response of pseudonym generation. Empty on a pre-challenge
/// abort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PedersenDecommitment {
    pub x: Vec<u8>,
}

/// The sigma-protocol response `z`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchnorrProofData {
    pub z: Vec<u8>,
}

/// Round-1 payload of issuance: the prover's commitment `x` and the nym
/// `(a, b)` being authenticated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchnorrProofRandomData {
    pub x: Vec<u8>,
    pub a: Vec<u8>,
    pub b: Vec<u8>,
}

/// Round-2 payload of issuance: the issuer's two DL-EQ first-move pairs
/// and the issued credential pair `(A, B)` (`a` and `b` here carry the
/// capital pair).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueProofRandomData {
    pub x11: Vec<u8>,
    pub x12: Vec<u8>,
    pub x21: Vec<u8>,
    pub x22: Vec<u8>,
    pub a: Vec<u8>,
    pub b: Vec<u8>,
}

/// A single big integer; used for bare challenges and responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BigIntData {
    pub x1: Vec<u8>,
}

/// A pair of big integers; used for the issuance round-3 challenge and
/// response pairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DoubleBigIntData {
    pub x1: Vec<u8>,
    pub x2: Vec<u8>,
}

/// One non-interactive DL-EQ transcript of a shown credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptData {
    pub a: Vec<u8>,
    pub b: Vec<u8>,
    pub hash: Vec<u8>,
    pub z_alpha: Vec<u8>,
}

/// The randomized credential as presented for transfer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialData {
    pub small_a_to_gamma: Vec<u8>,
    pub small_b_to_gamma: Vec<u8>,
    pub a_to_gamma: Vec<u8>,
    pub b_to_gamma: Vec<u8>,
    pub t1: TranscriptData,
    pub t2: TranscriptData,
}

/// Round-1 payload of credential transfer: the issuing organization's
/// name, the new nym at this organization, the prover's two-exponent
/// first moves, and the credential itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferCredentialData {
    pub org_name: String,
    pub x1: Vec<u8>,
    pub x2: Vec<u8>,
    pub nym_a: Vec<u8>,
    pub nym_b: Vec<u8>,
    pub credential: CredentialData,
}

/// Terminal verdict of a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Status {
    pub success: bool,
}
