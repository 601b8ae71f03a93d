//! The interaction driver: per-session dispatch and the explicit round
//! sequencing of the three protocols.
//!
//! Each handler owns one stream for one session. Protocol-level failures
//! (bad signature, failed proof, malformed or out-of-range field) are
//! converted into a terminal in-band message and the handler returns
//! `Ok`; only a broken stream surfaces as an error.

mod listen;

pub use listen::{serve, tls_config, TlsError};

use std::collections::HashMap;

use num::BigUint;
use tracing::{debug, warn};

use crate::config::Config;
use crate::crypto::casig::CaPublicKey;
use crate::crypto::dleq::Transcript;
use crate::crypto::group::Group;
use crate::error::{ConfigError, ProtocolError, TransportError};
use crate::message::{
    marshal_uint, unmarshal_uint, BigIntData, Content, CredentialData, DoubleBigIntData,
    Envelope, IssueProofRandomData, NymGenProofRandomData, PedersenDecommitment,
    SchnorrProofRandomData, Status, TransferCredentialData,
};
use crate::org::issuer::CredentialIssuer;
use crate::org::nym_gen::{NymGen, NymGenChallenged, NymRequest};
use crate::org::verifier::{Credential, CredentialVerifier, OrgPublicKeys};
use crate::transport::ProtocolStream;

/// Everything a session needs, loaded once at startup and shared
/// read-only across all sessions.
pub struct ServerParams {
    pub group: Group,
    pub ca_pubkey: CaPublicKey,
    pub s1: BigUint,
    pub s2: BigUint,
    /// Public pairs of every organization whose credentials this server
    /// accepts for transfer, keyed by name.
    pub issuers: HashMap<String, OrgPublicKeys>,
}

impl ServerParams {
    /// Assemble the bundle for the organization this server acts as.
    pub fn from_config(config: &Config, org: &str) -> Result<ServerParams, ConfigError> {
        let group = config.dlog("pseudonymsys")?;
        let ca_pubkey = config.ca_pubkey()?;
        let (s1, s2) = config.org_secrets(org, "dlog")?;
        let mut issuers = HashMap::new();
        for name in config.org_names() {
            issuers.insert(name.to_owned(), config.org_pubkeys(name)?);
        }
        Ok(ServerParams {
            group,
            ca_pubkey,
            s1,
            s2,
            issuers,
        })
    }
}

pub struct Server {
    params: ServerParams,
}

impl Server {
    pub fn new(params: ServerParams) -> Server {
        Server { params }
    }

    /// Dispatch one session on its initial request. The variant of the
    /// first message selects the protocol; anything else is malformed.
    pub fn handle_session(
        &self,
        initial: Envelope,
        stream: &mut dyn ProtocolStream,
    ) -> Result<(), TransportError> {
        match initial.content {
            Content::NymGenProofRandomData(data) => self.generate_nym(data, stream),
            Content::SchnorrProofRandomData(data) => self.issue_credential(data, stream),
            Content::TransferCredentialData(data) => self.transfer_credential(data, stream),
            other => {
                warn!(?other, "unexpected initial message variant");
                let err = ProtocolError::Malformed("unexpected initial message".to_owned());
                stream.send(&Envelope::failure(
                    Content::Status(Status { success: false }),
                    err.to_string(),
                ))?;
                Ok(())
            }
        }
    }

    /// Pseudonym generation: one challenge, one verification.
    fn generate_nym(
        &self,
        data: NymGenProofRandomData,
        stream: &mut dyn ProtocolStream,
    ) -> Result<(), TransportError> {
        debug!("pseudonym generation session");
        let session = match self.start_nym_session(&data) {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "pseudonym generation aborted");
                stream.send(&Envelope::failure(
                    Content::PedersenDecommitment(PedersenDecommitment::default()),
                    err.to_string(),
                ))?;
                return Ok(());
            }
        };
        stream.send(&Envelope::new(Content::PedersenDecommitment(
            PedersenDecommitment {
                x: marshal_uint(session.challenge()),
            },
        )))?;

        let reply = stream.receive()?;
        let response = match reply.content {
            Content::SchnorrProofData(proof) => exponent(&self.params.group, &proof.z, "z"),
            other => Err(unexpected("SchnorrProofData", &other)),
        };
        let status = match response {
            Ok(z) => Envelope::new(Content::Status(Status {
                success: session.verify(&z),
            })),
            Err(err) => {
                warn!(error = %err, "pseudonym generation failed");
                Envelope::failure(Content::Status(Status { success: false }), err.to_string())
            }
        };
        stream.send(&status)?;
        Ok(())
    }

    fn start_nym_session(
        &self,
        data: &NymGenProofRandomData,
    ) -> Result<NymGenChallenged, ProtocolError> {
        let group = &self.params.group;
        let req = NymRequest {
            nym_a: element(group, &data.a1, "a1")?,
            nym_b: element(group, &data.b1, "b1")?,
            blinded_a: element(group, &data.a2, "a2")?,
            blinded_b: element(group, &data.b2, "b2")?,
            x1: element(group, &data.x1, "x1")?,
            x2: element(group, &data.x2, "x2")?,
            // signature components live in the P-256 scalar field, not the
            // group; the signature check ranges them itself
            sig_r: unmarshal_uint(&data.r),
            sig_s: unmarshal_uint(&data.s),
        };
        NymGen::new(group.clone(), self.params.ca_pubkey.clone())
            .challenge(req, &mut rand::thread_rng())
    }

    /// Credential issuance: authentication challenge, issued pair, DL-EQ
    /// responses.
    fn issue_credential(
        &self,
        data: SchnorrProofRandomData,
        stream: &mut dyn ProtocolStream,
    ) -> Result<(), TransportError> {
        debug!("credential issuance session");
        let group = &self.params.group;
        let challenged = match parse_issuance_fields(group, &data) {
            Ok((a, b, x)) => CredentialIssuer::new(
                group.clone(),
                self.params.s1.clone(),
                self.params.s2.clone(),
            )
            .authentication_challenge(a, b, x, &mut rand::thread_rng()),
            Err(err) => {
                warn!(error = %err, "credential issuance aborted");
                stream.send(&Envelope::failure(
                    Content::BigInt(BigIntData::default()),
                    err.to_string(),
                ))?;
                return Ok(());
            }
        };
        stream.send(&Envelope::new(Content::BigInt(BigIntData {
            x1: marshal_uint(challenged.challenge()),
        })))?;

        let reply = stream.receive()?;
        let response = match reply.content {
            Content::BigInt(proof) => exponent(group, &proof.x1, "z"),
            other => Err(unexpected("BigInt", &other)),
        };
        let outcome = response
            .and_then(|z| challenged.verify_authentication(&z, &mut rand::thread_rng()));
        let (proving, issued) = match outcome {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "credential issuance failed");
                stream.send(&Envelope::failure(
                    Content::IssueProofRandomData(IssueProofRandomData::default()),
                    err.to_string(),
                ))?;
                return Ok(());
            }
        };
        stream.send(&Envelope::new(Content::IssueProofRandomData(
            IssueProofRandomData {
                x11: marshal_uint(&issued.x11),
                x12: marshal_uint(&issued.x12),
                x21: marshal_uint(&issued.x21),
                x22: marshal_uint(&issued.x22),
                a: marshal_uint(&issued.big_a),
                b: marshal_uint(&issued.big_b),
            },
        )))?;

        let reply = stream.receive()?;
        let challenges = match reply.content {
            Content::DoubleBigInt(pair) => exponent(group, &pair.x1, "c1")
                .and_then(|c1| Ok((c1, exponent(group, &pair.x2, "c2")?))),
            other => Err(unexpected("DoubleBigInt", &other)),
        };
        match challenges {
            Ok((c1, c2)) => {
                let (z1, z2) = proving.equality_response(&c1, &c2);
                stream.send(&Envelope::new(Content::DoubleBigInt(DoubleBigIntData {
                    x1: marshal_uint(&z1),
                    x2: marshal_uint(&z2),
                })))?;
            }
            Err(err) => {
                warn!(error = %err, "credential issuance failed");
                stream.send(&Envelope::failure(
                    Content::DoubleBigInt(DoubleBigIntData::default()),
                    err.to_string(),
                ))?;
            }
        }
        Ok(())
    }

    /// Credential transfer: authentication challenge, then the combined
    /// proof-and-transcript verification.
    fn transfer_credential(
        &self,
        data: TransferCredentialData,
        stream: &mut dyn ProtocolStream,
    ) -> Result<(), TransportError> {
        debug!(org = %data.org_name, "credential transfer session");
        let group = &self.params.group;
        let parsed = self.start_transfer_session(&data);
        let (org_name, credential, session) = match parsed {
            Ok(state) => state,
            Err(err) => {
                warn!(error = %err, "credential transfer aborted");
                stream.send(&Envelope::failure(
                    Content::BigInt(BigIntData::default()),
                    err.to_string(),
                ))?;
                return Ok(());
            }
        };
        stream.send(&Envelope::new(Content::BigInt(BigIntData {
            x1: marshal_uint(session.challenge()),
        })))?;

        let reply = stream.receive()?;
        let response = match reply.content {
            Content::BigInt(proof) => exponent(group, &proof.x1, "z"),
            other => Err(unexpected("BigInt", &other)),
        };
        let verdict = response.and_then(|z| {
            let issuer_keys = self
                .params
                .issuers
                .get(&org_name)
                .ok_or_else(|| ProtocolError::UnknownOrg(org_name.clone()))?;
            Ok(session.verify(&z, &credential, issuer_keys))
        });
        let status = match verdict {
            Ok(success) => Envelope::new(Content::Status(Status { success })),
            Err(err) => {
                warn!(error = %err, "credential transfer failed");
                Envelope::failure(Content::Status(Status { success: false }), err.to_string())
            }
        };
        stream.send(&status)?;
        Ok(())
    }

    #[allow(clippy::type_complexity)]
    fn start_transfer_session(
        &self,
        data: &TransferCredentialData,
    ) -> Result<(String, Credential, crate::org::verifier::VerifierChallenged), ProtocolError> {
        let group = &self.params.group;
        let credential = parse_credential(group, &data.credential)?;
        let nym_a = element(group, &data.nym_a, "nym_a")?;
        let nym_b = element(group, &data.nym_b, "nym_b")?;
        let x1 = element(group, &data.x1, "x1")?;
        let x2 = element(group, &data.x2, "x2")?;
        let session = CredentialVerifier::new(group.clone()).authentication_challenge(
            nym_a,
            nym_b,
            credential.small_a.clone(),
            credential.small_b.clone(),
            x1,
            x2,
            &mut rand::thread_rng(),
        );
        Ok((data.org_name.clone(), credential, session))
    }
}

fn parse_issuance_fields(
    group: &Group,
    data: &SchnorrProofRandomData,
) -> Result<(BigUint, BigUint, BigUint), ProtocolError> {
    let a = element(group, &data.a, "a")?;
    let b = element(group, &data.b, "b")?;
    let x = element(group, &data.x, "x")?;
    Ok((a, b, x))
}

fn parse_credential(group: &Group, data: &CredentialData) -> Result<Credential, ProtocolError> {
    Ok(Credential {
        small_a: element(group, &data.small_a_to_gamma, "credential.small_a")?,
        small_b: element(group, &data.small_b_to_gamma, "credential.small_b")?,
        big_a: element(group, &data.a_to_gamma, "credential.A")?,
        big_b: element(group, &data.b_to_gamma, "credential.B")?,
        t1: parse_transcript(group, &data.t1, "t1")?,
        t2: parse_transcript(group, &data.t2, "t2")?,
    })
}

fn parse_transcript(
    group: &Group,
    data: &crate::message::TranscriptData,
    field: &str,
) -> Result<Transcript, ProtocolError> {
    Ok(Transcript {
        a: element(group, &data.a, &format!("{}.a", field))?,
        b: element(group, &data.b, &format!("{}.b", field))?,
        // the challenge hash is a full digest, not an exponent
        hash: unmarshal_uint(&data.hash),
        z_alpha: exponent(group, &data.z_alpha, &format!("{}.z_alpha", field))?,
    })
}

/// Parse a wire field as a group element, rejecting `0` and `≥ p`.
fn element(group: &Group, bytes: &[u8], field: &str) -> Result<BigUint, ProtocolError> {
    let x = unmarshal_uint(bytes);
    if group.contains_element(&x) {
        Ok(x)
    } else {
        Err(ProtocolError::Malformed(format!(
            "{} is not a group element",
            field
        )))
    }
}

/// Parse a wire field as an exponent, rejecting `≥ q`.
fn exponent(group: &Group, bytes: &[u8], field: &str) -> Result<BigUint, ProtocolError> {
    let x = unmarshal_uint(bytes);
    if group.contains_exponent(&x) {
        Ok(x)
    } else {
        Err(ProtocolError::Malformed(format!(
            "{} is not an exponent",
            field
        )))
    }
}

fn unexpected(expected: &str, got: &Content) -> ProtocolError {
    ProtocolError::Malformed(format!("expected {}, got {}", expected, variant_name(got)))
}

fn variant_name(content: &Content) -> &'static str {
    match content {
        Content::NymGenProofRandomData(_) => "NymGenProofRandomData",
        Content::PedersenDecommitment(_) => "PedersenDecommitment",
        Content::SchnorrProofData(_) => "SchnorrProofData",
        Content::SchnorrProofRandomData(_) => "SchnorrProofRandomData",
        Content::IssueProofRandomData(_) => "IssueProofRandomData",
        Content::TransferCredentialData(_) => "TransferCredentialData",
        Content::BigInt(_) => "BigInt",
        Content::DoubleBigInt(_) => "DoubleBigInt",
        Content::Status(_) => "Status",
    }
}
