use std::io;

use thiserror::Error;

use crate::crypto::casig::InvalidCaKey;
use crate::crypto::group::GroupError;

/// A protocol-level failure inside a session.
///
/// These are always converted into an in-band terminal message; they never
/// abort the transport. The `Display` form is what goes on the wire in the
/// `protocol_error` field.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The CA's signature over the committed nym pair did not verify.
    #[error("INVALID_CA_SIGNATURE")]
    InvalidCaSignature,

    /// The Schnorr authentication of the nym failed.
    #[error("AUTH_FAILED")]
    AuthFailed,

    /// Wrong message variant, missing field, or integer out of range.
    #[error("MALFORMED: {0}")]
    Malformed(String),

    /// The client named an issuing organization this server does not know.
    #[error("UNKNOWN_ORG: {0}")]
    UnknownOrg(String),
}

/// The stream to the client broke mid-session. Unlike `ProtocolError`,
/// these bubble out of the handler and abort the session.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("stream closed by peer")]
    Closed,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("malformed frame: {0}")]
    Frame(#[from] serde_json::Error),
}

/// Startup-time configuration failure. Fatal: the server refuses to start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    Io(#[from] io::Error),

    #[error("cannot parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("missing configuration entry: {0}")]
    Missing(String),

    #[error(transparent)]
    Group(#[from] GroupError),

    #[error(transparent)]
    CaKey(#[from] InvalidCaKey),
}
