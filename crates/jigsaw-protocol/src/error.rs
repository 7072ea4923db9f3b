//! Error types for the protocol layer.
//!
//! Every variant here is fatal to a session: once a frame fails to decode
//! the binary stream can't be trusted, so the session layer tears the
//! connection down instead of skipping the frame.

use crate::challenge::EXPECTED_VERSION;

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing an outbound JSON message failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// An inbound JSON frame is malformed or has the wrong shape.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// An inbound binary frame is shorter than its layout requires.
    #[error("truncated frame: need {needed} bytes, got {len}")]
    Truncated {
        /// Bytes the layout needs up to the field being read.
        needed: usize,
        /// Bytes actually present.
        len: usize,
    },

    /// The server speaks a protocol version this client wasn't built for.
    #[error(
        "unexpected puzzle server version {found} (wanted {expected}); \
         enable override_version to ignore",
        expected = EXPECTED_VERSION
    )]
    VersionMismatch {
        /// The version string the server announced.
        found: String,
    },

    /// The challenge formula doesn't match the expected grammar.
    #[error("unexpected challenge form {0:?}")]
    MalformedChallenge(String),

    /// A room must describe exactly one piece set.
    #[error("unexpected set count {0}, expected exactly one")]
    SetCount(usize),

    /// The message is invalid at the protocol level.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
