//! Unified error type for the jigsaw client.

use jigsaw_protocol::ProtocolError;
use jigsaw_session::SessionError;
use jigsaw_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum JigsawError {
    /// A transport-level error (connect, send, recv, server close).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (decode, challenge, version).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (connect, closed, task failure).
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let jigsaw_err: JigsawError = err.into();
        assert!(matches!(jigsaw_err, JigsawError::Transport(_)));
        assert!(jigsaw_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::MalformedChallenge("return 1".into());
        let jigsaw_err: JigsawError = err.into();
        assert!(matches!(jigsaw_err, JigsawError::Protocol(_)));
        assert!(jigsaw_err.to_string().contains("return 1"));
    }

    #[test]
    fn test_from_session_error() {
        let jigsaw_err: JigsawError = SessionError::Closed.into();
        assert!(matches!(jigsaw_err, JigsawError::Session(_)));
        assert_eq!(jigsaw_err.to_string(), "session closed");
    }
}
