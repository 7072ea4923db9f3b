//! Error types for the session layer.

use jigsaw_protocol::ProtocolError;
use jigsaw_transport::TransportError;

/// Errors that end a session or reject a command.
///
/// Every variant except [`Closed`](Self::Closed) is fatal: the session's
/// cancellation signal has fired and the socket is being torn down.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The initial connection to the gateway couldn't be established.
    /// No session exists.
    #[error("connect failed: {0}")]
    Connect(#[source] TransportError),

    /// Reading from or writing to the live socket failed, or the server
    /// closed it.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame didn't decode, the challenge was malformed, or the server
    /// version is not the expected one.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session is closed; the command was not queued.
    #[error("session closed")]
    Closed,

    /// A session task panicked or was aborted.
    #[error("session task failed: {0}")]
    Task(String),
}

impl SessionError {
    /// Returns `true` if the server announced an unexpected version.
    pub fn is_version_mismatch(&self) -> bool {
        matches!(
            self,
            Self::Protocol(ProtocolError::VersionMismatch { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_protocol_error() {
        let err: SessionError = ProtocolError::SetCount(2).into();
        assert!(matches!(err, SessionError::Protocol(_)));
        assert!(err.to_string().contains("set count 2"));
    }

    #[test]
    fn test_from_transport_error() {
        let err: SessionError =
            TransportError::ConnectionClosed("gone".into()).into();
        assert!(matches!(err, SessionError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_is_version_mismatch() {
        let err: SessionError = ProtocolError::VersionMismatch {
            found: "1.8.0".into(),
        }
        .into();
        assert!(err.is_version_mismatch());
        assert!(!SessionError::Closed.is_version_mismatch());
    }
}
