//! Unified error types for the server.

use warren_protocol::{Direction, ProtocolError};
use warren_session::SessionError;
use warren_store::StoreError;
use warren_transport::TransportError;
use warren_world::WorldError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates a `From` impl, so
/// `?` converts layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WarrenError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A connection-level failure from a transport whose error type is
    /// not [`TransportError`].
    #[error("connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    World(#[from] WorldError),
}

impl WarrenError {
    pub(crate) fn connection<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection(Box::new(e))
    }
}

/// Why a single command failed. Shown to the player who typed it; the
/// session carries on.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unrecognized command: {0}")]
    Unknown(String),

    /// Wrong arguments; the message is the usage line.
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a valid number.")]
    BadNumber(String),

    #[error("'{0}' is not a direction.")]
    BadDirection(String),

    #[error("There is no exit to the {0}.")]
    NoExit(Direction),

    #[error(transparent)]
    World(#[from] WorldError),

    /// The session ended while the command was running.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<ProtocolError> for CommandError {
    fn from(e: ProtocolError) -> Self {
        match e {
            ProtocolError::InvalidDirection(text) => Self::BadDirection(text),
            other => Self::Unknown(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let warren_err: WarrenError = err.into();
        assert!(matches!(warren_err, WarrenError::Transport(_)));
        assert!(warren_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_world_error() {
        let warren_err: WarrenError = WorldError::SelfTarget.into();
        assert!(matches!(warren_err, WarrenError::World(_)));
    }

    #[test]
    fn test_command_error_world_message_passes_through() {
        let err: CommandError = WorldError::NoExit(Direction::North).into();
        assert_eq!(err.to_string(), "You can't go that way.");
    }

    #[test]
    fn test_command_error_from_invalid_direction() {
        let err: CommandError =
            ProtocolError::InvalidDirection("sideways".into()).into();
        assert_eq!(err.to_string(), "'sideways' is not a direction.");
    }
}
