//! Error types for the session layer.
//!
//! Every variant here is fatal to the one session that hit it and to
//! nothing else.

/// Errors that end a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The peer closed the connection.
    #[error("connection closed by peer")]
    Disconnected,

    /// Reading from or writing to the connection failed.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The session was ended by a kill switch (or had already ended).
    #[error("session terminated: {0}")]
    Terminated(String),
}

impl SessionError {
    pub(crate) fn transport<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport(Box::new(e))
    }

    /// Whether the connection simply went away (as opposed to failing).
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnected)
    }
}
