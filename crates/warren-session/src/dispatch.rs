//! The contract between a session and whatever interprets commands.
//!
//! The session never parses command text. It hands each line to a
//! [`Dispatcher`], which reads and writes entities, publishes events,
//! writes direct feedback through the session, and may solicit nested
//! input with [`Session::get_input`] (an editor, a menu).

use std::future::Future;

use warren_transport::Connection;

use crate::Session;

/// What the session loop should do after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Wait for the next command.
    Continue,
    /// End the session.
    Quit,
}

/// Interprets one line of player input.
///
/// Errors are shown to the issuing player and the session continues,
/// unless the session itself terminated during dispatch (for example,
/// the connection dropped while the dispatcher was waiting for nested
/// input).
pub trait Dispatcher<C: Connection>: Send + Sync {
    type Error: std::fmt::Display + Send;

    fn dispatch(
        &self,
        session: &mut Session<C>,
        line: &str,
    ) -> impl Future<Output = Result<Dispatch, Self::Error>> + Send;
}
