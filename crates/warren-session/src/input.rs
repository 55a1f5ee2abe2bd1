//! The input reader task and its throttle.
//!
//! Each session owns one reader task. The session asks for a line by
//! sending an [`InputMode`]; the reader waits for the connection to
//! produce one, holds it back if it arrived too soon after the previous
//! accepted line, shapes it per the mode, and sends it back. Events never
//! pass through here, so throttling input never delays them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use warren_transport::Connection;

use crate::SessionError;

/// How a requested line is shaped before the caller sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Surrounding whitespace trimmed. For commands and menu choices.
    Clean,
    /// Exactly as typed, minus the line terminator. For free text such
    /// as a room description.
    Raw,
}

impl InputMode {
    pub(crate) fn apply(self, line: String) -> String {
        match self {
            Self::Clean => line.trim().to_string(),
            Self::Raw => line,
        }
    }
}

pub(crate) type InputResult = Result<String, SessionError>;

/// Serves input requests until the session goes away or the connection
/// fails. A failure is sent back once and ends the task.
pub(crate) async fn reader_loop<C: Connection>(
    conn: Arc<C>,
    command_delay: Duration,
    mut requests: mpsc::Receiver<InputMode>,
    lines: mpsc::Sender<InputResult>,
) {
    let mut last_accepted: Option<Instant> = None;

    while let Some(mode) = requests.recv().await {
        let result = match conn.read_line().await {
            Ok(Some(line)) => {
                if let Some(last) = last_accepted {
                    let elapsed = last.elapsed();
                    if elapsed < command_delay {
                        tokio::time::sleep(command_delay - elapsed).await;
                    }
                }
                last_accepted = Some(Instant::now());
                Ok(mode.apply(line))
            }
            Ok(None) => Err(SessionError::Disconnected),
            Err(e) => Err(SessionError::transport(e)),
        };

        let fatal = result.is_err();
        if lines.send(result).await.is_err() || fatal {
            break;
        }
    }
    tracing::trace!(conn = %conn.id(), "input reader stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_mode_trims_whitespace() {
        assert_eq!(InputMode::Clean.apply("  look  ".into()), "look");
    }

    #[test]
    fn test_raw_mode_keeps_whitespace() {
        assert_eq!(
            InputMode::Raw.apply("  a dim cellar ".into()),
            "  a dim cellar "
        );
    }
}
