//! The session multiplexer.
//!
//! ```text
//!                 get_input()
//!   Processing ───────────────→ AwaitingInput(mode)
//!       ↑                          │   │    │
//!       │         line arrives ────┘   │    │ kill switch / EOF / error
//!       │                              │    ▼
//!       │          event arrives:      │  Terminated
//!       │          render + re-prompt ─┘  (subscription dropped)
//!       └──────── (stays AwaitingInput)
//! ```
//!
//! While awaiting input the session waits on three sources at once with
//! `tokio::select!`: the reader task (input), the bus subscription
//! (events), and the kill switch (fatal signal). An event is printed and
//! the prompt shown again, but it never counts as the answer to the
//! pending input request.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use warren_bus::Subscription;
use warren_protocol::{Event, RoomId};
use warren_transport::Connection;

use crate::input::{reader_loop, InputResult};
use crate::{
    render, Dispatch, Dispatcher, InputMode, SessionConfig, SessionError,
    Viewer,
};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Suspended until input, an event, or a fatal signal arrives.
    AwaitingInput(InputMode),
    /// Handling a line (or not yet waiting for one).
    Processing,
    /// Ended. The subscription is gone and no more input is read.
    Terminated,
}

/// Ends a session from outside: a duplicate login, an admin kick, a
/// server shutdown. Cloneable; triggering a session that already ended
/// does nothing.
#[derive(Debug, Clone)]
pub struct KillSwitch {
    tx: mpsc::UnboundedSender<String>,
}

impl KillSwitch {
    pub fn trigger(&self, reason: impl Into<String>) {
        let _ = self.tx.send(reason.into());
    }
}

/// One connected player's input loop.
pub struct Session<C: Connection> {
    conn: Arc<C>,
    config: SessionConfig,
    viewer: Viewer,
    state: SessionState,
    /// `None` once terminated.
    subscription: Option<Subscription>,
    requests: mpsc::Sender<InputMode>,
    lines: mpsc::Receiver<InputResult>,
    kill_tx: mpsc::UnboundedSender<String>,
    kill_rx: mpsc::UnboundedReceiver<String>,
    reader: JoinHandle<()>,
}

impl<C: Connection> Session<C> {
    /// Starts a session on `conn`, spawning its input reader.
    ///
    /// Register `subscription` before anything that should be seen
    /// happens: events broadcast earlier are not delivered.
    pub fn new(
        conn: Arc<C>,
        subscription: Subscription,
        viewer: Viewer,
        config: SessionConfig,
    ) -> Self {
        // Capacity 1 each way: there is never more than one outstanding
        // request.
        let (requests, request_rx) = mpsc::channel(1);
        let (line_tx, lines) = mpsc::channel(1);
        let (kill_tx, kill_rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(reader_loop(
            Arc::clone(&conn),
            config.command_delay,
            request_rx,
            line_tx,
        ));

        tracing::debug!(
            conn = %conn.id(),
            character = %viewer.character,
            "session started"
        );

        Self {
            conn,
            config,
            viewer,
            state: SessionState::Processing,
            subscription: Some(subscription),
            requests,
            lines,
            kill_tx,
            kill_rx,
            reader,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == SessionState::Terminated
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// Records the room the player is now in, so room-scoped events are
    /// rendered for the right place.
    pub fn set_room(&mut self, room: RoomId) {
        self.viewer.room = room;
    }

    pub fn connection(&self) -> &Arc<C> {
        &self.conn
    }

    pub fn kill_switch(&self) -> KillSwitch {
        KillSwitch {
            tx: self.kill_tx.clone(),
        }
    }

    /// Writes text as-is.
    pub async fn send_text(&self, text: &str) -> Result<(), SessionError> {
        self.conn
            .send_text(text)
            .await
            .map_err(SessionError::transport)
    }

    /// Writes text followed by a newline.
    pub async fn send_line(&self, line: &str) -> Result<(), SessionError> {
        self.send_text(&format!("{line}\n")).await
    }

    /// Shows `prompt` and waits for one line of input.
    ///
    /// Events arriving meanwhile are rendered and the prompt is shown
    /// again; the wait continues until a real line arrives.
    ///
    /// # Errors
    /// Any error means the session has terminated: the peer went away,
    /// the transport failed, or the kill switch was triggered.
    pub async fn get_input(
        &mut self,
        mode: InputMode,
        prompt: &str,
    ) -> Result<String, SessionError> {
        if self.is_terminated() {
            return Err(SessionError::Terminated("session already ended".into()));
        }

        self.send_text(prompt).await.inspect_err(|_| self.terminate())?;
        if self.requests.send(mode).await.is_err() {
            self.terminate();
            return Err(SessionError::Disconnected);
        }
        self.state = SessionState::AwaitingInput(mode);

        loop {
            tokio::select! {
                // Fatal signals win ties.
                biased;

                Some(reason) = self.kill_rx.recv() => {
                    self.terminate();
                    return Err(SessionError::Terminated(reason));
                }

                line = self.lines.recv() => {
                    return match line {
                        Some(Ok(line)) => {
                            self.state = SessionState::Processing;
                            Ok(line)
                        }
                        Some(Err(e)) => {
                            self.terminate();
                            Err(e)
                        }
                        None => {
                            self.terminate();
                            Err(SessionError::Disconnected)
                        }
                    };
                }

                Some(event) = next_event(&mut self.subscription) => {
                    self.show_event(&event, prompt).await?;
                }
            }
        }
    }

    async fn show_event(
        &mut self,
        event: &Event,
        prompt: &str,
    ) -> Result<(), SessionError> {
        let Some(message) = render(event, &self.viewer) else {
            return Ok(());
        };
        let text = format!("\n{message}\n{prompt}");
        self.send_text(&text).await.inspect_err(|_| self.terminate())
    }

    /// Runs the command loop until the player quits or the session dies.
    ///
    /// Dispatch errors are shown to the player and the loop continues.
    /// A clean disconnect or a quit returns `Ok`.
    pub async fn run<D>(&mut self, dispatcher: &D) -> Result<(), SessionError>
    where
        D: Dispatcher<C>,
    {
        loop {
            let prompt = self.config.prompt.clone();
            let line = match self.get_input(InputMode::Clean, &prompt).await {
                Ok(line) => line,
                Err(e) if e.is_disconnect() => return Ok(()),
                Err(e) => return Err(e),
            };

            match dispatcher.dispatch(self, &line).await {
                Ok(Dispatch::Continue) => {}
                Ok(Dispatch::Quit) => {
                    self.terminate();
                    return Ok(());
                }
                Err(e) => {
                    if self.is_terminated() {
                        tracing::debug!(error = %e, "session ended during dispatch");
                        return Ok(());
                    }
                    tracing::debug!(
                        character = %self.viewer.character,
                        error = %e,
                        "command failed"
                    );
                    self.send_line(&e.to_string()).await?;
                }
            }
        }
    }

    /// Moves to Terminated: drops the subscription (discarding anything
    /// still queued) and stops the input reader. Idempotent.
    pub fn terminate(&mut self) {
        if self.is_terminated() {
            return;
        }
        self.state = SessionState::Terminated;
        self.subscription = None;
        self.reader.abort();
        tracing::debug!(
            conn = %self.conn.id(),
            character = %self.viewer.character,
            "session terminated"
        );
    }
}

impl<C: Connection> Drop for Session<C> {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// The next event, or pending forever once the subscription is gone.
async fn next_event(subscription: &mut Option<Subscription>) -> Option<Event> {
    match subscription {
        Some(sub) => sub.recv().await,
        None => std::future::pending().await,
    }
}
