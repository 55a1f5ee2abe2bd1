//! Player sessions for Warren.
//!
//! A [`Session`] gives each connection the illusion of a simple blocking
//! "read a line, handle it" loop, while events from other players keep
//! arriving and get printed in between.
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (above)   ← builds a Session per login, supplies a Dispatcher
//!     ↕
//! Session (this crate)  ← input/event multiplexing, throttling, rendering
//!     ↕
//! Transport + Bus (below)  ← lines in/out, events in
//! ```

mod config;
mod dispatch;
mod error;
mod input;
mod render;
mod session;

pub use config::SessionConfig;
pub use dispatch::{Dispatch, Dispatcher};
pub use error::SessionError;
pub use input::InputMode;
pub use render::{render, Viewer};
pub use session::{KillSwitch, Session, SessionState};
