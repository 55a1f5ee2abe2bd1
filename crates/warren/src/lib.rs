//! # Warren
//!
//! A text-based multiplayer world server. Players connect over TCP (or
//! WebSocket), pick a name, and walk a shared map of rooms that builders
//! extend from inside the game.
//!
//! This crate ties the layers together:
//!
//! ```text
//! WarrenServer       accept loop, one task per connection
//!   └─ handler       login, presence, duplicate-login refusal
//!        └─ Session  (warren-session) input/event multiplexing
//!             └─ CommandDispatcher   text commands → World operations
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use warren::WarrenServer;
//!
//! # async fn start() -> Result<(), warren::WarrenError> {
//! let server = WarrenServer::builder()
//!     .bind("127.0.0.1:4000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod builder;
mod color;
mod commands;
mod error;
mod handler;
mod server;
mod view;

pub use commands::CommandDispatcher;
pub use error::{CommandError, WarrenError};
pub use server::{ServerHandle, WarrenServer, WarrenServerBuilder};

/// Re-exports for embedding the server or driving it from tests.
pub mod prelude {
    pub use crate::{
        CommandDispatcher, CommandError, ServerHandle, WarrenError,
        WarrenServer, WarrenServerBuilder,
    };
    pub use warren_session::SessionConfig;
    pub use warren_store::{JsonFilePersistence, MemoryPersistence, Persistence};
    pub use warren_world::World;
}
