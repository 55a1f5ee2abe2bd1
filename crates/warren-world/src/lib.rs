//! The shared world that every session acts on.
//!
//! A [`World`] bundles the [`EntityStore`](warren_store::EntityStore)
//! and the [`EventBus`](warren_bus::EventBus) and offers the operations
//! commands are built from. Each operation follows the same shape:
//! validate, mutate entities one at a time through their own locks, then
//! broadcast what changed so other sessions can react.
//!
//! The operations are grouped by topic, one `impl World` block per file:
//!
//! - `exits`: opening, closing, locking, and auditing exits
//! - `movement`: walking, teleporting, digging, deleting rooms
//! - `items`: creating, destroying, and moving items
//! - `chat`: say, emote, broadcast, tell
//! - `zones`: creating and renaming zones
//! - `combat`: the fight registry
//! - `npcs`: creating, renaming, and talking to NPCs
//! - `map`: rooms inside a box of coordinates
//! - `world`: lookups, presence, preferences, and room views

mod chat;
mod combat;
mod error;
mod exits;
mod items;
mod map;
mod movement;
mod npcs;
mod world;
mod zones;

pub use error::WorldError;
pub use exits::LockAnomaly;
pub use map::{MapRoom, MapView};
pub use world::{RoomView, World, START_LOCATION};
