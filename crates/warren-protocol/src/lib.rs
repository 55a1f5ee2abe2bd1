//! Shared vocabulary for Warren.
//!
//! Every other crate in the workspace speaks in terms of the types
//! defined here:
//!
//! - **Identifiers** ([`RoomId`], [`CharacterId`], ...): typed handles
//!   for every kind of persistent entity.
//! - **Geometry** ([`Coordinate`], [`Direction`]): where rooms sit and
//!   how exits connect them.
//! - **Events** ([`Event`], [`ChatScope`]): the immutable notifications
//!   that travel over the event bus.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how records are turned
//!   into bytes for persistence.
//!
//! # Architecture
//!
//! This crate knows nothing about locks, sessions, or connections. It
//! only defines data and how to (de)serialize it.
//!
//! ```text
//! Store / Bus / Session / World  →  Protocol (ids, geometry, events)
//! ```

mod codec;
mod error;
mod event;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use event::{ChatScope, Event};
pub use types::{
    CharacterId, Coordinate, Direction, EntityKind, ItemId, RoomId, UserId,
    ZoneId,
};
