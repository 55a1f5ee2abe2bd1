//! Error types for world operations.
//!
//! Everything here is reported to the player who issued the command and
//! changes nothing. The `Display` text is written to be shown to them
//! as-is.

use warren_protocol::{Direction, RoomId};
use warren_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    // -- Not found --------------------------------------------------------
    #[error("Room {0} not found.")]
    RoomNotFound(RoomId),

    #[error("No one named '{0}' exists.")]
    CharacterNotFound(String),

    #[error("There is no {0} here.")]
    ItemNotFound(String),

    #[error("You are not carrying a {0}.")]
    NotCarrying(String),

    #[error("Zone '{0}' not found.")]
    ZoneNotFound(String),

    #[error("There is no room to the {0}.")]
    NoRoomThere(Direction),

    // -- Validation -------------------------------------------------------
    #[error("You can't go that way.")]
    NoExit(Direction),

    #[error("The {0} exit is locked.")]
    ExitLocked(Direction),

    #[error("{0} is not online.")]
    NotOnline(String),

    #[error("{0} is not here.")]
    NotHere(String),

    #[error("You can't attack yourself.")]
    SelfTarget,

    #[error("{0} is already dead.")]
    TargetDead(String),

    #[error("You aren't fighting anyone.")]
    NotFighting,

    #[error("Nothing to say.")]
    EmptyMessage,

    #[error("You're already in that zone.")]
    AlreadyInZone,

    #[error("Someone is still in that room.")]
    RoomOccupied(RoomId),

    #[error("The {0} is too heavy to carry.")]
    TooHeavy(String),

    #[error("{0} is not an NPC.")]
    NotAnNpc(String),

    /// Store-level failures: name or location collisions, empty names,
    /// insufficient cash.
    #[error(transparent)]
    Store(#[from] StoreError),
}
