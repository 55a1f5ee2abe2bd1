//! Events published on the bus.
//!
//! An event is an immutable fact about something that already happened:
//! "room R-3's east exit was locked", "C-7 said hello". Events carry
//! enough identity (room ids, character ids, display names) for a
//! subscriber to decide relevance and render a message without touching
//! the entity store.

use serde::{Deserialize, Serialize};

use crate::{CharacterId, Direction, RoomId};

/// Who a chat message is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatScope {
    /// Everyone online.
    Broadcast,
    /// Everyone in the given room.
    Say(RoomId),
    /// An action performed in the given room (`/me waves`).
    Emote(RoomId),
    /// A single character.
    Tell(CharacterId),
}

/// A notification delivered to every subscription on the bus.
///
/// `#[serde(tag = "type")]` makes the JSON form `{"type": "Lock", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A room's title, description, exits, or items changed.
    RoomUpdate { room_id: RoomId },

    /// One side of an exit was locked or unlocked.
    Lock {
        room_id: RoomId,
        direction: Direction,
        locked: bool,
    },

    /// Something was said.
    Chat {
        scope: ChatScope,
        from: CharacterId,
        from_name: String,
        message: String,
    },

    /// A character arrived in a room. `from` is the direction they came
    /// from, `None` for teleports and logins.
    Enter {
        character: CharacterId,
        name: String,
        room_id: RoomId,
        from: Option<Direction>,
    },

    /// A character left a room. `to` is the direction they went.
    Leave {
        character: CharacterId,
        name: String,
        room_id: RoomId,
        to: Option<Direction>,
    },

    /// A character came online.
    Login { character: CharacterId, name: String },

    /// A character went offline.
    Logout { character: CharacterId, name: String },

    /// A fight began.
    CombatStart {
        attacker: CharacterId,
        attacker_name: String,
        defender: CharacterId,
        defender_name: String,
    },

    /// A fight ended.
    CombatStop {
        attacker: CharacterId,
        attacker_name: String,
        defender: CharacterId,
        defender_name: String,
    },
}

impl Event {
    /// The room this event is scoped to, if any.
    ///
    /// Subscribers use this to skip events about rooms they aren't in.
    pub fn room_id(&self) -> Option<RoomId> {
        match self {
            Self::RoomUpdate { room_id }
            | Self::Lock { room_id, .. }
            | Self::Enter { room_id, .. }
            | Self::Leave { room_id, .. } => Some(*room_id),
            Self::Chat {
                scope: ChatScope::Say(room_id) | ChatScope::Emote(room_id),
                ..
            } => Some(*room_id),
            _ => None,
        }
    }

    /// The character whose action produced this event, if any.
    pub fn actor(&self) -> Option<CharacterId> {
        match self {
            Self::Chat { from, .. } => Some(*from),
            Self::Enter { character, .. }
            | Self::Leave { character, .. }
            | Self::Login { character, .. }
            | Self::Logout { character, .. } => Some(*character),
            Self::CombatStart { attacker, .. }
            | Self::CombatStop { attacker, .. } => Some(*attacker),
            Self::RoomUpdate { .. } | Self::Lock { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_for_room_scoped_events() {
        let lock = Event::Lock {
            room_id: RoomId(1),
            direction: Direction::North,
            locked: true,
        };
        assert_eq!(lock.room_id(), Some(RoomId(1)));

        let say = Event::Chat {
            scope: ChatScope::Say(RoomId(2)),
            from: CharacterId(9),
            from_name: "Ada".into(),
            message: "hi".into(),
        };
        assert_eq!(say.room_id(), Some(RoomId(2)));
    }

    #[test]
    fn test_room_id_none_for_global_events() {
        let shout = Event::Chat {
            scope: ChatScope::Broadcast,
            from: CharacterId(9),
            from_name: "Ada".into(),
            message: "hi".into(),
        };
        assert_eq!(shout.room_id(), None);
        assert_eq!(shout.actor(), Some(CharacterId(9)));
    }
}
