//! Turning events into the text one particular player sees.
//!
//! Every session gets every event; most of them are about somebody else
//! somewhere else. [`render`] decides, for one viewer, whether an event
//! is worth a line of output and what that line says. Players are told
//! about their own actions directly by the dispatcher, so events they
//! caused render as nothing.

use warren_protocol::{CharacterId, ChatScope, Event, RoomId};

/// Who is looking, and from where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub character: CharacterId,
    pub room: RoomId,
}

/// The message `viewer` should see for `event`, or `None` to stay quiet.
pub fn render(event: &Event, viewer: &Viewer) -> Option<String> {
    if event.actor() == Some(viewer.character) {
        return None;
    }
    let here = |room: &RoomId| *room == viewer.room;

    match event {
        Event::RoomUpdate { .. } => None,

        Event::Lock {
            room_id,
            direction,
            locked,
        } if here(room_id) => {
            let state = if *locked { "locked" } else { "unlocked" };
            Some(format!("The {direction} exit has been {state}."))
        }

        Event::Chat {
            scope,
            from_name,
            message,
            ..
        } => match scope {
            ChatScope::Broadcast => {
                Some(format!("{from_name} broadcasts: {message}"))
            }
            ChatScope::Say(room) if here(room) => {
                Some(format!("{from_name} says: {message}"))
            }
            ChatScope::Emote(room) if here(room) => {
                Some(format!("{from_name} {message}"))
            }
            ChatScope::Tell(target) if *target == viewer.character => {
                Some(format!("{from_name} tells you: {message}"))
            }
            _ => None,
        },

        Event::Enter {
            name, room_id, from, ..
        } if here(room_id) => Some(match from {
            Some(dir) => format!("{name} arrives from the {dir}."),
            None => format!("{name} appears."),
        }),

        Event::Leave {
            name, room_id, to, ..
        } if here(room_id) => Some(match to {
            Some(dir) => format!("{name} leaves {dir}."),
            None => format!("{name} vanishes."),
        }),

        Event::Login { name, .. } => Some(format!("{name} has connected.")),
        Event::Logout { name, .. } => {
            Some(format!("{name} has disconnected."))
        }

        Event::CombatStart {
            attacker_name,
            defender,
            ..
        } if *defender == viewer.character => {
            Some(format!("{attacker_name} attacks you!"))
        }

        Event::CombatStop {
            attacker_name,
            defender,
            ..
        } if *defender == viewer.character => {
            Some(format!("{attacker_name} stops attacking you."))
        }

        _ => None,
    }
}
