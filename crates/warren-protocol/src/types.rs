//! Identity and geometry types.
//!
//! Identifiers are "newtype wrappers" around `u64`: you can't pass a
//! `RoomId` where an `ItemId` is expected, even though both are numbers
//! underneath. `#[serde(transparent)]` keeps them as plain numbers in
//! persisted records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Declares a `u64` newtype id with a short display prefix.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// A connecting account.
    UserId, "U"
);
entity_id!(
    /// A grouping of rooms.
    ZoneId, "Z"
);
entity_id!(
    /// A single location in the world.
    RoomId, "R"
);
entity_id!(
    /// A player character or NPC.
    CharacterId, "C"
);
entity_id!(
    /// An object that lives in a room or a character's inventory.
    ItemId, "I"
);

/// The kind of a persisted entity. Used by the persistence layer to keep
/// each kind in its own namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Zone,
    Room,
    Character,
    Item,
}

impl EntityKind {
    /// Every kind, in load order (zones before the rooms that reference
    /// them, rooms before the characters standing in them).
    pub const ALL: [EntityKind; 5] = [
        EntityKind::User,
        EntityKind::Zone,
        EntityKind::Room,
        EntityKind::Item,
        EntityKind::Character,
    ];

    /// Lowercase name, used for directory names and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Zone => "zone",
            Self::Room => "room",
            Self::Character => "character",
            Self::Item => "item",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the ten exit directions a room can have.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    Up,
    Down,
}

impl Direction {
    /// All directions in display order (clockwise compass, then up/down).
    pub const ALL: [Direction; 10] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::Up,
        Direction::Down,
    ];

    /// The direction pointing back the way you came.
    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::NorthEast => Self::SouthWest,
            Self::East => Self::West,
            Self::SouthEast => Self::NorthWest,
            Self::South => Self::North,
            Self::SouthWest => Self::NorthEast,
            Self::West => Self::East,
            Self::NorthWest => Self::SouthEast,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// The unit step `(dx, dy, dz)` for this direction.
    ///
    /// Screen orientation: north is `y - 1`, east is `x + 1`. Up is
    /// `z - 1` so that deeper levels have larger `z`.
    pub fn step(self) -> (i64, i64, i64) {
        match self {
            Self::North => (0, -1, 0),
            Self::NorthEast => (1, -1, 0),
            Self::East => (1, 0, 0),
            Self::SouthEast => (1, 1, 0),
            Self::South => (0, 1, 0),
            Self::SouthWest => (-1, 1, 0),
            Self::West => (-1, 0, 0),
            Self::NorthWest => (-1, -1, 0),
            Self::Up => (0, 0, -1),
            Self::Down => (0, 0, 1),
        }
    }

    /// The short command form (`n`, `ne`, ..., `u`, `d`).
    pub fn short(self) -> &'static str {
        match self {
            Self::North => "n",
            Self::NorthEast => "ne",
            Self::East => "e",
            Self::SouthEast => "se",
            Self::South => "s",
            Self::SouthWest => "sw",
            Self::West => "w",
            Self::NorthWest => "nw",
            Self::Up => "u",
            Self::Down => "d",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::North => "north",
            Self::NorthEast => "north east",
            Self::East => "east",
            Self::SouthEast => "south east",
            Self::South => "south",
            Self::SouthWest => "south west",
            Self::West => "west",
            Self::NorthWest => "north west",
            Self::Up => "up",
            Self::Down => "down",
        };
        f.write_str(name)
    }
}

impl FromStr for Direction {
    type Err = ProtocolError;

    /// Parses short (`ne`) or long (`northeast`, `north_east`) names,
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        let dir = match normalized.as_str() {
            "n" | "north" => Self::North,
            "ne" | "northeast" => Self::NorthEast,
            "e" | "east" => Self::East,
            "se" | "southeast" => Self::SouthEast,
            "s" | "south" => Self::South,
            "sw" | "southwest" => Self::SouthWest,
            "w" | "west" => Self::West,
            "nw" | "northwest" => Self::NorthWest,
            "u" | "up" => Self::Up,
            "d" | "down" => Self::Down,
            _ => return Err(ProtocolError::InvalidDirection(s.to_string())),
        };
        Ok(dir)
    }
}

// ---------------------------------------------------------------------------
// Coordinate
// ---------------------------------------------------------------------------

/// A room's position inside its zone.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub struct Coordinate {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Coordinate {
    pub fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// The neighboring coordinate one step in `direction`.
    pub fn next(self, direction: Direction) -> Self {
        let (dx, dy, dz) = direction.step();
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_room_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&RoomId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_id_display_uses_kind_prefix() {
        assert_eq!(RoomId(7).to_string(), "R-7");
        assert_eq!(CharacterId(7).to_string(), "C-7");
        assert_eq!(ItemId(1).to_string(), "I-1");
    }

    // =====================================================================
    // Direction
    // =====================================================================

    #[test]
    fn test_direction_opposite_is_involution() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir, "{dir}");
            assert_ne!(dir.opposite(), dir);
        }
    }

    #[test]
    fn test_direction_step_of_opposite_cancels() {
        let origin = Coordinate::default();
        for dir in Direction::ALL {
            assert_eq!(origin.next(dir).next(dir.opposite()), origin, "{dir}");
        }
    }

    #[test]
    fn test_direction_parse_short_and_long_forms() {
        assert_eq!("n".parse::<Direction>().unwrap(), Direction::North);
        assert_eq!("North".parse::<Direction>().unwrap(), Direction::North);
        assert_eq!("ne".parse::<Direction>().unwrap(), Direction::NorthEast);
        assert_eq!(
            "north east".parse::<Direction>().unwrap(),
            Direction::NorthEast
        );
        assert_eq!("D".parse::<Direction>().unwrap(), Direction::Down);
    }

    #[test]
    fn test_direction_parse_rejects_unknown() {
        let result = "sideways".parse::<Direction>();
        assert!(matches!(result, Err(ProtocolError::InvalidDirection(s)) if s == "sideways"));
    }

    #[test]
    fn test_direction_short_round_trips_through_parse() {
        for dir in Direction::ALL {
            assert_eq!(dir.short().parse::<Direction>().unwrap(), dir);
        }
    }

    // =====================================================================
    // Coordinate
    // =====================================================================

    #[test]
    fn test_coordinate_next_north_decrements_y() {
        let here = Coordinate::new(0, 0, 0);
        assert_eq!(here.next(Direction::North), Coordinate::new(0, -1, 0));
        assert_eq!(here.next(Direction::SouthEast), Coordinate::new(1, 1, 0));
        assert_eq!(here.next(Direction::Up), Coordinate::new(0, 0, -1));
    }

    #[test]
    fn test_coordinate_display() {
        assert_eq!(Coordinate::new(1, -2, 3).to_string(), "(1, -2, 3)");
    }
}
