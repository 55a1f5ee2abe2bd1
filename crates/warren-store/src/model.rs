//! Entity records.
//!
//! These are plain data: every field is typed, and nothing here takes a
//! lock. Shared instances live inside [`Guarded`](crate::Guarded), which
//! is the only way other sessions ever see them. The helper methods on
//! each record are meant to be called from inside a `read`/`write`
//! closure.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use warren_protocol::{
    CharacterId, Coordinate, Direction, EntityKind, ItemId, RoomId, UserId,
    ZoneId,
};

/// A record the store can index and persist.
pub trait Entity:
    Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    /// The typed id for this kind.
    type Id: Copy + Eq + Ord + Hash + fmt::Display + Send + Sync + 'static;

    /// Which persistence namespace records of this type live in.
    const KIND: EntityKind;

    fn id(&self) -> Self::Id;

    /// The raw number behind a typed id.
    fn raw_id(id: Self::Id) -> u64;
}

macro_rules! impl_entity {
    ($ty:ty, $id:ty, $kind:expr) => {
        impl Entity for $ty {
            type Id = $id;
            const KIND: EntityKind = $kind;

            fn id(&self) -> $id {
                self.id
            }

            fn raw_id(id: $id) -> u64 {
                id.0
            }
        }
    };
}

/// An entity with a display name.
pub trait Named: Entity {
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
}

macro_rules! impl_named {
    ($($ty:ty),*) => {$(
        impl Named for $ty {
            fn name(&self) -> &str {
                &self.name
            }

            fn set_name(&mut self, name: String) {
                self.name = name;
            }
        }
    )*};
}

impl_named!(User, Zone, Character, Item);

impl_entity!(User, UserId, EntityKind::User);
impl_entity!(Zone, ZoneId, EntityKind::Zone);
impl_entity!(Room, RoomId, EntityKind::Room);
impl_entity!(Character, CharacterId, EntityKind::Character);
impl_entity!(Item, ItemId, EntityKind::Item);

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Whether and how a user's client renders ANSI color.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[default]
    None,
    Light,
    Dark,
}

/// A login account. One user plays one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub color_mode: ColorMode,
    /// Runtime presence. Never persisted: everyone is offline after a
    /// restart.
    #[serde(skip)]
    pub online: bool,
}

// ---------------------------------------------------------------------------
// Zone
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

pub const DEFAULT_ROOM_TITLE: &str = "The Void";
pub const DEFAULT_ROOM_DESCRIPTION: &str = "You are floating in the \
    blackness of space. Complete darkness surrounds you in all \
    directions. There is no escape, there is no hope, just the \
    emptiness. You are likely to be eaten by a grue.";

/// One side of a connection between two rooms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct Exit {
    pub open: bool,
    pub locked: bool,
}

/// A single location. `zone_id` of `None` is the null zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub zone_id: Option<ZoneId>,
    pub title: String,
    pub description: String,
    pub location: Coordinate,
    #[serde(default, with = "exit_list")]
    pub exits: BTreeMap<Direction, Exit>,
    #[serde(default)]
    pub items: Vec<ItemId>,
}

impl Room {
    pub fn new(id: RoomId, zone_id: Option<ZoneId>, location: Coordinate) -> Self {
        Self {
            id,
            zone_id,
            title: DEFAULT_ROOM_TITLE.to_string(),
            description: DEFAULT_ROOM_DESCRIPTION.to_string(),
            location,
            exits: BTreeMap::new(),
            items: Vec::new(),
        }
    }

    /// The exit record for `dir`; a closed, unlocked exit if none was
    /// ever set.
    pub fn exit(&self, dir: Direction) -> Exit {
        self.exits.get(&dir).copied().unwrap_or_default()
    }

    pub fn has_exit(&self, dir: Direction) -> bool {
        self.exit(dir).open
    }

    /// Open exits in compass order.
    pub fn open_exits(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|dir| self.has_exit(*dir))
            .collect()
    }

    pub fn set_exit_enabled(&mut self, dir: Direction, open: bool) {
        self.exits.entry(dir).or_default().open = open;
    }

    /// Sets the lock flag whether or not the exit is open.
    pub fn set_exit_locked(&mut self, dir: Direction, locked: bool) {
        self.exits.entry(dir).or_default().locked = locked;
    }

    pub fn add_item(&mut self, item: ItemId) {
        if !self.items.contains(&item) {
            self.items.push(item);
        }
    }

    /// Returns whether the item was here.
    pub fn remove_item(&mut self, item: ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|id| *id != item);
        self.items.len() != before
    }
}

/// Serializes the exit map as a list of `[direction, exit]` pairs.
///
/// JSON object keys must be strings, so a map keyed by an enum is
/// written as a sequence instead.
mod exit_list {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};
    use warren_protocol::Direction;

    use super::Exit;

    pub fn serialize<S: Serializer>(
        exits: &BTreeMap<Direction, Exit>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(exits.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Direction, Exit>, D::Error> {
        let pairs = Vec::<(Direction, Exit)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Character
// ---------------------------------------------------------------------------

pub const DEFAULT_HITPOINTS: u32 = 100;
pub const DEFAULT_CAPACITY: u64 = 50;

/// A player character (has a user) or an NPC (doesn't).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub room_id: RoomId,
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub items: Vec<ItemId>,
    #[serde(default)]
    pub cash: u64,
    #[serde(default)]
    pub capacity: u64,
    #[serde(default)]
    pub weight: u64,
    pub hitpoints: u32,
    /// What an NPC says when talked to. Unused for players.
    #[serde(default)]
    pub conversation: String,
    #[serde(skip)]
    pub online: bool,
}

impl Character {
    pub fn new(
        id: CharacterId,
        name: String,
        room_id: RoomId,
        user_id: Option<UserId>,
    ) -> Self {
        Self {
            id,
            name,
            room_id,
            user_id,
            items: Vec::new(),
            cash: 0,
            capacity: DEFAULT_CAPACITY,
            weight: 0,
            hitpoints: DEFAULT_HITPOINTS,
            conversation: String::new(),
            online: false,
        }
    }

    pub fn is_npc(&self) -> bool {
        self.user_id.is_none()
    }

    /// Whether `weight` more fits under the carrying capacity.
    pub fn can_carry(&self, weight: u64) -> bool {
        self.weight.saturating_add(weight) <= self.capacity
    }

    pub fn add_item(&mut self, item: ItemId) {
        if !self.items.contains(&item) {
            self.items.push(item);
        }
    }

    pub fn remove_item(&mut self, item: ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|id| *id != item);
        self.items.len() != before
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    /// Free-form attributes builders attach (`"material": "oak"`).
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// Weight of an item with no usable `weight` property.
pub const DEFAULT_ITEM_WEIGHT: u64 = 1;

impl Item {
    /// The `weight` property, or [`DEFAULT_ITEM_WEIGHT`].
    pub fn weight(&self) -> u64 {
        self.properties
            .get("weight")
            .and_then(|w| w.parse().ok())
            .unwrap_or(DEFAULT_ITEM_WEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_exit_defaults_to_closed() {
        let room = Room::new(RoomId(1), None, Coordinate::default());
        assert_eq!(room.exit(Direction::North), Exit::default());
        assert!(room.open_exits().is_empty());
    }

    #[test]
    fn test_room_lock_without_open_exit_keeps_it_closed() {
        let mut room = Room::new(RoomId(1), None, Coordinate::default());
        room.set_exit_locked(Direction::East, true);
        assert_eq!(
            room.exit(Direction::East),
            Exit { open: false, locked: true }
        );
    }

    #[test]
    fn test_room_open_exits_in_compass_order() {
        let mut room = Room::new(RoomId(1), None, Coordinate::default());
        room.set_exit_enabled(Direction::Down, true);
        room.set_exit_enabled(Direction::North, true);
        room.set_exit_enabled(Direction::West, true);
        assert_eq!(
            room.open_exits(),
            vec![Direction::North, Direction::West, Direction::Down]
        );
    }

    #[test]
    fn test_room_remove_item_keeps_order_of_others() {
        let mut room = Room::new(RoomId(1), None, Coordinate::default());
        room.add_item(ItemId(1));
        room.add_item(ItemId(2));
        room.add_item(ItemId(3));
        assert!(room.remove_item(ItemId(2)));
        assert!(!room.remove_item(ItemId(2)));
        assert_eq!(room.items, vec![ItemId(1), ItemId(3)]);
    }

    #[test]
    fn test_room_exits_serialize_as_pairs() {
        let mut room = Room::new(RoomId(1), None, Coordinate::default());
        room.set_exit_enabled(Direction::NorthEast, true);
        let json = serde_json::to_value(&room).unwrap();
        assert_eq!(
            json["exits"],
            serde_json::json!([["north_east", {"open": true, "locked": false}]])
        );

        let back: Room = serde_json::from_value(json).unwrap();
        assert_eq!(back, room);
    }

    #[test]
    fn test_user_online_is_not_persisted() {
        let user = User {
            id: UserId(1),
            name: "ada".into(),
            color_mode: ColorMode::None,
            online: true,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("online").is_none());
        let back: User = serde_json::from_value(json).unwrap();
        assert!(!back.online);
    }

    #[test]
    fn test_item_weight_reads_property_or_defaults() {
        let mut item = Item {
            id: ItemId(1),
            name: "anvil".into(),
            properties: BTreeMap::new(),
        };
        assert_eq!(item.weight(), DEFAULT_ITEM_WEIGHT);
        item.properties.insert("weight".into(), "30".into());
        assert_eq!(item.weight(), 30);
        item.properties.insert("weight".into(), "heavy".into());
        assert_eq!(item.weight(), DEFAULT_ITEM_WEIGHT);
    }

    #[test]
    fn test_character_can_carry_up_to_capacity() {
        let mut ada = Character::new(CharacterId(1), "Ada".into(), RoomId(1), None);
        ada.capacity = 10;
        ada.weight = 7;
        assert!(ada.can_carry(3));
        assert!(!ada.can_carry(4));
    }
}
