use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use warren_bus::EventBus;
use warren_protocol::{CharacterId, Coordinate, Direction, Event, RoomId};
use warren_store::{
    Character, ColorMode, Container, EntityStore, Guarded, Room, StoreError,
};

use crate::WorldError;

/// Where new characters start: the origin of the null zone.
pub const START_LOCATION: Coordinate = Coordinate { x: 0, y: 0, z: 0 };

/// The store and the bus, plus the runtime-only fight registry.
///
/// Cloning is cheap; clones share everything.
#[derive(Clone)]
pub struct World {
    store: Arc<EntityStore>,
    bus: EventBus,
    /// attacker -> defender
    pub(crate) fights: Arc<Mutex<HashMap<CharacterId, CharacterId>>>,
}

/// Everything a player sees when looking at a room, copied out of the
/// entities so no lock is held while it is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomView {
    pub id: RoomId,
    pub title: String,
    pub description: String,
    pub location: Coordinate,
    pub exits: Vec<Direction>,
    /// Other online players in the room.
    pub players: Vec<String>,
    pub npcs: Vec<String>,
    pub items: Vec<String>,
}

impl World {
    pub fn new(store: Arc<EntityStore>, bus: EventBus) -> Self {
        Self {
            store,
            bus,
            fights: Arc::default(),
        }
    }

    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub(crate) fn publish(&self, event: Event) {
        let delivered = self.bus.broadcast(event);
        tracing::trace!(delivered, "event published");
    }

    /// The room at [`START_LOCATION`], created on first use.
    pub fn start_room(&self) -> Result<Arc<Guarded<Room>>, WorldError> {
        if let Some(room) = self.store.room_by_location(START_LOCATION, None) {
            return Ok(room);
        }
        match self.store.create_room(None, START_LOCATION) {
            Ok(room) => Ok(room),
            // Someone else created it first.
            Err(e @ StoreError::LocationTaken { .. }) => self
                .store
                .room_by_location(START_LOCATION, None)
                .ok_or(WorldError::from(e)),
            Err(e) => Err(e.into()),
        }
    }

    // -- Lookups ---------------------------------------------------------

    pub fn room(&self, id: RoomId) -> Result<Arc<Guarded<Room>>, WorldError> {
        self.store.get_room(id).ok_or(WorldError::RoomNotFound(id))
    }

    pub fn character(
        &self,
        id: CharacterId,
    ) -> Result<Arc<Guarded<Character>>, WorldError> {
        self.store
            .get_character(id)
            .ok_or_else(|| WorldError::CharacterNotFound(id.to_string()))
    }

    pub fn character_named(
        &self,
        name: &str,
    ) -> Result<Arc<Guarded<Character>>, WorldError> {
        self.store
            .character_by_name(name)
            .ok_or_else(|| WorldError::CharacterNotFound(name.to_string()))
    }

    /// The room `character` is standing in.
    ///
    /// A character whose room no longer exists is moved to the start room
    /// and that room is returned.
    pub fn room_of(
        &self,
        character: CharacterId,
    ) -> Result<Arc<Guarded<Room>>, WorldError> {
        let handle = self.character(character)?;
        let room_id = handle.read(|c| c.room_id);
        if let Some(room) = self.store.get_room(room_id) {
            return Ok(room);
        }

        let start = self.start_room()?;
        let (name, moved) = handle.write(|c| {
            // Someone else may have rescued it already.
            let moved = c.room_id == room_id;
            if moved {
                c.room_id = start.id();
            }
            (c.name.clone(), moved)
        });
        if moved {
            tracing::warn!(
                %character,
                missing = %room_id,
                start = %start.id(),
                "character stood in a missing room, moved to start"
            );
            self.publish(Event::Enter {
                character,
                name,
                room_id: start.id(),
                from: None,
            });
            return Ok(start);
        }
        let room_id = handle.read(|c| c.room_id);
        self.room(room_id)
    }

    /// The room one step from `room` towards `dir`, if there is one.
    pub fn neighbor(
        &self,
        room: &Guarded<Room>,
        dir: Direction,
    ) -> Option<Arc<Guarded<Room>>> {
        let (zone_id, location) = room.read(|r| (r.zone_id, r.location));
        self.store.room_by_location(location.next(dir), zone_id)
    }

    // -- Presence --------------------------------------------------------

    /// Marks a character and its user online and announces it.
    pub fn login(&self, character: CharacterId) -> Result<(), WorldError> {
        let character = self.character(character)?;
        let (name, user_id) = character.write(|c| {
            c.online = true;
            (c.name.clone(), c.user_id)
        });
        if let Some(user) = user_id.and_then(|id| self.store.get_user(id)) {
            user.write(|u| u.online = true);
        }
        tracing::info!(character = %character.id(), %name, "character online");
        self.publish(Event::Login {
            character: character.id(),
            name,
        });
        Ok(())
    }

    /// Marks a character and its user offline, ends any fight it is part
    /// of, and announces it.
    pub fn logout(&self, character: CharacterId) -> Result<(), WorldError> {
        let character = self.character(character)?;
        let (name, user_id) = character.write(|c| {
            c.online = false;
            (c.name.clone(), c.user_id)
        });
        if let Some(user) = user_id.and_then(|id| self.store.get_user(id)) {
            user.write(|u| u.online = false);
        }
        self.forget_fights(character.id());
        tracing::info!(character = %character.id(), %name, "character offline");
        self.publish(Event::Logout {
            character: character.id(),
            name,
        });
        Ok(())
    }

    /// Names of online characters, alphabetically.
    pub fn who(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .store
            .online_characters()
            .iter()
            .map(|c| c.read(|c| c.name.clone()))
            .collect();
        names.sort_by_key(|name| name.to_lowercase());
        names
    }

    // -- Preferences -----------------------------------------------------

    /// How text is colored for the user playing `character`. NPCs and
    /// characters without a user get no color.
    pub fn color_mode(&self, character: CharacterId) -> Result<ColorMode, WorldError> {
        let user_id = self.character(character)?.read(|c| c.user_id);
        Ok(user_id
            .and_then(|id| self.store.get_user(id))
            .map(|user| user.read(|u| u.color_mode))
            .unwrap_or_default())
    }

    pub fn set_color_mode(
        &self,
        character: CharacterId,
        mode: ColorMode,
    ) -> Result<(), WorldError> {
        let handle = self.character(character)?;
        let (user_id, name) = handle.read(|c| (c.user_id, c.name.clone()));
        let user = user_id
            .and_then(|id| self.store.get_user(id))
            .ok_or(WorldError::NotOnline(name))?;
        user.write(|u| u.color_mode = mode);
        Ok(())
    }

    // -- Views -----------------------------------------------------------

    /// What `viewer` sees in `room_id`. The viewer is left out of the
    /// occupant lists.
    pub fn room_view(
        &self,
        room_id: RoomId,
        viewer: CharacterId,
    ) -> Result<RoomView, WorldError> {
        let room = self.room(room_id)?.snapshot();

        let mut players = Vec::new();
        let mut npcs = Vec::new();
        for occupant in self.store.characters_in_room(room_id) {
            if occupant.id() == viewer {
                continue;
            }
            occupant.read(|c| {
                if c.is_npc() {
                    npcs.push(c.name.clone());
                } else if c.online {
                    players.push(c.name.clone());
                }
            });
        }

        let items = self
            .store
            .items(&room.items)
            .iter()
            .map(|item| item.read(|i| i.name.clone()))
            .collect();

        Ok(RoomView {
            id: room.id,
            exits: room.open_exits(),
            title: room.title,
            description: room.description,
            location: room.location,
            players,
            npcs,
            items,
        })
    }

    /// Item names `character` carries, and its cash.
    pub fn inventory(
        &self,
        character: CharacterId,
    ) -> Result<(Vec<String>, u64), WorldError> {
        let (ids, cash) = self
            .character(character)?
            .read(|c| (c.items.clone(), c.cash));
        let names = self
            .store
            .items(&ids)
            .iter()
            .map(|item| item.read(|i| i.name.clone()))
            .collect();
        Ok((names, cash))
    }

    /// Adds cash to `character` and returns the new balance.
    pub fn give_cash(
        &self,
        character: CharacterId,
        amount: u64,
    ) -> Result<u64, WorldError> {
        Ok(self.character(character)?.add_cash(amount))
    }

    // -- Room text -------------------------------------------------------

    pub fn set_room_title(&self, room_id: RoomId, title: &str) -> Result<(), WorldError> {
        self.room(room_id)?.write(|r| r.title = title.to_string());
        self.publish(Event::RoomUpdate { room_id });
        Ok(())
    }

    pub fn set_room_description(
        &self,
        room_id: RoomId,
        description: &str,
    ) -> Result<(), WorldError> {
        self.room(room_id)?
            .write(|r| r.description = description.to_string());
        self.publish(Event::RoomUpdate { room_id });
        Ok(())
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("store", &self.store)
            .field("bus", &self.bus)
            .field("fights", &self.fights.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(Arc::new(EntityStore::in_memory()), EventBus::new())
    }

    #[test]
    fn test_start_room_twice_returns_same_room() {
        let world = world();
        let a = world.start_room().unwrap();
        let b = world.start_room().unwrap();
        assert_eq!(a.id(), b.id());
        assert_eq!(world.store().rooms().len(), 1);
    }

    #[test]
    fn test_login_then_logout_toggles_online_and_publishes() {
        let world = world();
        let mut sub = world.bus().register();
        let room = world.start_room().unwrap();
        let user = world.store().create_user("ada").unwrap();
        let ada = world
            .store()
            .create_character("Ada", Some(user.id()), room.id())
            .unwrap();

        world.login(ada.id()).unwrap();
        assert!(ada.read(|c| c.online));
        assert!(user.read(|u| u.online));
        assert_eq!(world.who(), vec!["Ada".to_string()]);
        assert!(matches!(sub.try_recv(), Some(Event::Login { .. })));

        world.logout(ada.id()).unwrap();
        assert!(!ada.read(|c| c.online));
        assert!(world.who().is_empty());
        assert!(matches!(sub.try_recv(), Some(Event::Logout { .. })));
    }

    #[test]
    fn test_room_view_leaves_out_viewer_and_offline_players() {
        let world = world();
        let room = world.start_room().unwrap();
        let store = world.store();
        let player = |name: &str| {
            let user = store.create_user(name).unwrap();
            store
                .create_character(name, Some(user.id()), room.id())
                .unwrap()
        };
        let ada = player("Ada");
        let bo = player("Bo");
        player("Cy");
        store.create_character("Rat", None, room.id()).unwrap();
        world.login(ada.id()).unwrap();
        world.login(bo.id()).unwrap();

        let view = world.room_view(room.id(), ada.id()).unwrap();
        assert_eq!(view.players, vec!["Bo".to_string()]);
        assert_eq!(view.npcs, vec!["Rat".to_string()]);
        assert_eq!(view.title, warren_store::DEFAULT_ROOM_TITLE);
    }
}
