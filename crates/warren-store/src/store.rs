//! The entity store: every live entity, indexed.
//!
//! Lookups by id, by name, and by `(zone, coordinate)` are hash-map hits.
//! The indexes sit behind one `RwLock`, separate from the per-entity
//! locks inside each [`Guarded`].
//!
//! # Lock order
//!
//! Index lock first, entity lock second. Code holding an entity lock
//! (inside a `read`/`write` closure) must never call back into the store.
//!
//! # Deletion
//!
//! Deleting an entity removes it from the indexes and from persistence.
//! It does not touch other entities that refer to it: a room may keep a
//! deleted item's id in its list. Readers resolve ids through
//! [`EntityStore::items`], which skips anything missing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use warren_protocol::{
    CharacterId, Codec, Coordinate, EntityKind, ItemId, JsonCodec, RoomId,
    UserId, ZoneId,
};

use crate::{
    Character, Entity, Guarded, Item, MemoryPersistence, Named, Persistence,
    Room, StoreError, User, Zone,
};

/// Case-folded key for the name indexes.
fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn not_found<T: Entity>(id: T::Id) -> StoreError {
    StoreError::NotFound {
        kind: T::KIND,
        id: T::raw_id(id),
    }
}

// ---------------------------------------------------------------------------
// Index tables
// ---------------------------------------------------------------------------

/// All entities of one kind, plus a name index for the kinds whose names
/// are unique.
struct Table<T: Entity> {
    by_id: HashMap<T::Id, Arc<Guarded<T>>>,
    by_name: HashMap<String, T::Id>,
}

impl<T: Entity> Default for Table<T> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<T: Entity> Table<T> {
    fn get(&self, id: T::Id) -> Option<Arc<Guarded<T>>> {
        self.by_id.get(&id).cloned()
    }

    /// Every entity, ordered by id.
    fn all(&self) -> Vec<Arc<Guarded<T>>> {
        let mut all: Vec<_> = self.by_id.values().cloned().collect();
        all.sort_by_key(|e| e.id());
        all
    }

    fn insert(&mut self, entity: Arc<Guarded<T>>) {
        self.by_id.insert(entity.id(), entity);
    }
}

impl<T: Named> Table<T> {
    fn by_name(&self, name: &str) -> Option<Arc<Guarded<T>>> {
        let id = self.by_name.get(&name_key(name))?;
        self.get(*id)
    }

    /// Returns the index key for `name` if no other entity holds it.
    fn claim(&self, name: &str, owner: Option<T::Id>) -> Result<String, StoreError> {
        let key = name_key(name);
        if key.is_empty() {
            return Err(StoreError::EmptyName { kind: T::KIND });
        }
        match self.by_name.get(&key) {
            Some(existing) if Some(*existing) != owner => {
                Err(StoreError::NameTaken {
                    kind: T::KIND,
                    name: name.trim().to_string(),
                })
            }
            _ => Ok(key),
        }
    }

    fn insert_named(&mut self, entity: Arc<Guarded<T>>) {
        let key = entity.read(|e| name_key(e.name()));
        if let Some(previous) = self.by_name.insert(key, entity.id()) {
            tracing::warn!(
                kind = %T::KIND,
                id = %previous,
                replaced_by = %entity.id(),
                "duplicate name in loaded records"
            );
        }
        self.insert(entity);
    }

    fn rename(&mut self, id: T::Id, name: &str) -> Result<(), StoreError> {
        let entity = self.get(id).ok_or_else(|| not_found::<T>(id))?;
        let key = self.claim(name, Some(id))?;
        let old_key = entity.read(|e| name_key(e.name()));

        self.by_name.remove(&old_key);
        self.by_name.insert(key, id);
        let name = name.trim().to_string();
        entity.write(|e| e.set_name(name));
        Ok(())
    }

    fn remove_named(&mut self, id: T::Id) -> Option<Arc<Guarded<T>>> {
        let entity = self.by_id.remove(&id)?;
        let key = entity.read(|e| name_key(e.name()));
        if self.by_name.get(&key) == Some(&id) {
            self.by_name.remove(&key);
        }
        Some(entity)
    }
}

#[derive(Default)]
struct Index {
    users: Table<User>,
    zones: Table<Zone>,
    rooms: Table<Room>,
    characters: Table<Character>,
    items: Table<Item>,
    locations: HashMap<(Option<ZoneId>, Coordinate), RoomId>,
}

// ---------------------------------------------------------------------------
// EntityStore
// ---------------------------------------------------------------------------

/// The authoritative, in-memory registry of every entity.
pub struct EntityStore {
    persistence: Arc<dyn Persistence>,
    index: RwLock<Index>,
    /// Ids are unique across all kinds.
    next_id: AtomicU64,
}

impl EntityStore {
    /// Creates an empty store writing through to `persistence`.
    pub fn new(persistence: Arc<dyn Persistence>) -> Self {
        Self {
            persistence,
            index: RwLock::new(Index::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// An empty store backed by [`MemoryPersistence`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryPersistence::new()))
    }

    /// Builds a store from every record in `persistence`.
    ///
    /// # Errors
    /// Fails on backend I/O errors or records that don't decode.
    pub fn load(persistence: Arc<dyn Persistence>) -> Result<Self, StoreError> {
        let store = Self::new(persistence);
        let mut max_id = 0;
        {
            let mut index = store.index.write();
            for user in store.load_kind::<User>(&mut max_id)? {
                index.users.insert_named(user);
            }
            for zone in store.load_kind::<Zone>(&mut max_id)? {
                index.zones.insert_named(zone);
            }
            for room in store.load_kind::<Room>(&mut max_id)? {
                let key = room.read(|r| (r.zone_id, r.location));
                if let Some(previous) = index.locations.insert(key, room.id()) {
                    tracing::warn!(
                        room_id = %previous,
                        replaced_by = %room.id(),
                        location = %key.1,
                        "two loaded rooms share a location"
                    );
                }
                index.rooms.insert(room);
            }
            for item in store.load_kind::<Item>(&mut max_id)? {
                index.items.insert(item);
            }
            for character in store.load_kind::<Character>(&mut max_id)? {
                index.characters.insert_named(character);
            }

            tracing::info!(
                users = index.users.by_id.len(),
                zones = index.zones.by_id.len(),
                rooms = index.rooms.by_id.len(),
                items = index.items.by_id.len(),
                characters = index.characters.by_id.len(),
                "entity store loaded"
            );
        }
        store.next_id.store(max_id + 1, Ordering::Relaxed);
        Ok(store)
    }

    fn load_kind<T: Entity>(
        &self,
        max_id: &mut u64,
    ) -> Result<Vec<Arc<Guarded<T>>>, StoreError> {
        let mut loaded = Vec::new();
        for record in self.persistence.load_all(T::KIND)? {
            let value: T = JsonCodec.decode(&record)?;
            *max_id = (*max_id).max(T::raw_id(value.id()));
            loaded.push(self.wrap(value));
        }
        Ok(loaded)
    }

    pub fn persistence(&self) -> &Arc<dyn Persistence> {
        &self.persistence
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn wrap<T: Entity>(&self, value: T) -> Arc<Guarded<T>> {
        Arc::new(Guarded::new(value, Arc::clone(&self.persistence)))
    }

    /// Stops an unindexed entity from persisting and removes its record.
    fn discard<T: Entity>(&self, entity: &Guarded<T>) {
        entity.retire();
        if let Err(e) = self.persistence.delete(T::KIND, T::raw_id(entity.id()))
        {
            tracing::warn!(
                kind = %T::KIND,
                id = %entity.id(),
                error = %e,
                "failed to delete persisted record"
            );
        }
        tracing::info!(kind = %T::KIND, id = %entity.id(), "entity deleted");
    }

    // -- Create ----------------------------------------------------------

    /// # Errors
    /// [`StoreError::NameTaken`] or [`StoreError::EmptyName`].
    pub fn create_user(&self, name: &str) -> Result<Arc<Guarded<User>>, StoreError> {
        let user = {
            let mut index = self.index.write();
            index.users.claim(name, None)?;
            let user = self.wrap(User {
                id: UserId(self.allocate_id()),
                name: name.trim().to_string(),
                color_mode: Default::default(),
                online: false,
            });
            index.users.insert_named(Arc::clone(&user));
            user
        };
        user.save();
        tracing::info!(user_id = %user.id(), name, "user created");
        Ok(user)
    }

    /// # Errors
    /// [`StoreError::NameTaken`] or [`StoreError::EmptyName`].
    pub fn create_zone(&self, name: &str) -> Result<Arc<Guarded<Zone>>, StoreError> {
        let zone = {
            let mut index = self.index.write();
            index.zones.claim(name, None)?;
            let zone = self.wrap(Zone {
                id: ZoneId(self.allocate_id()),
                name: name.trim().to_string(),
            });
            index.zones.insert_named(Arc::clone(&zone));
            zone
        };
        zone.save();
        tracing::info!(zone_id = %zone.id(), name, "zone created");
        Ok(zone)
    }

    /// Creates a room with the default title and description and no exits.
    ///
    /// # Errors
    /// [`StoreError::LocationTaken`] if a room already sits there.
    pub fn create_room(
        &self,
        zone_id: Option<ZoneId>,
        location: Coordinate,
    ) -> Result<Arc<Guarded<Room>>, StoreError> {
        let room = {
            let mut index = self.index.write();
            if index.locations.contains_key(&(zone_id, location)) {
                return Err(StoreError::LocationTaken {
                    zone: zone_id,
                    location,
                });
            }
            let room =
                self.wrap(Room::new(RoomId(self.allocate_id()), zone_id, location));
            index.locations.insert((zone_id, location), room.id());
            index.rooms.insert(Arc::clone(&room));
            room
        };
        room.save();
        tracing::info!(room_id = %room.id(), %location, "room created");
        Ok(room)
    }

    /// Creates a character standing in `room_id`. NPCs have no user.
    ///
    /// # Errors
    /// [`StoreError::NameTaken`] or [`StoreError::EmptyName`].
    pub fn create_character(
        &self,
        name: &str,
        user_id: Option<UserId>,
        room_id: RoomId,
    ) -> Result<Arc<Guarded<Character>>, StoreError> {
        let character = {
            let mut index = self.index.write();
            index.characters.claim(name, None)?;
            let character = self.wrap(Character::new(
                CharacterId(self.allocate_id()),
                name.trim().to_string(),
                room_id,
                user_id,
            ));
            index.characters.insert_named(Arc::clone(&character));
            character
        };
        character.save();
        tracing::info!(character = %character.id(), name, "character created");
        Ok(character)
    }

    /// Creates a free-standing item. Put it somewhere with the room or
    /// character `add_item` helpers.
    ///
    /// # Errors
    /// [`StoreError::EmptyName`]. Item names need not be unique.
    pub fn create_item(&self, name: &str) -> Result<Arc<Guarded<Item>>, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::EmptyName {
                kind: EntityKind::Item,
            });
        }
        let item = self.wrap(Item {
            id: ItemId(self.allocate_id()),
            name: name.trim().to_string(),
            properties: Default::default(),
        });
        self.index.write().items.insert(Arc::clone(&item));
        item.save();
        tracing::info!(item_id = %item.id(), name, "item created");
        Ok(item)
    }

    // -- Fetch -----------------------------------------------------------

    pub fn get_user(&self, id: UserId) -> Option<Arc<Guarded<User>>> {
        self.index.read().users.get(id)
    }

    pub fn get_zone(&self, id: ZoneId) -> Option<Arc<Guarded<Zone>>> {
        self.index.read().zones.get(id)
    }

    pub fn get_room(&self, id: RoomId) -> Option<Arc<Guarded<Room>>> {
        self.index.read().rooms.get(id)
    }

    pub fn get_character(&self, id: CharacterId) -> Option<Arc<Guarded<Character>>> {
        self.index.read().characters.get(id)
    }

    pub fn get_item(&self, id: ItemId) -> Option<Arc<Guarded<Item>>> {
        self.index.read().items.get(id)
    }

    /// Case-insensitive.
    pub fn user_by_name(&self, name: &str) -> Option<Arc<Guarded<User>>> {
        self.index.read().users.by_name(name)
    }

    pub fn zone_by_name(&self, name: &str) -> Option<Arc<Guarded<Zone>>> {
        self.index.read().zones.by_name(name)
    }

    pub fn character_by_name(&self, name: &str) -> Option<Arc<Guarded<Character>>> {
        self.index.read().characters.by_name(name)
    }

    /// The room at `location` in `zone_id` (`None` for the null zone).
    pub fn room_by_location(
        &self,
        location: Coordinate,
        zone_id: Option<ZoneId>,
    ) -> Option<Arc<Guarded<Room>>> {
        let index = self.index.read();
        let id = index.locations.get(&(zone_id, location))?;
        index.rooms.get(*id)
    }

    /// The player character belonging to `user_id`, if any.
    pub fn character_of_user(&self, user_id: UserId) -> Option<Arc<Guarded<Character>>> {
        self.characters()
            .into_iter()
            .find(|c| c.read(|c| c.user_id == Some(user_id)))
    }

    /// Resolves item ids, skipping ones that no longer exist.
    pub fn items(&self, ids: &[ItemId]) -> Vec<Arc<Guarded<Item>>> {
        let index = self.index.read();
        ids.iter()
            .filter_map(|id| {
                let item = index.items.get(*id);
                if item.is_none() {
                    tracing::debug!(item_id = %id, "skipping dangling item reference");
                }
                item
            })
            .collect()
    }

    /// First item among `ids` whose name matches, case-insensitively.
    pub fn find_item(&self, ids: &[ItemId], name: &str) -> Option<Arc<Guarded<Item>>> {
        let key = name_key(name);
        self.items(ids)
            .into_iter()
            .find(|item| item.read(|i| name_key(&i.name) == key))
    }

    // -- Listings --------------------------------------------------------

    pub fn users(&self) -> Vec<Arc<Guarded<User>>> {
        self.index.read().users.all()
    }

    pub fn zones(&self) -> Vec<Arc<Guarded<Zone>>> {
        self.index.read().zones.all()
    }

    pub fn rooms(&self) -> Vec<Arc<Guarded<Room>>> {
        self.index.read().rooms.all()
    }

    pub fn characters(&self) -> Vec<Arc<Guarded<Character>>> {
        self.index.read().characters.all()
    }

    pub fn rooms_in_zone(&self, zone_id: Option<ZoneId>) -> Vec<Arc<Guarded<Room>>> {
        self.rooms()
            .into_iter()
            .filter(|room| room.read(|r| r.zone_id == zone_id))
            .collect()
    }

    pub fn characters_in_room(&self, room_id: RoomId) -> Vec<Arc<Guarded<Character>>> {
        self.characters()
            .into_iter()
            .filter(|c| c.read(|c| c.room_id == room_id))
            .collect()
    }

    pub fn online_characters(&self) -> Vec<Arc<Guarded<Character>>> {
        self.characters()
            .into_iter()
            .filter(|c| c.read(|c| c.online))
            .collect()
    }

    // -- Secondary-key updates -------------------------------------------

    pub fn rename_user(&self, id: UserId, name: &str) -> Result<(), StoreError> {
        self.index.write().users.rename(id, name)
    }

    pub fn rename_zone(&self, id: ZoneId, name: &str) -> Result<(), StoreError> {
        self.index.write().zones.rename(id, name)
    }

    pub fn rename_character(&self, id: CharacterId, name: &str) -> Result<(), StoreError> {
        self.index.write().characters.rename(id, name)
    }

    /// Moves a room to a new spot, swapping its location index entry.
    ///
    /// # Errors
    /// [`StoreError::NotFound`], or [`StoreError::LocationTaken`] if
    /// another room is already there.
    pub fn relocate_room(
        &self,
        id: RoomId,
        zone_id: Option<ZoneId>,
        location: Coordinate,
    ) -> Result<(), StoreError> {
        let mut index = self.index.write();
        let room = index.rooms.get(id).ok_or_else(|| not_found::<Room>(id))?;
        let key = (zone_id, location);
        if index.locations.get(&key).is_some_and(|other| *other != id) {
            return Err(StoreError::LocationTaken {
                zone: zone_id,
                location,
            });
        }

        let old_key = room.read(|r| (r.zone_id, r.location));
        index.locations.remove(&old_key);
        index.locations.insert(key, id);
        room.write(|r| {
            r.zone_id = zone_id;
            r.location = location;
        });
        Ok(())
    }

    /// Moves every room in zone `from` into zone `to`, keeping their
    /// coordinates. All or nothing: if any destination spot is taken,
    /// no room moves.
    ///
    /// Returns how many rooms moved.
    pub fn move_rooms_to_zone(
        &self,
        from: Option<ZoneId>,
        to: Option<ZoneId>,
    ) -> Result<usize, StoreError> {
        if from == to {
            return Ok(0);
        }
        let mut index = self.index.write();
        let moving: Vec<_> = index
            .rooms
            .all()
            .into_iter()
            .filter_map(|room| {
                room.read(|r| (r.zone_id == from).then_some(r.location))
                    .map(|location| (room, location))
            })
            .collect();

        if let Some((_, location)) = moving
            .iter()
            .find(|(_, location)| index.locations.contains_key(&(to, *location)))
        {
            return Err(StoreError::LocationTaken {
                zone: to,
                location: *location,
            });
        }

        for (room, location) in &moving {
            index.locations.remove(&(from, *location));
            index.locations.insert((to, *location), room.id());
            room.write(|r| r.zone_id = to);
        }
        Ok(moving.len())
    }

    // -- Delete ----------------------------------------------------------

    /// # Errors
    /// [`StoreError::NotFound`].
    pub fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        let user = self
            .index
            .write()
            .users
            .remove_named(id)
            .ok_or_else(|| not_found::<User>(id))?;
        self.discard(&user);
        Ok(())
    }

    pub fn delete_zone(&self, id: ZoneId) -> Result<(), StoreError> {
        let zone = self
            .index
            .write()
            .zones
            .remove_named(id)
            .ok_or_else(|| not_found::<Zone>(id))?;
        self.discard(&zone);
        Ok(())
    }

    pub fn delete_room(&self, id: RoomId) -> Result<(), StoreError> {
        let room = {
            let mut index = self.index.write();
            let room = index
                .rooms
                .by_id
                .remove(&id)
                .ok_or_else(|| not_found::<Room>(id))?;
            let key = room.read(|r| (r.zone_id, r.location));
            if index.locations.get(&key) == Some(&id) {
                index.locations.remove(&key);
            }
            room
        };
        self.discard(&room);
        Ok(())
    }

    pub fn delete_character(&self, id: CharacterId) -> Result<(), StoreError> {
        let character = self
            .index
            .write()
            .characters
            .remove_named(id)
            .ok_or_else(|| not_found::<Character>(id))?;
        self.discard(&character);
        Ok(())
    }

    /// Deletes an item. Rooms or characters still listing its id keep the
    /// id; [`items`](Self::items) filters it out.
    pub fn delete_item(&self, id: ItemId) -> Result<(), StoreError> {
        let item = self
            .index
            .write()
            .items
            .by_id
            .remove(&id)
            .ok_or_else(|| not_found::<Item>(id))?;
        self.discard(&item);
        Ok(())
    }
}

impl std::fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let index = self.index.read();
        f.debug_struct("EntityStore")
            .field("users", &index.users.by_id.len())
            .field("zones", &index.zones.by_id.len())
            .field("rooms", &index.rooms.by_id.len())
            .field("characters", &index.characters.by_id.len())
            .field("items", &index.items.by_id.len())
            .finish()
    }
}
