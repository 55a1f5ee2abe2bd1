//! Moving characters between rooms, and shaping the map while doing it.

use std::sync::Arc;

use warren_protocol::{CharacterId, Coordinate, Direction, Event, RoomId, ZoneId};
use warren_store::{Guarded, Room, StoreError};

use crate::{World, WorldError};

impl World {
    /// Walks `character` through the `dir` exit of its room.
    ///
    /// # Errors
    /// [`WorldError::NoExit`] if the exit is closed,
    /// [`WorldError::ExitLocked`] if it is locked, and
    /// [`WorldError::NoRoomThere`] if it leads nowhere.
    pub fn move_character(
        &self,
        character: CharacterId,
        dir: Direction,
    ) -> Result<Arc<Guarded<Room>>, WorldError> {
        let from = self.room_of(character)?;
        let exit = from.read(|r| r.exit(dir));
        if !exit.open {
            return Err(WorldError::NoExit(dir));
        }
        if exit.locked {
            return Err(WorldError::ExitLocked(dir));
        }
        let to = self
            .neighbor(&from, dir)
            .ok_or(WorldError::NoRoomThere(dir))?;

        self.place(character, from.id(), to.id(), Some(dir))?;
        Ok(to)
    }

    /// Puts `character` at `location` in `zone_id`, creating a room there
    /// if none exists. Exits and locks are ignored.
    pub fn teleport(
        &self,
        character: CharacterId,
        zone_id: Option<ZoneId>,
        location: Coordinate,
    ) -> Result<Arc<Guarded<Room>>, WorldError> {
        let from = self.room_of(character)?;
        let to = self.room_at_or_create(zone_id, location)?;
        if to.id() != from.id() {
            self.place(character, from.id(), to.id(), None)?;
        }
        Ok(to)
    }

    /// Teleports `character` into the zone called `name`, landing in the
    /// zone's oldest room (or its origin if the zone has none).
    pub fn teleport_to_zone(
        &self,
        character: CharacterId,
        name: &str,
    ) -> Result<Arc<Guarded<Room>>, WorldError> {
        let zone = self
            .store()
            .zone_by_name(name)
            .ok_or_else(|| WorldError::ZoneNotFound(name.to_string()))?;
        let here = self.room_of(character)?.read(|r| r.zone_id);
        if here == Some(zone.id()) {
            return Err(WorldError::AlreadyInZone);
        }
        let location = self
            .store()
            .rooms_in_zone(Some(zone.id()))
            .first()
            .map(|room| room.read(|r| r.location))
            .unwrap_or_default();
        self.teleport(character, Some(zone.id()), location)
    }

    /// Builds a passage from the character's room towards `dir` and walks
    /// through it. The neighbor room is created if missing; both facing
    /// exits are opened and unlocked.
    ///
    /// # Errors
    /// [`WorldError::ExitLocked`] if the character's exit is locked.
    /// Nothing is created or opened in that case.
    pub fn dig(
        &self,
        character: CharacterId,
        dir: Direction,
    ) -> Result<Arc<Guarded<Room>>, WorldError> {
        let from = self.room_of(character)?;
        let (zone_id, location, locked) =
            from.read(|r| (r.zone_id, r.location, r.exit(dir).locked));
        if locked {
            return Err(WorldError::ExitLocked(dir));
        }
        let to = self.room_at_or_create(zone_id, location.next(dir))?;

        self.set_exit_enabled(from.id(), dir, true)?;

        // The far side takes the near side's lock state, so the new pair
        // starts out in step even if a stale lock was left behind.
        let facing = dir.opposite();
        let was_locked = to.write(|r| {
            let was_locked = r.exit(facing).locked;
            r.set_exit_enabled(facing, true);
            r.set_exit_locked(facing, false);
            was_locked
        });
        self.publish(Event::RoomUpdate { room_id: to.id() });
        if was_locked {
            self.publish(Event::Lock {
                room_id: to.id(),
                direction: facing,
                locked: false,
            });
        }
        tracing::debug!(from = %from.id(), to = %to.id(), %dir, "passage dug");

        self.move_character(character, dir)
    }

    /// Deletes a room. Neighbors' exits facing it are closed and
    /// unlocked so nothing leads into the gap.
    ///
    /// # Errors
    /// [`WorldError::RoomOccupied`] if any character is inside.
    pub fn delete_room(&self, room_id: RoomId) -> Result<(), WorldError> {
        let room = self.room(room_id)?;
        if !self.store().characters_in_room(room_id).is_empty() {
            return Err(WorldError::RoomOccupied(room_id));
        }

        for dir in Direction::ALL {
            if let Some(neighbor) = self.neighbor(&room, dir) {
                let facing = dir.opposite();
                neighbor.write(|r| {
                    r.set_exit_enabled(facing, false);
                    r.set_exit_locked(facing, false);
                });
                self.publish(Event::RoomUpdate {
                    room_id: neighbor.id(),
                });
            }
        }
        self.store().delete_room(room_id)?;
        self.publish(Event::RoomUpdate { room_id });

        // A character may have walked in between the check and the
        // delete; room_of moves it to the start room.
        for stranded in self.store().characters_in_room(room_id) {
            self.room_of(stranded.id())?;
        }
        Ok(())
    }

    /// Deletes the room one step from the character's room towards `dir`,
    /// and closes the character's exit that led there.
    pub fn delete_room_towards(
        &self,
        character: CharacterId,
        dir: Direction,
    ) -> Result<RoomId, WorldError> {
        let here = self.room_of(character)?;
        let target = self
            .neighbor(&here, dir)
            .ok_or(WorldError::NoRoomThere(dir))?;
        self.delete_room(target.id())?;
        Ok(target.id())
    }

    fn room_at_or_create(
        &self,
        zone_id: Option<ZoneId>,
        location: Coordinate,
    ) -> Result<Arc<Guarded<Room>>, WorldError> {
        if let Some(room) = self.store().room_by_location(location, zone_id) {
            return Ok(room);
        }
        match self.store().create_room(zone_id, location) {
            Ok(room) => Ok(room),
            Err(e @ StoreError::LocationTaken { .. }) => self
                .store()
                .room_by_location(location, zone_id)
                .ok_or(WorldError::from(e)),
            Err(e) => Err(e.into()),
        }
    }

    /// Records the move and announces it on both ends. `dir` is the way
    /// the character left; arrivals see the opposite.
    fn place(
        &self,
        character: CharacterId,
        from: RoomId,
        to: RoomId,
        dir: Option<Direction>,
    ) -> Result<(), WorldError> {
        let name = self.character(character)?.write(|c| {
            c.room_id = to;
            c.name.clone()
        });
        tracing::debug!(%character, %from, %to, "character moved");

        self.publish(Event::Leave {
            character,
            name: name.clone(),
            room_id: from,
            to: dir,
        });
        self.publish(Event::Enter {
            character,
            name,
            room_id: to,
            from: dir.map(Direction::opposite),
        });
        Ok(())
    }
}
