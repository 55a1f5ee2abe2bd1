//! Creating, destroying, and carrying items.
//!
//! An item lives in exactly one container's id list. Moving it is two
//! single-entity writes: add to the destination, then remove from the
//! source. A reader in between sees it in both places, never in neither.
//! If the remove finds the item already gone, someone else moved it
//! first, and the add is undone.
//!
//! A character's `weight` is the summed weight of what it carries. It
//! changes in the same write that adds or removes the item, and an add
//! that would go over `capacity` is refused.

use std::sync::Arc;

use warren_protocol::{CharacterId, Event, ItemId, RoomId};
use warren_store::{Guarded, Item};

use crate::{World, WorldError};

/// Either end of an item move.
#[derive(Clone, Copy)]
enum Holder {
    Room(RoomId),
    Character(CharacterId),
}

impl World {
    /// Creates an item named `name` on the floor of `room_id`.
    pub fn create_item_in_room(
        &self,
        room_id: RoomId,
        name: &str,
    ) -> Result<Arc<Guarded<Item>>, WorldError> {
        let room = self.room(room_id)?;
        let item = self.store().create_item(name)?;
        room.write(|r| r.add_item(item.id()));
        self.publish(Event::RoomUpdate { room_id });
        Ok(item)
    }

    /// Removes the item called `name` from `room_id` and deletes it.
    pub fn destroy_item(
        &self,
        room_id: RoomId,
        name: &str,
    ) -> Result<ItemId, WorldError> {
        let room = self.room(room_id)?;
        let ids = room.read(|r| r.items.clone());
        let item = self
            .store()
            .find_item(&ids, name)
            .ok_or_else(|| WorldError::ItemNotFound(name.to_string()))?;

        room.write(|r| r.remove_item(item.id()));
        self.store().delete_item(item.id())?;
        self.publish(Event::RoomUpdate { room_id });
        Ok(item.id())
    }

    /// Picks up the item called `name` from the character's room.
    pub fn take_item(
        &self,
        character: CharacterId,
        name: &str,
    ) -> Result<Arc<Guarded<Item>>, WorldError> {
        let room = self.room_of(character)?;
        let ids = room.read(|r| r.items.clone());
        let item = self
            .store()
            .find_item(&ids, name)
            .ok_or_else(|| WorldError::ItemNotFound(name.to_string()))?;

        let (from, to) = (Holder::Room(room.id()), Holder::Character(character));
        if !self.move_item(&item, from, to)? {
            return Err(WorldError::ItemNotFound(name.to_string()));
        }
        self.publish(Event::RoomUpdate { room_id: room.id() });
        Ok(item)
    }

    /// Puts the carried item called `name` on the floor.
    pub fn drop_item(
        &self,
        character: CharacterId,
        name: &str,
    ) -> Result<Arc<Guarded<Item>>, WorldError> {
        let carried = self.character(character)?.read(|c| c.items.clone());
        let item = self
            .store()
            .find_item(&carried, name)
            .ok_or_else(|| WorldError::NotCarrying(name.to_string()))?;
        let room = self.room_of(character)?;

        let (from, to) = (Holder::Character(character), Holder::Room(room.id()));
        if !self.move_item(&item, from, to)? {
            return Err(WorldError::NotCarrying(name.to_string()));
        }
        self.publish(Event::RoomUpdate { room_id: room.id() });
        Ok(item)
    }

    /// Returns `false` if the item was no longer in `from`.
    ///
    /// # Errors
    /// [`WorldError::TooHeavy`] if `to` is a character that can't carry
    /// the extra weight; nothing moves.
    fn move_item(
        &self,
        item: &Guarded<Item>,
        from: Holder,
        to: Holder,
    ) -> Result<bool, WorldError> {
        let (id, name, weight) = item.read(|i| (i.id, i.name.clone(), i.weight()));
        self.add_to(to, id, &name, weight)?;
        if self.remove_from(from, id, weight)? {
            tracing::debug!(item_id = %id, "item moved");
            return Ok(true);
        }
        self.remove_from(to, id, weight)?;
        tracing::debug!(item_id = %id, "item move lost a race; undone");
        Ok(false)
    }

    fn add_to(
        &self,
        holder: Holder,
        item: ItemId,
        name: &str,
        weight: u64,
    ) -> Result<(), WorldError> {
        match holder {
            Holder::Room(id) => self.room(id)?.write(|r| r.add_item(item)),
            Holder::Character(id) => self.character(id)?.try_write(|c| {
                if c.items.contains(&item) {
                    return Ok(());
                }
                if !c.can_carry(weight) {
                    return Err(WorldError::TooHeavy(name.to_string()));
                }
                c.add_item(item);
                c.weight += weight;
                Ok(())
            })?,
        }
        Ok(())
    }

    fn remove_from(
        &self,
        holder: Holder,
        item: ItemId,
        weight: u64,
    ) -> Result<bool, WorldError> {
        Ok(match holder {
            Holder::Room(id) => self.room(id)?.write(|r| r.remove_item(item)),
            Holder::Character(id) => self.character(id)?.write(|c| {
                let removed = c.remove_item(item);
                if removed {
                    c.weight = c.weight.saturating_sub(weight);
                }
                removed
            }),
        })
    }
}
