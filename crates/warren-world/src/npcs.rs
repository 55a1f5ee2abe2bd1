//! Non-player characters: characters with no user behind them.
//!
//! NPCs share the character name space with players, stand in one room,
//! and can be attacked like anyone else. Builders create, rename, and
//! delete them; players can talk to them.

use std::sync::Arc;

use warren_protocol::{CharacterId, Event, RoomId};
use warren_store::{Character, Guarded};

use crate::{World, WorldError};

impl World {
    /// Creates an NPC called `name` standing in `room_id`.
    ///
    /// # Errors
    /// [`StoreError::NameTaken`](warren_store::StoreError::NameTaken) if
    /// any character already has the name.
    pub fn create_npc(
        &self,
        room_id: RoomId,
        name: &str,
    ) -> Result<Arc<Guarded<Character>>, WorldError> {
        self.room(room_id)?;
        let npc = self.store().create_character(name, None, room_id)?;
        tracing::info!(npc = %npc.id(), %room_id, name, "npc created");
        self.publish(Event::RoomUpdate { room_id });
        Ok(npc)
    }

    /// NPCs in `room_id`, as `(id, name)` sorted by name.
    pub fn npcs_in(&self, room_id: RoomId) -> Vec<(CharacterId, String)> {
        let mut npcs: Vec<_> = self
            .store()
            .characters_in_room(room_id)
            .iter()
            .filter(|c| c.read(Character::is_npc))
            .map(|c| (c.id(), c.read(|c| c.name.clone())))
            .collect();
        npcs.sort_by_key(|(_, name)| name.to_lowercase());
        npcs
    }

    pub fn rename_npc(&self, id: CharacterId, name: &str) -> Result<(), WorldError> {
        let room_id = self.npc(id)?.read(|c| c.room_id);
        self.store().rename_character(id, name)?;
        self.publish(Event::RoomUpdate { room_id });
        Ok(())
    }

    /// Sets what the NPC says when talked to.
    pub fn set_conversation(
        &self,
        id: CharacterId,
        conversation: &str,
    ) -> Result<(), WorldError> {
        self.npc(id)?
            .write(|c| c.conversation = conversation.trim().to_string());
        Ok(())
    }

    /// Deletes an NPC. Anything it carried drops to the floor, and any
    /// fight it was part of ends.
    pub fn delete_npc(&self, id: CharacterId) -> Result<(), WorldError> {
        let npc = self.npc(id)?;
        let (room_id, items) = npc.write(|c| {
            c.weight = 0;
            (c.room_id, std::mem::take(&mut c.items))
        });
        if let Ok(room) = self.room(room_id) {
            room.write(|r| items.iter().for_each(|item| r.add_item(*item)));
        }
        self.forget_fights(id);
        self.store().delete_character(id)?;
        tracing::info!(npc = %id, %room_id, "npc deleted");
        self.publish(Event::RoomUpdate { room_id });
        Ok(())
    }

    /// What the NPC called `name` in the speaker's room has to say.
    /// Returns the NPC's name and its conversation, which may be empty.
    ///
    /// # Errors
    /// [`WorldError::NotHere`] unless such an NPC stands in the room.
    pub fn talk(
        &self,
        speaker: CharacterId,
        name: &str,
    ) -> Result<(String, String), WorldError> {
        let room = self.room_of(speaker)?;
        self.store()
            .characters_in_room(room.id())
            .iter()
            .find_map(|c| {
                c.read(|c| {
                    (c.is_npc() && c.name.eq_ignore_ascii_case(name))
                        .then(|| (c.name.clone(), c.conversation.clone()))
                })
            })
            .ok_or_else(|| WorldError::NotHere(name.to_string()))
    }

    fn npc(&self, id: CharacterId) -> Result<Arc<Guarded<Character>>, WorldError> {
        let character = self.character(id)?;
        let (is_npc, name) = character.read(|c| (c.is_npc(), c.name.clone()));
        if !is_npc {
            return Err(WorldError::NotAnNpc(name));
        }
        Ok(character)
    }
}
