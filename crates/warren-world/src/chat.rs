use warren_protocol::{CharacterId, ChatScope, Event};

use crate::{World, WorldError};

impl World {
    /// Speaks to everyone in the speaker's room.
    pub fn say(&self, from: CharacterId, message: &str) -> Result<(), WorldError> {
        let room_id = self.character(from)?.read(|c| c.room_id);
        self.chat(from, ChatScope::Say(room_id), message)
    }

    /// Acts out `message` for everyone in the actor's room.
    pub fn emote(&self, from: CharacterId, message: &str) -> Result<(), WorldError> {
        let room_id = self.character(from)?.read(|c| c.room_id);
        self.chat(from, ChatScope::Emote(room_id), message)
    }

    /// Speaks to everyone online.
    pub fn broadcast(&self, from: CharacterId, message: &str) -> Result<(), WorldError> {
        self.chat(from, ChatScope::Broadcast, message)
    }

    /// Whispers to one character, who must exist and be online. Returns
    /// the target's name as stored.
    pub fn tell(
        &self,
        from: CharacterId,
        target: &str,
        message: &str,
    ) -> Result<String, WorldError> {
        let target = self.character_named(target)?;
        let (name, online) = target.read(|c| (c.name.clone(), c.online));
        if !online {
            return Err(WorldError::NotOnline(name));
        }
        self.chat(from, ChatScope::Tell(target.id()), message)?;
        Ok(name)
    }

    fn chat(
        &self,
        from: CharacterId,
        scope: ChatScope,
        message: &str,
    ) -> Result<(), WorldError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(WorldError::EmptyMessage);
        }
        let from_name = self.character(from)?.read(|c| c.name.clone());
        tracing::debug!(character = %from, ?scope, "chat");
        self.publish(Event::Chat {
            scope,
            from,
            from_name,
            message: message.to_string(),
        });
        Ok(())
    }
}
