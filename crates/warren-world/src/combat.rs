//! Who is fighting whom.
//!
//! The registry maps each attacker to one defender. It lives only in
//! memory; there are no damage rules here, only the bookkeeping and the
//! announcements.

use warren_protocol::{CharacterId, Event};

use crate::{World, WorldError};

impl World {
    /// Starts `attacker` fighting the character called `defender`, who
    /// must be in the same room and alive. Replaces any fight the
    /// attacker was already in.
    pub fn start_fight(
        &self,
        attacker: CharacterId,
        defender: &str,
    ) -> Result<CharacterId, WorldError> {
        let attacker_entity = self.character(attacker)?;
        let defender_entity = self.character_named(defender)?;
        if defender_entity.id() == attacker {
            return Err(WorldError::SelfTarget);
        }

        let (attacker_name, room) =
            attacker_entity.read(|c| (c.name.clone(), c.room_id));
        let (defender_name, defender_room, hitpoints) =
            defender_entity.read(|c| (c.name.clone(), c.room_id, c.hitpoints));
        if defender_room != room {
            return Err(WorldError::NotHere(defender_name));
        }
        if hitpoints == 0 {
            return Err(WorldError::TargetDead(defender_name));
        }

        self.fights.lock().insert(attacker, defender_entity.id());
        tracing::debug!(
            %attacker,
            defender = %defender_entity.id(),
            "fight started"
        );
        self.publish(Event::CombatStart {
            attacker,
            attacker_name,
            defender: defender_entity.id(),
            defender_name,
        });
        Ok(defender_entity.id())
    }

    /// Ends the fight `attacker` started. Returns the former defender.
    pub fn stop_fight(
        &self,
        attacker: CharacterId,
    ) -> Result<CharacterId, WorldError> {
        let defender = self
            .fights
            .lock()
            .remove(&attacker)
            .ok_or(WorldError::NotFighting)?;
        self.announce_stop(attacker, defender);
        Ok(defender)
    }

    /// The character `attacker` is fighting, if any.
    pub fn fighting(&self, attacker: CharacterId) -> Option<CharacterId> {
        self.fights.lock().get(&attacker).copied()
    }

    /// Ends every fight `character` is part of, on either side.
    pub(crate) fn forget_fights(&self, character: CharacterId) {
        let ended: Vec<(CharacterId, CharacterId)> = {
            let mut fights = self.fights.lock();
            let ended = fights
                .iter()
                .filter(|(a, d)| **a == character || **d == character)
                .map(|(a, d)| (*a, *d))
                .collect::<Vec<_>>();
            for (attacker, _) in &ended {
                fights.remove(attacker);
            }
            ended
        };
        for (attacker, defender) in ended {
            self.announce_stop(attacker, defender);
        }
    }

    fn announce_stop(&self, attacker: CharacterId, defender: CharacterId) {
        let name_of = |id| {
            self.store()
                .get_character(id)
                .map(|c| c.read(|c| c.name.clone()))
                .unwrap_or_default()
        };
        tracing::debug!(%attacker, %defender, "fight stopped");
        self.publish(Event::CombatStop {
            attacker,
            attacker_name: name_of(attacker),
            defender,
            defender_name: name_of(defender),
        });
    }
}
