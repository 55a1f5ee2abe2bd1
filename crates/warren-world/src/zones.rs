//! Zones group rooms into separate maps. Rooms outside any zone form the
//! null zone.

use std::sync::Arc;

use warren_protocol::{CharacterId, Event, ZoneId};
use warren_store::{Guarded, Room, Zone};

use crate::{World, WorldError, START_LOCATION};

impl World {
    pub fn create_zone(
        &self,
        name: &str,
    ) -> Result<Arc<Guarded<Zone>>, WorldError> {
        Ok(self.store().create_zone(name)?)
    }

    /// The name of `zone_id`, or `None` for the null zone.
    pub fn zone_name(&self, zone_id: Option<ZoneId>) -> Option<String> {
        zone_id
            .and_then(|id| self.store().get_zone(id))
            .map(|zone| zone.read(|z| z.name.clone()))
    }

    /// All zone names, alphabetically.
    pub fn zone_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .store()
            .zones()
            .iter()
            .map(|zone| zone.read(|z| z.name.clone()))
            .collect();
        names.sort_by_key(|name| name.to_lowercase());
        names
    }

    /// Names the zone `zone_id`.
    ///
    /// Renaming the null zone creates a real zone called `name` and moves
    /// every null-zone room into it, coordinates unchanged. Returns the id
    /// of the zone that now carries the name.
    pub fn rename_zone(
        &self,
        zone_id: Option<ZoneId>,
        name: &str,
    ) -> Result<ZoneId, WorldError> {
        if let Some(id) = zone_id {
            self.store().rename_zone(id, name)?;
            tracing::info!(zone_id = %id, name, "zone renamed");
            return Ok(id);
        }

        let zone = self.store().create_zone(name)?;
        let target = Some(zone.id());
        let moved = match self.store().move_rooms_to_zone(None, target) {
            Ok(moved) => moved,
            Err(e) => {
                // Nothing moved; don't leave an empty zone behind.
                let _ = self.store().delete_zone(zone.id());
                return Err(e.into());
            }
        };
        tracing::info!(zone_id = %zone.id(), name, moved, "null zone named");
        for room in self.store().rooms_in_zone(Some(zone.id())) {
            self.publish(Event::RoomUpdate { room_id: room.id() });
        }
        Ok(zone.id())
    }

    /// Creates a zone with one room at its origin and moves `character`
    /// there.
    pub fn new_zone(
        &self,
        character: CharacterId,
        name: &str,
    ) -> Result<Arc<Guarded<Room>>, WorldError> {
        let zone = self.create_zone(name)?;
        self.teleport(character, Some(zone.id()), START_LOCATION)
    }
}
