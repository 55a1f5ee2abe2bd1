//! Map data: which rooms sit inside a box of coordinates, and which way
//! their exits point. Turning that into text is the caller's job.

use warren_protocol::{CharacterId, Coordinate, Direction, ZoneId};

use crate::{World, WorldError};

/// One room on a map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapRoom {
    pub location: Coordinate,
    pub exits: Vec<Direction>,
}

/// The rooms of one zone inside `min..=max` on every axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapView {
    pub min: Coordinate,
    pub max: Coordinate,
    /// Where the viewer stands.
    pub here: Coordinate,
    pub rooms: Vec<MapRoom>,
}

impl MapView {
    pub fn contains(&self, at: Coordinate) -> bool {
        within(self.min, self.max, at)
    }
}

fn within(min: Coordinate, max: Coordinate, at: Coordinate) -> bool {
    (min.x..=max.x).contains(&at.x)
        && (min.y..=max.y).contains(&at.y)
        && (min.z..=max.z).contains(&at.z)
}

impl World {
    /// The smallest box holding every room of `zone_id`, as its
    /// lowest and highest corners. `None` for a zone with no rooms.
    pub fn zone_corners(
        &self,
        zone_id: Option<ZoneId>,
    ) -> Option<(Coordinate, Coordinate)> {
        self.store()
            .rooms_in_zone(zone_id)
            .iter()
            .map(|room| room.read(|r| r.location))
            .fold(None, |corners, at| {
                let (lo, hi) = corners.unwrap_or((at, at));
                Some((
                    Coordinate::new(lo.x.min(at.x), lo.y.min(at.y), lo.z.min(at.z)),
                    Coordinate::new(hi.x.max(at.x), hi.y.max(at.y), hi.z.max(at.z)),
                ))
            })
    }

    /// The level `character` stands on, `radius` rooms out in each
    /// compass direction.
    pub fn map_around(
        &self,
        character: CharacterId,
        radius: u32,
    ) -> Result<MapView, WorldError> {
        let room = self.room_of(character)?;
        let (zone_id, here) = room.read(|r| (r.zone_id, r.location));
        let r = i64::from(radius);
        let min = Coordinate::new(here.x - r, here.y - r, here.z);
        let max = Coordinate::new(here.x + r, here.y + r, here.z);
        Ok(self.map_between(zone_id, here, min, max))
    }

    /// Every room of the zone `character` is in, all levels.
    pub fn map_zone(&self, character: CharacterId) -> Result<MapView, WorldError> {
        let room = self.room_of(character)?;
        let (zone_id, here) = room.read(|r| (r.zone_id, r.location));
        // The character's own room is in the zone, so there is a box.
        let (min, max) = self.zone_corners(zone_id).unwrap_or((here, here));
        Ok(self.map_between(zone_id, here, min, max))
    }

    fn map_between(
        &self,
        zone_id: Option<ZoneId>,
        here: Coordinate,
        min: Coordinate,
        max: Coordinate,
    ) -> MapView {
        let rooms = self
            .store()
            .rooms_in_zone(zone_id)
            .iter()
            .map(|room| {
                room.read(|r| MapRoom {
                    location: r.location,
                    exits: r.open_exits(),
                })
            })
            .filter(|room| within(min, max, room.location))
            .collect();
        MapView {
            min,
            max,
            here,
            rooms,
        }
    }
}
