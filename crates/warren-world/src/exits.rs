//! Exits and the lock-mirroring protocol.
//!
//! An exit is one side of a connection: room A's north exit and room B's
//! south exit describe the same doorway. Locks are kept in step across
//! both sides by [`World::set_exit_locked`], which writes the two rooms
//! one after the other:
//!
//! ```text
//!   write A.exit[dir]  ─→  publish Lock(A)
//!        │
//!        └─ neighbor B at A.location + dir, same zone?
//!              yes ─→ write B.exit[opposite]  ─→  publish Lock(B)
//!              no  ─→ done (one room, one event)
//! ```
//!
//! The two writes are not a transaction. If the process dies between
//! them, the next lock or unlock of either side puts them back in step,
//! and [`World::find_lock_anomalies`] reports any pair left out of step.

use warren_protocol::{Direction, Event, RoomId};

use crate::{World, WorldError};

/// Two rooms whose facing exits are both open but disagree on `locked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockAnomaly {
    pub room: RoomId,
    pub direction: Direction,
    pub neighbor: RoomId,
}

impl World {
    /// Locks or unlocks the `dir` exit of `room_id` and the facing exit of
    /// its neighbor. Returns the neighbor's id if there was one.
    ///
    /// The flag is written whether or not the exit is open; callers that
    /// only want to lock real doorways check that first.
    pub fn set_exit_locked(
        &self,
        room_id: RoomId,
        dir: Direction,
        locked: bool,
    ) -> Result<Option<RoomId>, WorldError> {
        let room = self.room(room_id)?;
        room.write(|r| r.set_exit_locked(dir, locked));
        self.publish(Event::Lock {
            room_id,
            direction: dir,
            locked,
        });

        let Some(neighbor) = self.neighbor(&room, dir) else {
            tracing::debug!(%room_id, %dir, "no neighbor to mirror lock onto");
            return Ok(None);
        };

        let facing = dir.opposite();
        neighbor.write(|r| r.set_exit_locked(facing, locked));
        self.publish(Event::Lock {
            room_id: neighbor.id(),
            direction: facing,
            locked,
        });
        tracing::debug!(
            %room_id,
            neighbor = %neighbor.id(),
            %dir,
            locked,
            "exit lock mirrored"
        );
        Ok(Some(neighbor.id()))
    }

    /// Opens or closes one side of an exit. The neighbor is untouched.
    pub fn set_exit_enabled(
        &self,
        room_id: RoomId,
        dir: Direction,
        open: bool,
    ) -> Result<(), WorldError> {
        self.room(room_id)?.write(|r| r.set_exit_enabled(dir, open));
        self.publish(Event::RoomUpdate { room_id });
        Ok(())
    }

    /// Flips one side of an exit and returns whether it is now open.
    pub fn toggle_exit(
        &self,
        room_id: RoomId,
        dir: Direction,
    ) -> Result<bool, WorldError> {
        let open = self.room(room_id)?.write(|r| {
            let open = !r.has_exit(dir);
            r.set_exit_enabled(dir, open);
            open
        });
        self.publish(Event::RoomUpdate { room_id });
        Ok(open)
    }

    /// Every pair of mutually open exits whose lock flags disagree. Each
    /// pair is reported once, from the room with the lower id.
    ///
    /// Nothing is repaired; each anomaly is logged at warn.
    pub fn find_lock_anomalies(&self) -> Vec<LockAnomaly> {
        let mut anomalies = Vec::new();
        for room in self.store().rooms() {
            let snapshot = room.snapshot();
            for dir in snapshot.open_exits() {
                let Some(neighbor) = self.neighbor(&room, dir) else {
                    continue;
                };
                if neighbor.id() < snapshot.id {
                    continue;
                }
                let facing = neighbor.read(|r| r.exit(dir.opposite()));
                if facing.open && facing.locked != snapshot.exit(dir).locked {
                    tracing::warn!(
                        room_id = %snapshot.id,
                        neighbor = %neighbor.id(),
                        %dir,
                        "paired exits disagree on lock"
                    );
                    anomalies.push(LockAnomaly {
                        room: snapshot.id,
                        direction: dir,
                        neighbor: neighbor.id(),
                    });
                }
            }
        }
        anomalies
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use warren_bus::EventBus;
    use warren_protocol::Coordinate;
    use warren_store::EntityStore;

    use super::*;

    #[test]
    fn test_toggle_exit_flips_and_reports_state() {
        let world = World::new(Arc::new(EntityStore::in_memory()), EventBus::new());
        let room = world.start_room().unwrap();
        assert!(world.toggle_exit(room.id(), Direction::Up).unwrap());
        assert!(room.read(|r| r.has_exit(Direction::Up)));
        assert!(!world.toggle_exit(room.id(), Direction::Up).unwrap());
        assert!(!room.read(|r| r.has_exit(Direction::Up)));
    }

    #[test]
    fn test_find_lock_anomalies_ignores_half_open_pairs() {
        let world = World::new(Arc::new(EntityStore::in_memory()), EventBus::new());
        let a = world.start_room().unwrap();
        let b = world
            .store()
            .create_room(None, Coordinate::new(1, 0, 0))
            .unwrap();
        a.write(|r| {
            r.set_exit_enabled(Direction::East, true);
            r.set_exit_locked(Direction::East, true);
        });
        // West side closed: not a doorway, so no disagreement.
        b.write(|r| r.set_exit_locked(Direction::West, false));
        assert!(world.find_lock_anomalies().is_empty());
    }
}
