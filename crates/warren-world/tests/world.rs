//! Integration tests for world operations: the exit-lock protocol,
//! movement, item moves, chat, zones, and combat.

use std::sync::Arc;
use std::thread;

use warren_bus::{EventBus, Subscription};
use warren_protocol::{
    CharacterId, ChatScope, Coordinate, Direction, Event, ItemId, RoomId,
};
use warren_store::{
    Character, ColorMode, EntityStore, Exit, Guarded, Room, StoreError,
    DEFAULT_ITEM_WEIGHT,
};
use warren_world::{LockAnomaly, World, WorldError};

// =========================================================================
// Helpers
// =========================================================================

fn world() -> World {
    World::new(Arc::new(EntityStore::in_memory()), EventBus::new())
}

fn room_at(world: &World, x: i64, y: i64, z: i64) -> Arc<Guarded<Room>> {
    world
        .store()
        .create_room(None, Coordinate::new(x, y, z))
        .unwrap()
}

fn player(world: &World, name: &str, room: RoomId) -> Arc<Guarded<Character>> {
    let user = world.store().create_user(name).unwrap();
    let character = world
        .store()
        .create_character(name, Some(user.id()), room)
        .unwrap();
    world.login(character.id()).unwrap();
    character
}

fn drain(sub: &mut Subscription) -> Vec<Event> {
    std::iter::from_fn(|| sub.try_recv()).collect()
}

/// Two rooms joined east/west with both exits open.
fn corridor(world: &World) -> (Arc<Guarded<Room>>, Arc<Guarded<Room>>) {
    let west = room_at(world, 0, 0, 0);
    let east = room_at(world, 1, 0, 0);
    west.write(|r| r.set_exit_enabled(Direction::East, true));
    east.write(|r| r.set_exit_enabled(Direction::West, true));
    (west, east)
}

// =========================================================================
// Exit-lock protocol
// =========================================================================

#[test]
fn test_set_exit_locked_with_neighbor_locks_both_sides() {
    let world = world();
    let (west, east) = corridor(&world);
    let mut sub = world.bus().register();

    let neighbor = world
        .set_exit_locked(west.id(), Direction::East, true)
        .unwrap();

    assert_eq!(neighbor, Some(east.id()));
    assert!(west.read(|r| r.exit(Direction::East).locked));
    assert!(east.read(|r| r.exit(Direction::West).locked));
    assert_eq!(
        drain(&mut sub),
        vec![
            Event::Lock {
                room_id: west.id(),
                direction: Direction::East,
                locked: true,
            },
            Event::Lock {
                room_id: east.id(),
                direction: Direction::West,
                locked: true,
            },
        ]
    );
}

#[test]
fn test_set_exit_locked_without_neighbor_changes_one_room_one_event() {
    let world = world();
    let room = room_at(&world, 0, 0, 0);
    room.write(|r| r.set_exit_enabled(Direction::Up, true));
    let mut sub = world.bus().register();

    let neighbor = world.set_exit_locked(room.id(), Direction::Up, true).unwrap();

    assert_eq!(neighbor, None);
    assert!(room.read(|r| r.exit(Direction::Up).locked));
    assert_eq!(drain(&mut sub).len(), 1);
}

#[test]
fn test_set_exit_locked_ignores_rooms_in_other_zones() {
    let world = world();
    let zone = world.create_zone("Elsewhere").unwrap();
    let here = room_at(&world, 0, 0, 0);
    let there = world
        .store()
        .create_room(Some(zone.id()), Coordinate::new(0, -1, 0))
        .unwrap();

    let neighbor = world
        .set_exit_locked(here.id(), Direction::North, true)
        .unwrap();

    assert_eq!(neighbor, None);
    assert!(!there.read(|r| r.exit(Direction::South).locked));
}

#[test]
fn test_set_exit_locked_then_unlocked_leaves_no_anomaly() {
    let world = world();
    let (west, _) = corridor(&world);
    world.set_exit_locked(west.id(), Direction::East, true).unwrap();
    world.set_exit_locked(west.id(), Direction::East, false).unwrap();
    assert!(world.find_lock_anomalies().is_empty());
}

#[test]
fn test_find_lock_anomalies_reports_half_written_lock_once() {
    let world = world();
    let (west, east) = corridor(&world);
    // A lock that only reached one side.
    west.write(|r| r.set_exit_locked(Direction::East, true));

    assert_eq!(
        world.find_lock_anomalies(),
        vec![LockAnomaly {
            room: west.id(),
            direction: Direction::East,
            neighbor: east.id(),
        }]
    );

    // Locking again from the other side heals it.
    world.set_exit_locked(east.id(), Direction::West, true).unwrap();
    assert!(world.find_lock_anomalies().is_empty());
}

// =========================================================================
// Movement
// =========================================================================

#[test]
fn test_move_character_through_open_exit_publishes_leave_and_enter() {
    let world = world();
    let (west, east) = corridor(&world);
    let ada = player(&world, "Ada", west.id());
    let mut sub = world.bus().register();

    let to = world.move_character(ada.id(), Direction::East).unwrap();

    assert_eq!(to.id(), east.id());
    assert_eq!(ada.read(|c| c.room_id), east.id());
    assert_eq!(
        drain(&mut sub),
        vec![
            Event::Leave {
                character: ada.id(),
                name: "Ada".into(),
                room_id: west.id(),
                to: Some(Direction::East),
            },
            Event::Enter {
                character: ada.id(),
                name: "Ada".into(),
                room_id: east.id(),
                from: Some(Direction::West),
            },
        ]
    );
}

#[test]
fn test_move_character_closed_exit_returns_no_exit() {
    let world = world();
    let (west, _) = corridor(&world);
    let ada = player(&world, "Ada", west.id());

    let err = world.move_character(ada.id(), Direction::North).unwrap_err();

    assert!(matches!(err, WorldError::NoExit(Direction::North)));
    assert_eq!(err.to_string(), "You can't go that way.");
    assert_eq!(ada.read(|c| c.room_id), west.id());
}

#[test]
fn test_move_character_locked_exit_returns_locked() {
    let world = world();
    let (west, _) = corridor(&world);
    let ada = player(&world, "Ada", west.id());
    world.set_exit_locked(west.id(), Direction::East, true).unwrap();

    let err = world.move_character(ada.id(), Direction::East).unwrap_err();

    assert!(matches!(err, WorldError::ExitLocked(Direction::East)));
    assert_eq!(ada.read(|c| c.room_id), west.id());
}

#[test]
fn test_move_character_exit_into_nothing_returns_no_room() {
    let world = world();
    let room = room_at(&world, 0, 0, 0);
    room.write(|r| r.set_exit_enabled(Direction::Down, true));
    let ada = player(&world, "Ada", room.id());

    let err = world.move_character(ada.id(), Direction::Down).unwrap_err();

    assert!(matches!(err, WorldError::NoRoomThere(Direction::Down)));
}

#[test]
fn test_dig_creates_room_opens_both_sides_and_moves() {
    let world = world();
    let start = world.start_room().unwrap();
    let ada = player(&world, "Ada", start.id());

    let dug = world.dig(ada.id(), Direction::North).unwrap();

    assert_eq!(dug.read(|r| r.location), Coordinate::new(0, -1, 0));
    assert!(start.read(|r| r.has_exit(Direction::North)));
    assert!(dug.read(|r| r.has_exit(Direction::South)));
    assert_eq!(ada.read(|c| c.room_id), dug.id());
}

#[test]
fn test_dig_into_existing_room_reuses_it() {
    let world = world();
    let start = world.start_room().unwrap();
    let existing = room_at(&world, 1, 0, 0);
    let ada = player(&world, "Ada", start.id());

    let dug = world.dig(ada.id(), Direction::East).unwrap();

    assert_eq!(dug.id(), existing.id());
    assert_eq!(world.store().rooms().len(), 2);
}

#[test]
fn test_teleport_to_empty_spot_creates_room_and_vanishes() {
    let world = world();
    let start = world.start_room().unwrap();
    let ada = player(&world, "Ada", start.id());
    let mut sub = world.bus().register();

    let to = world
        .teleport(ada.id(), None, Coordinate::new(5, 5, 5))
        .unwrap();

    assert_eq!(to.read(|r| r.location), Coordinate::new(5, 5, 5));
    let events = drain(&mut sub);
    assert!(matches!(events[0], Event::Leave { to: None, .. }));
    assert!(matches!(events[1], Event::Enter { from: None, .. }));
}

#[test]
fn test_teleport_to_zone_same_zone_is_refused() {
    let world = world();
    let start = world.start_room().unwrap();
    let ada = player(&world, "Ada", start.id());
    world.new_zone(ada.id(), "Caves").unwrap();

    assert!(matches!(
        world.teleport_to_zone(ada.id(), "caves"),
        Err(WorldError::AlreadyInZone)
    ));
    assert!(matches!(
        world.teleport_to_zone(ada.id(), "Nowhere"),
        Err(WorldError::ZoneNotFound(_))
    ));
}

#[test]
fn test_delete_room_closes_facing_exits() {
    let world = world();
    let (west, east) = corridor(&world);
    let ada = player(&world, "Ada", west.id());

    let deleted = world.delete_room_towards(ada.id(), Direction::East).unwrap();

    assert_eq!(deleted, east.id());
    assert!(world.store().get_room(east.id()).is_none());
    assert!(!west.read(|r| r.has_exit(Direction::East)));
}

#[test]
fn test_delete_room_with_occupant_is_refused() {
    let world = world();
    let (west, east) = corridor(&world);
    player(&world, "Bo", east.id());

    assert!(matches!(
        world.delete_room(east.id()),
        Err(WorldError::RoomOccupied(_))
    ));
    assert!(west.read(|r| r.has_exit(Direction::East)));
}

#[test]
fn test_dig_through_locked_exit_changes_nothing() {
    let world = world();
    let start = world.start_room().unwrap();
    let ada = player(&world, "Ada", start.id());
    start.write(|r| {
        r.set_exit_enabled(Direction::East, true);
        r.set_exit_locked(Direction::East, true);
    });

    let result = world.dig(ada.id(), Direction::East);

    assert!(matches!(result, Err(WorldError::ExitLocked(Direction::East))));
    assert!(world
        .store()
        .room_by_location(Coordinate::new(1, 0, 0), None)
        .is_none());
    assert_eq!(ada.read(|c| c.room_id), start.id());
    assert!(world.find_lock_anomalies().is_empty());
}

#[test]
fn test_delete_room_clears_facing_lock_so_dig_pairs_cleanly() {
    let world = world();
    let start = world.start_room().unwrap();
    let ada = player(&world, "Ada", start.id());
    world.dig(ada.id(), Direction::East).unwrap();
    world.move_character(ada.id(), Direction::West).unwrap();
    world
        .set_exit_locked(start.id(), Direction::East, true)
        .unwrap();

    world
        .delete_room_towards(ada.id(), Direction::East)
        .unwrap();
    assert_eq!(
        start.read(|r| r.exit(Direction::East)),
        Exit { open: false, locked: false }
    );

    let dug = world.dig(ada.id(), Direction::East).unwrap();
    assert_eq!(dug.read(|r| r.exit(Direction::West)), Exit { open: true, locked: false });
    assert!(world.find_lock_anomalies().is_empty());
}

#[test]
fn test_dig_into_room_with_stale_lock_unlocks_far_side() {
    let world = world();
    let start = world.start_room().unwrap();
    let far = room_at(&world, 1, 0, 0);
    far.write(|r| r.set_exit_locked(Direction::West, true));
    let ada = player(&world, "Ada", start.id());
    let mut sub = world.bus().register();

    world.dig(ada.id(), Direction::East).unwrap();

    assert_eq!(far.read(|r| r.exit(Direction::West)), Exit { open: true, locked: false });
    assert!(drain(&mut sub).contains(&Event::Lock {
        room_id: far.id(),
        direction: Direction::West,
        locked: false,
    }));
    assert!(world.find_lock_anomalies().is_empty());
}

#[test]
fn test_room_of_deleted_room_moves_character_to_start() {
    let world = world();
    let (west, east) = corridor(&world);
    let bo = player(&world, "Bo", east.id());
    // Bypasses the occupancy check, as a move racing the delete would.
    world.store().delete_room(east.id()).unwrap();
    let mut sub = world.bus().register();

    let room = world.room_of(bo.id()).unwrap();

    assert_eq!(room.id(), west.id());
    assert_eq!(bo.read(|c| c.room_id), west.id());
    assert!(matches!(
        drain(&mut sub).as_slice(),
        [Event::Enter { from: None, .. }]
    ));
    // Teleport works again from there.
    world
        .teleport(bo.id(), None, Coordinate::new(3, 3, 0))
        .unwrap();
}

// =========================================================================
// Items
// =========================================================================

#[test]
fn test_take_item_over_capacity_is_refused() {
    let world = world();
    let room = world.start_room().unwrap();
    let ada = player(&world, "Ada", room.id());
    ada.write(|c| c.capacity = 5);
    let anvil = world.create_item_in_room(room.id(), "anvil").unwrap();
    anvil.write(|i| {
        i.properties.insert("weight".into(), "6".into());
    });

    assert!(matches!(
        world.take_item(ada.id(), "anvil"),
        Err(WorldError::TooHeavy(_))
    ));
    assert_eq!(room.read(|r| r.items.clone()), vec![anvil.id()]);
    assert!(ada.read(|c| c.items.is_empty() && c.weight == 0));
}

#[test]
fn test_take_then_drop_tracks_weight() {
    let world = world();
    let room = world.start_room().unwrap();
    let ada = player(&world, "Ada", room.id());
    let rope = world.create_item_in_room(room.id(), "rope").unwrap();
    rope.write(|i| {
        i.properties.insert("weight".into(), "4".into());
    });
    world.create_item_in_room(room.id(), "coin").unwrap();

    world.take_item(ada.id(), "rope").unwrap();
    world.take_item(ada.id(), "coin").unwrap();
    assert_eq!(ada.read(|c| c.weight), 4 + DEFAULT_ITEM_WEIGHT);

    world.drop_item(ada.id(), "rope").unwrap();
    assert_eq!(ada.read(|c| c.weight), DEFAULT_ITEM_WEIGHT);
}

#[test]
fn test_take_item_ends_in_inventory_only() {
    let world = world();
    let room = world.start_room().unwrap();
    let ada = player(&world, "Ada", room.id());
    let lamp = world.create_item_in_room(room.id(), "lamp").unwrap();

    world.take_item(ada.id(), "LAMP").unwrap();

    assert!(room.read(|r| r.items.is_empty()));
    assert_eq!(ada.read(|c| c.items.clone()), vec![lamp.id()]);
}

#[test]
fn test_drop_item_not_carried_returns_not_carrying() {
    let world = world();
    let room = world.start_room().unwrap();
    let ada = player(&world, "Ada", room.id());

    assert!(matches!(
        world.drop_item(ada.id(), "lamp"),
        Err(WorldError::NotCarrying(_))
    ));
}

#[test]
fn test_take_item_concurrently_only_one_taker_wins() {
    let world = world();
    let room = world.start_room().unwrap();
    let players: Vec<CharacterId> = (0..8)
        .map(|n| player(&world, &format!("P{n}"), room.id()).id())
        .collect();
    let gem = world.create_item_in_room(room.id(), "gem").unwrap();

    let winners: usize = thread::scope(|s| {
        let handles: Vec<_> = players
            .iter()
            .map(|id| {
                let world = world.clone();
                s.spawn(move || world.take_item(*id, "gem").is_ok())
            })
            .collect();
        handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum()
    });

    assert_eq!(winners, 1);
    let holders = players
        .iter()
        .filter(|id| {
            world
                .character(**id)
                .unwrap()
                .read(|c| c.items.contains(&gem.id()))
        })
        .count();
    assert_eq!(holders, 1);
    assert!(room.read(|r| r.items.is_empty()));
}

#[test]
fn test_take_item_mid_move_is_visible_in_one_container() {
    let world = world();
    let room = world.start_room().unwrap();
    let ada = player(&world, "Ada", room.id());
    ada.write(|c| c.capacity = 1_000);
    let gems: Vec<ItemId> = (0..200)
        .map(|_| world.create_item_in_room(room.id(), "gem").unwrap().id())
        .collect();

    thread::scope(|s| {
        let mover = world.clone();
        let id = ada.id();
        s.spawn(move || {
            for _ in 0..200 {
                mover.take_item(id, "gem").unwrap();
            }
        });

        for _ in 0..50 {
            for gem in &gems {
                // Source first: once it has left the room it must already
                // be carried.
                let on_floor = room.read(|r| r.items.contains(gem));
                let carried = ada.read(|c| c.items.contains(gem));
                assert!(on_floor || carried, "{gem} vanished mid-move");
            }
        }
    });

    assert!(room.read(|r| r.items.is_empty()));
    assert_eq!(ada.read(|c| c.items.len()), gems.len());
}

#[test]
fn test_destroy_item_keeps_other_items() {
    let world = world();
    let room = world.start_room().unwrap();
    let keep = world.create_item_in_room(room.id(), "cup").unwrap();
    world.create_item_in_room(room.id(), "plate").unwrap();

    let gone = world.destroy_item(room.id(), "plate").unwrap();

    assert_eq!(room.read(|r| r.items.clone()), vec![keep.id()]);
    assert!(world.store().get_item(gone).is_none());
    assert!(world.store().items(&[gone, keep.id()]).len() == 1);
}

// =========================================================================
// Chat, cash, zones, combat
// =========================================================================

#[test]
fn test_tell_offline_target_returns_not_online() {
    let world = world();
    let room = world.start_room().unwrap();
    let ada = player(&world, "Ada", room.id());
    let bo = player(&world, "Bo", room.id());
    world.logout(bo.id()).unwrap();

    assert!(matches!(
        world.tell(ada.id(), "bo", "hi"),
        Err(WorldError::NotOnline(name)) if name == "Bo"
    ));
    assert!(matches!(
        world.tell(ada.id(), "nobody", "hi"),
        Err(WorldError::CharacterNotFound(_))
    ));
}

#[test]
fn test_say_publishes_room_scoped_chat() {
    let world = world();
    let room = world.start_room().unwrap();
    let ada = player(&world, "Ada", room.id());
    let mut sub = world.bus().register();

    world.say(ada.id(), "  hello  ").unwrap();
    assert!(matches!(world.say(ada.id(), "   "), Err(WorldError::EmptyMessage)));

    assert_eq!(
        drain(&mut sub),
        vec![Event::Chat {
            scope: ChatScope::Say(room.id()),
            from: ada.id(),
            from_name: "Ada".into(),
            message: "hello".into(),
        }]
    );
}

#[test]
fn test_give_cash_accumulates() {
    let world = world();
    let room = world.start_room().unwrap();
    let ada = player(&world, "Ada", room.id());

    world.give_cash(ada.id(), 10).unwrap();
    assert_eq!(world.give_cash(ada.id(), 5).unwrap(), 15);
    assert_eq!(world.inventory(ada.id()).unwrap(), (vec![], 15));
}

#[test]
fn test_rename_null_zone_moves_its_rooms() {
    let world = world();
    let a = room_at(&world, 0, 0, 0);
    let b = room_at(&world, 1, 0, 0);

    let zone = world.rename_zone(None, "Meadow").unwrap();

    assert_eq!(a.read(|r| r.zone_id), Some(zone));
    assert_eq!(b.read(|r| r.zone_id), Some(zone));
    assert!(world.store().rooms_in_zone(None).is_empty());
    assert_eq!(world.zone_name(Some(zone)).as_deref(), Some("Meadow"));
}

#[test]
fn test_rename_zone_to_taken_name_is_refused() {
    let world = world();
    world.create_zone("Caves").unwrap();
    let other = world.create_zone("Hills").unwrap();

    assert!(world.rename_zone(Some(other.id()), "caves").is_err());
    assert_eq!(world.zone_names(), vec!["Caves".to_string(), "Hills".to_string()]);
}

#[test]
fn test_start_fight_validates_target() {
    let world = world();
    let room = world.start_room().unwrap();
    let ada = player(&world, "Ada", room.id());
    let ghost = player(&world, "Ghost", room.id());
    ghost.write(|c| c.hitpoints = 0);
    let far = room_at(&world, 9, 9, 9);
    player(&world, "Far", far.id());

    assert!(matches!(world.start_fight(ada.id(), "ada"), Err(WorldError::SelfTarget)));
    assert!(matches!(world.start_fight(ada.id(), "ghost"), Err(WorldError::TargetDead(_))));
    assert!(matches!(world.start_fight(ada.id(), "far"), Err(WorldError::NotHere(_))));
    assert!(matches!(
        world.start_fight(ada.id(), "nobody"),
        Err(WorldError::CharacterNotFound(_))
    ));
    assert_eq!(world.fighting(ada.id()), None);
}

#[test]
fn test_fight_start_then_stop_publishes_both() {
    let world = world();
    let room = world.start_room().unwrap();
    let ada = player(&world, "Ada", room.id());
    let bo = player(&world, "Bo", room.id());
    let mut sub = world.bus().register();

    world.start_fight(ada.id(), "Bo").unwrap();
    assert_eq!(world.fighting(ada.id()), Some(bo.id()));
    assert_eq!(world.stop_fight(ada.id()).unwrap(), bo.id());
    assert!(matches!(world.stop_fight(ada.id()), Err(WorldError::NotFighting)));

    let events = drain(&mut sub);
    assert!(matches!(events[0], Event::CombatStart { .. }));
    assert!(matches!(events[1], Event::CombatStop { .. }));
}

#[test]
fn test_logout_ends_fights_on_both_sides() {
    let world = world();
    let room = world.start_room().unwrap();
    let ada = player(&world, "Ada", room.id());
    let bo = player(&world, "Bo", room.id());
    world.start_fight(ada.id(), "Bo").unwrap();
    world.start_fight(bo.id(), "Ada").unwrap();

    world.logout(bo.id()).unwrap();

    assert_eq!(world.fighting(ada.id()), None);
    assert_eq!(world.fighting(bo.id()), None);
}

// =========================================================================
// NPCs
// =========================================================================

#[test]
fn test_create_npc_shows_in_room_view_but_not_who() {
    let world = world();
    let room = world.start_room().unwrap();
    let ada = player(&world, "Ada", room.id());

    let rat = world.create_npc(room.id(), "Rat").unwrap();

    assert!(rat.read(|c| c.is_npc()));
    let view = world.room_view(room.id(), ada.id()).unwrap();
    assert_eq!(view.npcs, vec!["Rat".to_string()]);
    assert_eq!(world.who(), vec!["Ada".to_string()]);
}

#[test]
fn test_create_npc_with_player_name_is_refused() {
    let world = world();
    let room = world.start_room().unwrap();
    player(&world, "Ada", room.id());

    assert!(matches!(
        world.create_npc(room.id(), "ada"),
        Err(WorldError::Store(StoreError::NameTaken { .. }))
    ));
}

#[test]
fn test_talk_returns_conversation_of_npc_here() {
    let world = world();
    let room = world.start_room().unwrap();
    let ada = player(&world, "Ada", room.id());
    let sage = world.create_npc(room.id(), "Sage").unwrap();
    world.set_conversation(sage.id(), "  Mind the grue.  ").unwrap();

    assert_eq!(
        world.talk(ada.id(), "sage").unwrap(),
        ("Sage".to_string(), "Mind the grue.".to_string())
    );
    assert!(matches!(
        world.talk(ada.id(), "Ghost"),
        Err(WorldError::NotHere(_))
    ));
}

#[test]
fn test_talk_to_player_is_not_here() {
    let world = world();
    let room = world.start_room().unwrap();
    let ada = player(&world, "Ada", room.id());
    player(&world, "Bo", room.id());

    assert!(matches!(
        world.talk(ada.id(), "Bo"),
        Err(WorldError::NotHere(_))
    ));
}

#[test]
fn test_rename_and_delete_npc_refuse_players() {
    let world = world();
    let room = world.start_room().unwrap();
    let ada = player(&world, "Ada", room.id());

    assert!(matches!(
        world.rename_npc(ada.id(), "Eve"),
        Err(WorldError::NotAnNpc(_))
    ));
    assert!(matches!(world.delete_npc(ada.id()), Err(WorldError::NotAnNpc(_))));
}

#[test]
fn test_delete_npc_drops_its_items_and_ends_fights() {
    let world = world();
    let room = world.start_room().unwrap();
    let ada = player(&world, "Ada", room.id());
    let rat = world.create_npc(room.id(), "Rat").unwrap();
    let cheese = world.create_item_in_room(room.id(), "cheese").unwrap();
    world.take_item(rat.id(), "cheese").unwrap();
    world.start_fight(ada.id(), "Rat").unwrap();

    world.delete_npc(rat.id()).unwrap();

    assert!(world.store().get_character(rat.id()).is_none());
    assert_eq!(room.read(|r| r.items.clone()), vec![cheese.id()]);
    assert!(matches!(world.stop_fight(ada.id()), Err(WorldError::NotFighting)));
}

#[test]
fn test_rename_npc_updates_name_index() {
    let world = world();
    let room = world.start_room().unwrap();
    let rat = world.create_npc(room.id(), "Rat").unwrap();

    world.rename_npc(rat.id(), "Mouse").unwrap();

    assert!(world.store().character_by_name("Rat").is_none());
    assert_eq!(world.npcs_in(room.id()), vec![(rat.id(), "Mouse".to_string())]);
}

// =========================================================================
// Map
// =========================================================================

#[test]
fn test_zone_corners_spans_all_rooms() {
    let world = world();
    world.start_room().unwrap();
    room_at(&world, -3, 2, 0);
    room_at(&world, 4, -1, 2);

    assert_eq!(
        world.zone_corners(None),
        Some((Coordinate::new(-3, -1, 0), Coordinate::new(4, 2, 2)))
    );
}

#[test]
fn test_zone_corners_of_empty_zone_is_none() {
    let world = world();
    let zone = world.create_zone("Empty").unwrap();
    assert_eq!(world.zone_corners(Some(zone.id())), None);
}

#[test]
fn test_map_around_keeps_one_level_within_radius() {
    let world = world();
    let start = world.start_room().unwrap();
    let ada = player(&world, "Ada", start.id());
    room_at(&world, 1, 1, 0);
    room_at(&world, 3, 0, 0);
    room_at(&world, 0, 0, 1);

    let map = world.map_around(ada.id(), 2).unwrap();

    let mut seen: Vec<Coordinate> = map.rooms.iter().map(|r| r.location).collect();
    seen.sort_by_key(|c| (c.x, c.y));
    assert_eq!(seen, vec![Coordinate::new(0, 0, 0), Coordinate::new(1, 1, 0)]);
    assert_eq!(map.here, Coordinate::new(0, 0, 0));
}

#[test]
fn test_map_zone_covers_every_level() {
    let world = world();
    let start = world.start_room().unwrap();
    let ada = player(&world, "Ada", start.id());
    room_at(&world, 0, 0, 1);
    room_at(&world, 9, 9, 0);

    let map = world.map_zone(ada.id()).unwrap();

    assert_eq!(map.rooms.len(), 3);
    assert_eq!(map.max, Coordinate::new(9, 9, 1));
}

// =========================================================================
// Preferences
// =========================================================================

#[test]
fn test_set_color_mode_persists_on_user() {
    let world = world();
    let room = world.start_room().unwrap();
    let ada = player(&world, "Ada", room.id());
    assert_eq!(world.color_mode(ada.id()).unwrap(), ColorMode::None);

    world.set_color_mode(ada.id(), ColorMode::Dark).unwrap();

    assert_eq!(world.color_mode(ada.id()).unwrap(), ColorMode::Dark);
    let user = world.store().user_by_name("Ada").unwrap();
    assert_eq!(user.read(|u| u.color_mode), ColorMode::Dark);
}
