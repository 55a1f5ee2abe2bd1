//! Text layouts for what commands print.

use warren_protocol::{Coordinate, Direction};
use warren_store::ColorMode;
use warren_world::{MapView, RoomView};

use crate::color::{colorize, Color};

/// A room as shown by `look` and after every move.
pub(crate) fn room(view: &RoomView, mode: ColorMode) -> String {
    let title = colorize(mode, Color::Blue, &view.title);
    let mut out = format!("\n{title}\n\n{}\n", view.description);

    if !view.players.is_empty() || !view.npcs.is_empty() {
        let mut here = view.players.clone();
        here.extend(view.npcs.iter().cloned());
        out.push_str(&format!("\nAlso here: {}\n", here.join(", ")));
    }
    if !view.items.is_empty() {
        let items = colorize(mode, Color::Yellow, &view.items.join(", "));
        out.push_str(&format!("\nItems: {items}\n"));
    }

    let exits = colorize(mode, Color::Cyan, &exits(&view.exits));
    out.push_str(&format!("\nExits: {exits}"));
    out
}

pub(crate) fn exits(exits: &[Direction]) -> String {
    if exits.is_empty() {
        return "None".to_string();
    }
    exits
        .iter()
        .map(|dir| dir.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn inventory(items: &[String], cash: u64) -> String {
    let carried = if items.is_empty() {
        "You aren't carrying anything.".to_string()
    } else {
        format!("You are carrying: {}", items.join(", "))
    };
    format!("{carried}\nCash: {cash}")
}

pub(crate) fn who(names: &[String]) -> String {
    let mut out = String::from("\nOnline\n------\n");
    for name in names {
        out.push_str("  ");
        out.push_str(name);
        out.push('\n');
    }
    out
}

/// What an NPC answers when talked to.
pub(crate) fn conversation(name: &str, text: &str) -> String {
    if text.is_empty() {
        format!("{name} has nothing to say.")
    } else {
        format!("{name} says: \"{text}\"")
    }
}

/// Draws a map, one block per level, north at the top.
///
/// Rooms sit on even columns and rows; the cells between them hold the
/// exits (`|`, `-`, `/`, `\`, or `X` where two diagonals cross). A room
/// is `#`, or `^`, `v`, `%` when it has exits up, down, or both. The
/// viewer is `@`.
pub(crate) fn map(view: &MapView, mode: ColorMode) -> String {
    let width = span(view.min.x, view.max.x);
    let height = span(view.min.y, view.max.y);
    let mut levels = Vec::new();

    for z in view.min.z..=view.max.z {
        let mut grid = vec![vec![' '; width]; height];
        for room in view.rooms.iter().filter(|r| r.location.z == z) {
            let col = cell(view.min.x, room.location.x);
            let row = cell(view.min.y, room.location.y);
            let Some(slot) = grid.get_mut(row).and_then(|line| line.get_mut(col)) else {
                continue;
            };
            *slot = room_symbol(room.location == view.here, &room.exits);

            for dir in &room.exits {
                let Some(link) = link_symbol(*dir) else {
                    continue;
                };
                let (dx, dy, _) = dir.step();
                let (Some(c), Some(r)) = (offset(col, dx), offset(row, dy)) else {
                    continue;
                };
                if let Some(slot) = grid.get_mut(r).and_then(|line| line.get_mut(c)) {
                    *slot = match (*slot, link) {
                        ('/', '\\') | ('\\', '/') => 'X',
                        _ => link,
                    };
                }
            }
        }

        let rows = trim_empty_rows(
            grid.iter()
                .map(|line| {
                    let text: String = line.iter().collect();
                    text.trim_end().to_string()
                })
                .collect(),
        );
        if rows.is_empty() {
            continue;
        }
        let mut block = String::new();
        if view.min.z != view.max.z {
            block.push_str(&format!("Level {z}:\n"));
        }
        let here = colorize(mode, Color::Red, "@");
        block.push_str(&rows.join("\n").replace('@', &here));
        levels.push(block);
    }

    if levels.is_empty() {
        return "Nothing to map.".to_string();
    }
    levels.join("\n\n")
}

/// Grid cells needed for coordinates `min..=max`.
fn span(min: i64, max: i64) -> usize {
    usize::try_from(max - min).map_or(1, |n| n * 2 + 1)
}

fn cell(min: i64, at: i64) -> usize {
    usize::try_from(at - min).map_or(0, |n| n * 2)
}

fn offset(at: usize, delta: i64) -> Option<usize> {
    if delta < 0 {
        at.checked_sub(1)
    } else if delta > 0 {
        Some(at + 1)
    } else {
        Some(at)
    }
}

fn room_symbol(here: bool, exits: &[Direction]) -> char {
    if here {
        return '@';
    }
    let up = exits.contains(&Direction::Up);
    let down = exits.contains(&Direction::Down);
    match (up, down) {
        (true, true) => '%',
        (true, false) => '^',
        (false, true) => 'v',
        (false, false) => '#',
    }
}

fn link_symbol(dir: Direction) -> Option<char> {
    match dir {
        Direction::North | Direction::South => Some('|'),
        Direction::East | Direction::West => Some('-'),
        Direction::NorthEast | Direction::SouthWest => Some('/'),
        Direction::NorthWest | Direction::SouthEast => Some('\\'),
        Direction::Up | Direction::Down => None,
    }
}

fn trim_empty_rows(mut rows: Vec<String>) -> Vec<String> {
    while rows.last().is_some_and(String::is_empty) {
        rows.pop();
    }
    let first = rows.iter().position(|row| !row.is_empty()).unwrap_or(rows.len());
    rows.split_off(first)
}

pub(crate) const HELP: &str = "\
Commands:
  look [dir]         look around, or towards a direction
  n, ne, e, ... u, d move
  inventory          what you carry
  take <item>        pick something up
  drop <item>        put something down
  lock <dir>         lock an exit
  unlock <dir>       unlock an exit
  say <text>         speak to the room
  me <text>          act something out
  broadcast <text>   speak to everyone
  tell <name> <text> whisper to one player
  who                who is online
  attack <name>      start a fight
  stop               stop fighting
  talk <npc>         hear what an NPC has to say
  quit               leave
Builder commands:
  /edit  /exit <dir>  /dig <dir>  /delete <dir>
  /create <item>  /destroy <item>  /cash give <n>
  /zone [list | new <name> | rename <name>]
  /teleport <zone> | <x> <y> <z>
  /map [<radius> | all]  /npc
  /colormode [none | light | dark]  /colors
  /loc  /roomid  /audit";
