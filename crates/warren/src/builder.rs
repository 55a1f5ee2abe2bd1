//! Builder commands: the `/`-prefixed commands that reshape the world
//! from inside the game.

use warren_protocol::{CharacterId, Coordinate, Direction, ZoneId};
use warren_session::{InputMode, Session};
use warren_transport::Connection;

use crate::color::{self, colorize, Color};
use crate::commands::{split_word, CommandDispatcher};
use crate::handler::validate_name;
use crate::{view, CommandError};

/// `/map` with no argument shows this many rooms out from the player.
const DEFAULT_MAP_RADIUS: u32 = 10;

/// Upper bound for `/map <radius>`.
const MAX_MAP_RADIUS: u32 = 40;

impl CommandDispatcher {
    pub(crate) async fn builder<C: Connection>(
        &self,
        session: &mut Session<C>,
        command: &str,
        args: &str,
    ) -> Result<(), CommandError> {
        let me = session.viewer().character;
        match command {
            "edit" => self.edit(session).await?,
            "exit" => {
                let dir = direction_arg(args, "/exit <dir>")?;
                let open = self.world.toggle_exit(self.here(session)?, dir)?;
                let state = if open { "open" } else { "closed" };
                session
                    .send_line(&format!("The {dir} exit is now {state}."))
                    .await?;
            }
            "dig" => {
                let dir = direction_arg(args, "/dig <dir>")?;
                self.world.dig(me, dir)?;
                self.look_here(session).await?;
            }
            "delete" => {
                let dir = direction_arg(args, "/delete <dir>")?;
                self.world.delete_room_towards(me, dir)?;
                session.send_line("Room destroyed").await?;
            }
            "create" => {
                if args.is_empty() {
                    return Err(CommandError::Usage("/create <item name>"));
                }
                let room = self.here(session)?;
                let item = self.world.create_item_in_room(room, args)?;
                let name = item.read(|i| i.name.clone());
                session.send_line(&format!("Item created: {name}")).await?;
            }
            "destroy" => {
                if args.is_empty() {
                    return Err(CommandError::Usage("/destroy <item name>"));
                }
                self.world.destroy_item(self.here(session)?, args)?;
                session.send_line(&format!("Destroyed {args}")).await?;
            }
            "cash" => {
                let (action, amount) = split_word(args);
                if action != "give" || amount.is_empty() {
                    return Err(CommandError::Usage("/cash give <amount>"));
                }
                let amount: u64 = amount
                    .parse()
                    .map_err(|_| CommandError::BadNumber(amount.to_string()))?;
                self.world.give_cash(me, amount)?;
                session
                    .send_line(&format!("Received: {amount} monies"))
                    .await?;
            }
            "zone" => self.zone(session, args).await?,
            "teleport" | "tel" => self.teleport(session, args).await?,
            "loc" | "location" => {
                let room = self.world.room(self.here(session)?)?;
                let location = room.read(|r| r.location);
                session
                    .send_line(&format!("Current location: {location}"))
                    .await?;
            }
            "roomid" => {
                let room = self.here(session)?;
                session.send_line(&format!("Room ID: {}", room.0)).await?;
            }
            "map" => self.map(session, args).await?,
            "colormode" | "cm" => self.color_mode(session, args).await?,
            "colors" => {
                let mode = self.colors(session);
                for c in Color::ALL {
                    session.send_line(&colorize(mode, c, c.label())).await?;
                }
            }
            "npc" => {
                self.npc_menu(session).await?;
                self.look_here(session).await?;
            }
            "audit" => {
                let anomalies = self.world.find_lock_anomalies();
                if anomalies.is_empty() {
                    session.send_line("No lock anomalies.").await?;
                }
                for a in anomalies {
                    session
                        .send_line(&format!(
                            "{} {} / {} {}: lock flags differ",
                            a.room,
                            a.direction,
                            a.neighbor,
                            a.direction.opposite()
                        ))
                        .await?;
                }
            }
            _ => return Err(CommandError::Unknown(format!("/{command}"))),
        }
        Ok(())
    }

    fn current_zone<C: Connection>(
        &self,
        session: &mut Session<C>,
    ) -> Result<Option<ZoneId>, CommandError> {
        let room = self.world.room(self.here(session)?)?;
        Ok(room.read(|r| r.zone_id))
    }

    /// The room editor menu. Each choice solicits nested input through
    /// the same session, so events keep arriving while the builder types.
    async fn edit<C: Connection>(
        &self,
        session: &mut Session<C>,
    ) -> Result<(), CommandError> {
        loop {
            let room = self.world.room(self.here(session)?)?;
            let (title, exits) =
                room.read(|r| (r.title.clone(), r.open_exits()));
            session
                .send_line(&format!(
                    "\n[1] Title: {title}\n[2] Description\n[3] Exits: {}",
                    view::exits(&exits)
                ))
                .await?;

            let choice = session
                .get_input(InputMode::Clean, "Select (Enter to finish): ")
                .await?;
            match choice.as_str() {
                "" => return Ok(()),
                "1" => {
                    let title = session
                        .get_input(InputMode::Clean, "Enter new title: ")
                        .await?;
                    if !title.is_empty() {
                        self.world.set_room_title(room.id(), &title)?;
                    }
                }
                "2" => {
                    let description = session
                        .get_input(InputMode::Raw, "Enter new description: ")
                        .await?;
                    if !description.trim().is_empty() {
                        self.world
                            .set_room_description(room.id(), &description)?;
                    }
                }
                "3" => self.edit_exits(session).await?,
                other => {
                    session
                        .send_line(&format!("Invalid selection: {other}"))
                        .await?;
                }
            }
        }
    }

    async fn edit_exits<C: Connection>(
        &self,
        session: &mut Session<C>,
    ) -> Result<(), CommandError> {
        loop {
            let room = self.here(session)?;
            let exits = self.world.room(room)?.read(|r| r.open_exits());
            session
                .send_line(&format!("Open exits: {}", view::exits(&exits)))
                .await?;
            let answer = session
                .get_input(
                    InputMode::Clean,
                    "Toggle which exit (Enter to finish): ",
                )
                .await?;
            if answer.is_empty() {
                return Ok(());
            }
            match answer.parse::<Direction>() {
                Ok(dir) => {
                    self.world.toggle_exit(room, dir)?;
                }
                Err(_) => {
                    session
                        .send_line(&format!("'{answer}' is not a direction."))
                        .await?;
                }
            }
        }
    }

    async fn zone<C: Connection>(
        &self,
        session: &mut Session<C>,
        args: &str,
    ) -> Result<(), CommandError> {
        let me = session.viewer().character;
        let (action, name) = split_word(args);
        match action {
            "" => {
                let zone_id = self.current_zone(session)?;
                let line = match self.world.zone_name(zone_id) {
                    Some(name) => format!("Current zone: {name}"),
                    None => "Currently in the null zone".to_string(),
                };
                session.send_line(&line).await?;
            }
            "list" => {
                let names = self.world.zone_names();
                if names.is_empty() {
                    session.send_line("There are no zones.").await?;
                } else {
                    session
                        .send_line(&format!("Zones: {}", names.join(", ")))
                        .await?;
                }
            }
            "new" if !name.is_empty() => {
                self.world.new_zone(me, name)?;
                self.look_here(session).await?;
            }
            "rename" if !name.is_empty() => {
                let zone_id = self.current_zone(session)?;
                self.world.rename_zone(zone_id, name)?;
                session
                    .send_line(&format!("Zone renamed to {name}"))
                    .await?;
            }
            _ => {
                return Err(CommandError::Usage(
                    "/zone [list | new <name> | rename <name>]",
                ));
            }
        }
        Ok(())
    }

    /// `/map [<radius>|all]`: the current level around the player, or
    /// every level of the whole zone.
    async fn map<C: Connection>(
        &self,
        session: &mut Session<C>,
        args: &str,
    ) -> Result<(), CommandError> {
        const USAGE: &str = "/map [<radius> | all]";
        let me = session.viewer().character;
        let map = match args {
            "" => self.world.map_around(me, DEFAULT_MAP_RADIUS)?,
            "all" => self.world.map_zone(me)?,
            radius => match radius.parse::<u32>() {
                Ok(r) if (1..=MAX_MAP_RADIUS).contains(&r) => {
                    self.world.map_around(me, r)?
                }
                _ => return Err(CommandError::Usage(USAGE)),
            },
        };
        let text = view::map(&map, self.colors(session));
        session.send_line(&text).await?;
        Ok(())
    }

    async fn color_mode<C: Connection>(
        &self,
        session: &mut Session<C>,
        args: &str,
    ) -> Result<(), CommandError> {
        const VALID: &str = "Valid color modes are: None, Light, Dark";
        if args.is_empty() {
            let mode = color::mode_label(self.colors(session));
            session
                .send_line(&format!("Current color mode is: {mode}"))
                .await?;
            return Ok(());
        }
        let Some(mode) = color::parse_mode(args) else {
            session.send_line(VALID).await?;
            return Ok(());
        };
        self.world.set_color_mode(session.viewer().character, mode)?;
        session
            .send_line(&format!("Color mode set to: {}", color::mode_label(mode)))
            .await?;
        Ok(())
    }

    /// The NPC menu: make a new NPC here, or pick one to rename, give
    /// something to say, or delete.
    async fn npc_menu<C: Connection>(
        &self,
        session: &mut Session<C>,
    ) -> Result<(), CommandError> {
        let room = self.here(session)?;
        let npcs = self.world.npcs_in(room);
        let mut menu = String::from("\nNPCs\n[n] New");
        for (i, (_, name)) in npcs.iter().enumerate() {
            menu.push_str(&format!("\n[{}] {name}", i + 1));
        }
        session.send_line(&menu).await?;

        let choice = session
            .get_input(InputMode::Clean, "Select (Enter to finish): ")
            .await?;
        if choice.is_empty() {
            return Ok(());
        }
        if choice.eq_ignore_ascii_case("n") {
            if let Some(name) = self.npc_name(session).await? {
                self.world.create_npc(room, &name)?;
                session.send_line(&format!("Created {name}")).await?;
            }
            return Ok(());
        }
        let picked = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| npcs.get(i));
        match picked {
            Some((id, name)) => self.edit_npc(session, *id, name).await,
            None => {
                session
                    .send_line(&format!("Invalid selection: {choice}"))
                    .await?;
                Ok(())
            }
        }
    }

    async fn edit_npc<C: Connection>(
        &self,
        session: &mut Session<C>,
        id: CharacterId,
        name: &str,
    ) -> Result<(), CommandError> {
        session
            .send_line(&format!(
                "\n{name}\n[r] Rename\n[c] Conversation\n[d] Delete"
            ))
            .await?;
        let choice = session
            .get_input(InputMode::Clean, "Select (Enter to finish): ")
            .await?;
        match choice.to_ascii_lowercase().as_str() {
            "" => {}
            "r" => {
                if let Some(new_name) = self.npc_name(session).await? {
                    self.world.rename_npc(id, &new_name)?;
                    session
                        .send_line(&format!("{name} is now {new_name}"))
                        .await?;
                }
            }
            "c" => {
                let text = session
                    .get_input(InputMode::Raw, "What should it say? ")
                    .await?;
                self.world.set_conversation(id, &text)?;
            }
            "d" => {
                self.world.delete_npc(id)?;
                session.send_line(&format!("Deleted {name}")).await?;
            }
            other => {
                session
                    .send_line(&format!("Invalid selection: {other}"))
                    .await?;
            }
        }
        Ok(())
    }

    /// Asks for an unused, valid character name. `None` if the builder
    /// gave up by entering nothing.
    async fn npc_name<C: Connection>(
        &self,
        session: &mut Session<C>,
    ) -> Result<Option<String>, CommandError> {
        loop {
            let name = session
                .get_input(InputMode::Clean, "Desired NPC name: ")
                .await?;
            if name.is_empty() {
                return Ok(None);
            }
            if let Err(reason) = validate_name(&name) {
                session.send_line(&reason).await?;
                continue;
            }
            match self.world.store().character_by_name(&name) {
                Some(_) => session.send_line("That name is unavailable").await?,
                None => return Ok(Some(name)),
            }
        }
    }

    /// `/teleport <x> <y> <z>` moves within the current zone;
    /// `/teleport <zone>` jumps into another zone.
    async fn teleport<C: Connection>(
        &self,
        session: &mut Session<C>,
        args: &str,
    ) -> Result<(), CommandError> {
        let me = session.viewer().character;
        let parts: Vec<&str> = args.split_whitespace().collect();
        match parts.as_slice() {
            [] => {
                return Err(CommandError::Usage("/teleport <zone> | <x> <y> <z>"));
            }
            [x, y, z] if x.parse::<i64>().is_ok() => {
                let location =
                    Coordinate::new(number(x)?, number(y)?, number(z)?);
                let zone_id = self.current_zone(session)?;
                self.world.teleport(me, zone_id, location)?;
            }
            _ => {
                self.world.teleport_to_zone(me, args)?;
            }
        }
        self.look_here(session).await
    }
}

fn direction_arg(
    args: &str,
    usage: &'static str,
) -> Result<Direction, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    Ok(args.parse()?)
}

fn number(text: &str) -> Result<i64, CommandError> {
    text.parse()
        .map_err(|_| CommandError::BadNumber(text.to_string()))
}
