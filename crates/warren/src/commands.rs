//! Text commands.
//!
//! [`CommandDispatcher`] splits a line into a command word and the rest,
//! then calls into the [`World`]. Words starting with `/` are builder
//! commands (see `builder.rs`). Direct feedback goes straight to the
//! player who typed the command; everyone else learns about it through
//! the events the world publishes.

use warren_protocol::{Direction, RoomId};
use warren_session::{Dispatch, Dispatcher, Session};
use warren_store::ColorMode;
use warren_transport::Connection;
use warren_world::World;

use crate::{view, CommandError};

/// Interprets player commands against a shared [`World`].
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    pub(crate) world: World,
}

impl CommandDispatcher {
    pub fn new(world: World) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// The room the player is actually in. Keeps the session's view of it
    /// up to date so room-scoped events render for the right place.
    pub(crate) fn here<C: Connection>(
        &self,
        session: &mut Session<C>,
    ) -> Result<RoomId, CommandError> {
        let me = session.viewer().character;
        let room = self.world.room_of(me)?.id();
        session.set_room(room);
        Ok(room)
    }

    /// The player's color mode, read fresh so `/colormode` applies at once.
    pub(crate) fn colors<C: Connection>(&self, session: &Session<C>) -> ColorMode {
        self.world
            .color_mode(session.viewer().character)
            .unwrap_or_default()
    }

    pub(crate) async fn look_here<C: Connection>(
        &self,
        session: &mut Session<C>,
    ) -> Result<(), CommandError> {
        let room = self.here(session)?;
        let view = self.world.room_view(room, session.viewer().character)?;
        let text = view::room(&view, self.colors(session));
        session.send_line(&text).await?;
        Ok(())
    }

    async fn look<C: Connection>(
        &self,
        session: &mut Session<C>,
        args: &str,
    ) -> Result<(), CommandError> {
        if args.is_empty() {
            return self.look_here(session).await;
        }
        let dir: Direction = args.parse()?;
        let room = self.world.room(self.here(session)?)?;
        match self.world.neighbor(&room, dir) {
            Some(there) => {
                let view = self
                    .world
                    .room_view(there.id(), session.viewer().character)?;
                let text = view::room(&view, self.colors(session));
                session.send_line(&text).await?;
            }
            None => session.send_line("Nothing to see").await?,
        }
        Ok(())
    }

    async fn walk<C: Connection>(
        &self,
        session: &mut Session<C>,
        dir: Direction,
    ) -> Result<(), CommandError> {
        let me = session.viewer().character;
        let room = self.world.move_character(me, dir)?;
        session.set_room(room.id());
        self.look_here(session).await
    }

    async fn set_lock<C: Connection>(
        &self,
        session: &mut Session<C>,
        args: &str,
        locked: bool,
    ) -> Result<(), CommandError> {
        let usage = if locked { "lock <dir>" } else { "unlock <dir>" };
        if args.is_empty() {
            return Err(CommandError::Usage(usage));
        }
        let dir: Direction = args.parse()?;
        let room = self.world.room(self.here(session)?)?;
        if !room.read(|r| r.has_exit(dir)) {
            return Err(CommandError::NoExit(dir));
        }
        // The lock event tells everyone in both rooms, this player
        // included.
        self.world.set_exit_locked(room.id(), dir, locked)?;
        Ok(())
    }

    async fn tell<C: Connection>(
        &self,
        session: &mut Session<C>,
        args: &str,
    ) -> Result<(), CommandError> {
        let (target, message) = split_word(args);
        if target.is_empty() || message.is_empty() {
            return Err(CommandError::Usage("tell <name> <message>"));
        }
        let me = session.viewer().character;
        let name = self.world.tell(me, target, message)?;
        session
            .send_line(&format!("You tell {name}: {message}"))
            .await?;
        Ok(())
    }

    async fn attack<C: Connection>(
        &self,
        session: &mut Session<C>,
        args: &str,
    ) -> Result<(), CommandError> {
        if args.is_empty() {
            return Err(CommandError::Usage("attack <name>"));
        }
        let me = session.viewer().character;
        let defender = self.world.start_fight(me, args)?;
        let name = self.world.character(defender)?.read(|c| c.name.clone());
        session.send_line(&format!("You attack {name}!")).await?;
        Ok(())
    }

    async fn talk<C: Connection>(
        &self,
        session: &mut Session<C>,
        args: &str,
    ) -> Result<(), CommandError> {
        if args.is_empty() {
            return Err(CommandError::Usage("talk <npc name>"));
        }
        self.here(session)?;
        let me = session.viewer().character;
        let (name, text) = self.world.talk(me, args)?;
        session.send_line(&view::conversation(&name, &text)).await?;
        Ok(())
    }

    async fn stop<C: Connection>(
        &self,
        session: &mut Session<C>,
    ) -> Result<(), CommandError> {
        let me = session.viewer().character;
        let defender = self.world.stop_fight(me)?;
        let name = self
            .world
            .store()
            .get_character(defender)
            .map(|c| c.read(|c| c.name.clone()))
            .unwrap_or_else(|| "nobody".to_string());
        session
            .send_line(&format!("You stop attacking {name}."))
            .await?;
        Ok(())
    }
}

impl<C: Connection> Dispatcher<C> for CommandDispatcher {
    type Error = CommandError;

    async fn dispatch(
        &self,
        session: &mut Session<C>,
        line: &str,
    ) -> Result<Dispatch, CommandError> {
        let (command, args) = split_word(line);
        if command.is_empty() {
            return Ok(Dispatch::Continue);
        }
        tracing::debug!(
            character = %session.viewer().character,
            command,
            "dispatch"
        );

        if let Some(builder) = command.strip_prefix('/') {
            self.builder(session, &builder.to_lowercase(), args).await?;
            return Ok(Dispatch::Continue);
        }
        if let Ok(dir) = command.parse::<Direction>() {
            self.walk(session, dir).await?;
            return Ok(Dispatch::Continue);
        }

        let me = session.viewer().character;
        match command.to_lowercase().as_str() {
            "l" | "look" => self.look(session, args).await?,
            "i" | "inv" | "inventory" => {
                let (items, cash) = self.world.inventory(me)?;
                session.send_line(&view::inventory(&items, cash)).await?;
            }
            "take" | "get" => {
                if args.is_empty() {
                    return Err(CommandError::Usage("take <item>"));
                }
                let item = self.world.take_item(me, args)?;
                let name = item.read(|i| i.name.clone());
                session.send_line(&format!("Picked up {name}")).await?;
            }
            "drop" => {
                if args.is_empty() {
                    return Err(CommandError::Usage("drop <item>"));
                }
                let item = self.world.drop_item(me, args)?;
                let name = item.read(|i| i.name.clone());
                session.send_line(&format!("Dropped {name}")).await?;
            }
            "lock" => self.set_lock(session, args, true).await?,
            "unlock" => self.set_lock(session, args, false).await?,
            "say" => {
                self.world.say(me, args)?;
                session.send_line(&format!("You say: {args}")).await?;
            }
            "me" | "emote" => {
                self.world.emote(me, args)?;
                let name = self.world.character(me)?.read(|c| c.name.clone());
                session.send_line(&format!("{name} {args}")).await?;
            }
            "b" | "broadcast" => {
                self.world.broadcast(me, args)?;
                session
                    .send_line(&format!("You broadcast: {args}"))
                    .await?;
            }
            "tell" | "whisper" => self.tell(session, args).await?,
            "who" => {
                session.send_line(&view::who(&self.world.who())).await?;
            }
            "a" | "attack" => self.attack(session, args).await?,
            "stop" => self.stop(session).await?,
            "talk" => self.talk(session, args).await?,
            "help" | "?" => session.send_line(view::HELP).await?,
            "q" | "quit" | "logout" => {
                session.send_line("Take luck!").await?;
                return Ok(Dispatch::Quit);
            }
            _ => return Err(CommandError::Unknown(command.to_string())),
        }
        Ok(Dispatch::Continue)
    }
}

/// Splits off the first whitespace-separated word. Both halves are
/// trimmed; either may be empty.
pub(crate) fn split_word(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    }
}
