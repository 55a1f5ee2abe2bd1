//! Per-connection handler: login, presence, and the command loop.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Ask for a name → find or create the user and character
//!   2. Register a bus subscription and build the session
//!   3. Claim the character → refuse if it is already connected
//!   4. Announce the login, show the room, run commands until quit
//!   5. Guard drop → release the claim, announce the logout

use std::sync::Arc;
use std::time::Duration;

use warren_protocol::{CharacterId, EntityKind};
use warren_session::{Session, SessionError, Viewer};
use warren_store::{Character, Guarded, StoreError};
use warren_transport::Connection;
use warren_world::{World, WorldError};

use crate::server::ServerState;
use crate::{CommandDispatcher, WarrenError};

/// How long a fresh connection may take to enter a name.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(60);

/// Invalid names allowed before the connection is dropped.
const MAX_LOGIN_ATTEMPTS: usize = 3;

pub(crate) const MAX_NAME_LEN: usize = 20;

const BANNER: &str = "Welcome to Warren!\n";

/// Drop guard that logs a character out when the handler exits, however
/// it exits.
struct PresenceGuard {
    character: CharacterId,
    state: Arc<ServerState>,
}

impl Drop for PresenceGuard {
    fn drop(&mut self) {
        self.state.release(self.character);
        if let Err(e) = self.state.world.logout(self.character) {
            tracing::debug!(
                character = %self.character,
                error = %e,
                "logout failed"
            );
        }
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Connection>(
    conn: C,
    state: Arc<ServerState>,
) -> Result<(), WarrenError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    // --- Step 1: Login ---
    let Some(character) = login(conn.as_ref(), &state).await? else {
        let _ = conn.close().await;
        return Ok(());
    };
    let (name, room) = character.read(|c| (c.name.clone(), c.room_id));

    // --- Step 2: Session ---
    // Register before announcing anything, so nothing is missed.
    let subscription = state.world.bus().register();
    let viewer = Viewer {
        character: character.id(),
        room,
    };
    let mut session = Session::new(
        Arc::clone(&conn),
        subscription,
        viewer,
        state.session_config.clone(),
    );

    // --- Step 3: Claim ---
    if !state.claim(character.id(), session.kill_switch()) {
        tracing::info!(%conn_id, %name, "refused duplicate login");
        session
            .send_line(&format!("{name} is already connected."))
            .await?;
        session.terminate();
        let _ = conn.close().await;
        return Ok(());
    }
    let _guard = PresenceGuard {
        character: character.id(),
        state: Arc::clone(&state),
    };

    // --- Step 4: Play ---
    state.world.login(character.id())?;
    tracing::info!(%conn_id, character = %character.id(), %name, "logged in");

    let dispatcher = CommandDispatcher::new(state.world.clone());
    session.send_line(&format!("Welcome, {name}!")).await?;
    if let Err(e) = dispatcher.look_here(&mut session).await {
        tracing::debug!(error = %e, "initial look failed");
    }
    let result = session.run(&dispatcher).await;

    tracing::info!(%conn_id, %name, "logged out");
    if let Err(SessionError::Terminated(reason)) = &result {
        let _ = conn.send_text(&format!("\nDisconnected: {reason}\n")).await;
    }
    let _ = conn.close().await;
    // _guard drops here → claim released, logout announced.
    match result {
        Ok(()) | Err(SessionError::Terminated(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Asks for a name until a usable one arrives. `None` means the player
/// left, timed out, or ran out of attempts.
async fn login<C: Connection>(
    conn: &C,
    state: &ServerState,
) -> Result<Option<Arc<Guarded<Character>>>, WarrenError> {
    conn.send_text(BANNER).await.map_err(WarrenError::connection)?;

    for _ in 0..MAX_LOGIN_ATTEMPTS {
        conn.send_text("Name: ").await.map_err(WarrenError::connection)?;
        let read = tokio::time::timeout(LOGIN_TIMEOUT, conn.read_line());
        let line = match read.await {
            Ok(Ok(Some(line))) => line,
            Ok(Ok(None)) => return Ok(None),
            Ok(Err(e)) => return Err(WarrenError::connection(e)),
            Err(_) => {
                let _ = conn.send_text("\nTimed out.\n").await;
                return Ok(None);
            }
        };

        let name = line.trim();
        if let Err(reason) = validate_name(name) {
            conn.send_text(&format!("{reason}\n"))
                .await
                .map_err(WarrenError::connection)?;
            continue;
        }

        match character_for(&state.world, name) {
            Ok(character) => return Ok(Some(character)),
            Err(WorldError::Store(StoreError::NameTaken { .. })) => {
                conn.send_text("That name belongs to someone else.\n")
                    .await
                    .map_err(WarrenError::connection)?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let _ = conn.send_text("Too many attempts.\n").await;
    Ok(None)
}

/// Names are 1 to [`MAX_NAME_LEN`] letters or digits.
pub(crate) fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Please enter a name.".to_string());
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!("Names are at most {MAX_NAME_LEN} characters."));
    }
    if !name.chars().all(char::is_alphanumeric) {
        return Err("Names may only contain letters and digits.".to_string());
    }
    Ok(())
}

/// The character played by user `name`, creating the user and a
/// character in the start room the first time.
///
/// A name already used by a character of someone else (an NPC, say) is
/// refused without leaving a user behind.
fn character_for(
    world: &World,
    name: &str,
) -> Result<Arc<Guarded<Character>>, WorldError> {
    let store = world.store();

    let (user, created) = match store.user_by_name(name) {
        Some(user) => (user, false),
        None => {
            if store.character_by_name(name).is_some() {
                return Err(name_taken(name));
            }
            match store.create_user(name) {
                Ok(user) => (user, true),
                // Created by a concurrent first login with the same name.
                Err(StoreError::NameTaken { .. }) => {
                    let user = store
                        .user_by_name(name)
                        .ok_or_else(|| WorldError::CharacterNotFound(name.to_string()))?;
                    (user, false)
                }
                Err(e) => return Err(e.into()),
            }
        }
    };

    if let Some(character) = store.character_of_user(user.id()) {
        return Ok(character);
    }
    let start = world.start_room()?;
    match store.create_character(name, Some(user.id()), start.id()) {
        Ok(character) => Ok(character),
        Err(e) => {
            // A concurrent login may have created the character first.
            if let Some(character) = store.character_of_user(user.id()) {
                return Ok(character);
            }
            if created {
                if let Err(cleanup) = store.delete_user(user.id()) {
                    tracing::warn!(
                        user = %user.id(),
                        error = %cleanup,
                        "orphan user left behind"
                    );
                }
            }
            Err(e.into())
        }
    }
}

fn name_taken(name: &str) -> WorldError {
    WorldError::Store(StoreError::NameTaken {
        kind: EntityKind::Character,
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_accepts_letters_and_digits() {
        assert!(validate_name("Ada99").is_ok());
    }

    #[test]
    fn test_validate_name_rejects_empty_long_and_symbols() {
        assert!(validate_name("").is_err());
        assert!(validate_name(&"a".repeat(MAX_NAME_LEN + 1)).is_err());
        assert!(validate_name("ada lovelace").is_err());
        assert!(validate_name("<script>").is_err());
    }

    fn world() -> World {
        World::new(
            Arc::new(warren_store::EntityStore::in_memory()),
            warren_bus::EventBus::new(),
        )
    }

    #[test]
    fn test_character_for_first_login_creates_user_and_character() {
        let world = world();
        let ada = character_for(&world, "Ada").unwrap();
        let again = character_for(&world, "ada").unwrap();
        assert_eq!(ada.id(), again.id());
        assert!(world.store().user_by_name("Ada").is_some());
    }

    #[test]
    fn test_character_for_npc_name_leaves_no_user() {
        let world = world();
        let start = world.start_room().unwrap();
        world.create_npc(start.id(), "Rat").unwrap();

        let result = character_for(&world, "Rat");

        assert!(matches!(
            result,
            Err(WorldError::Store(StoreError::NameTaken { .. }))
        ));
        assert!(world.store().user_by_name("Rat").is_none());
    }
}
