//! `WarrenServer` builder and accept loop.
//!
//! This is the entry point for running a Warren server. It ties together
//! all the layers: transport → session → world → store.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use warren_bus::EventBus;
use warren_protocol::CharacterId;
use warren_session::{KillSwitch, SessionConfig};
use warren_store::{EntityStore, Persistence};
use warren_transport::{TcpTransport, Transport};
#[cfg(feature = "websocket")]
use warren_transport::WebSocketTransport;
use warren_world::World;

use crate::handler::handle_connection;
use crate::WarrenError;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) world: World,
    pub(crate) session_config: SessionConfig,
    /// Characters with a live session, and how to end it.
    online: Mutex<HashMap<CharacterId, KillSwitch>>,
    shutdown: watch::Sender<bool>,
}

impl ServerState {
    /// Records a live session for `character`. Returns `false` if the
    /// character already has one.
    pub(crate) fn claim(
        &self,
        character: CharacterId,
        kill: KillSwitch,
    ) -> bool {
        let mut online = self.online.lock();
        if online.contains_key(&character) {
            return false;
        }
        online.insert(character, kill);
        true
    }

    pub(crate) fn release(&self, character: CharacterId) {
        self.online.lock().remove(&character);
    }
}

/// Builder for configuring and starting a Warren server.
pub struct WarrenServerBuilder {
    bind_addr: String,
    session_config: SessionConfig,
    persistence: Option<Arc<dyn Persistence>>,
}

impl WarrenServerBuilder {
    /// Creates a new builder with default settings: `127.0.0.1:4000`,
    /// default session config, in-memory storage.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:4000".to_string(),
            session_config: SessionConfig::default(),
            persistence: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Loads the world from, and saves it to, `persistence`. Without this
    /// the world lives in memory and is gone on exit.
    pub fn persistence(mut self, persistence: Arc<dyn Persistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Binds a TCP line transport and loads the world.
    pub async fn build(self) -> Result<WarrenServer<TcpTransport>, WarrenError> {
        let transport = TcpTransport::bind(&self.bind_addr).await?;
        self.finish(transport)
    }

    /// Binds a WebSocket transport (one text frame per line) and loads
    /// the world.
    #[cfg(feature = "websocket")]
    pub async fn build_websocket(
        self,
    ) -> Result<WarrenServer<WebSocketTransport>, WarrenError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        self.finish(transport)
    }

    fn finish<T: Transport>(
        self,
        transport: T,
    ) -> Result<WarrenServer<T>, WarrenError> {
        let store = match self.persistence {
            Some(persistence) => EntityStore::load(persistence)?,
            None => EntityStore::in_memory(),
        };
        let world = World::new(Arc::new(store), EventBus::new());
        world.start_room()?;

        let anomalies = world.find_lock_anomalies();
        if !anomalies.is_empty() {
            tracing::warn!(
                count = anomalies.len(),
                "world loaded with lock anomalies"
            );
        }

        let (shutdown, _) = watch::channel(false);
        let state = Arc::new(ServerState {
            world,
            session_config: self.session_config,
            online: Mutex::new(HashMap::new()),
            shutdown,
        });
        Ok(WarrenServer { transport, state })
    }
}

impl Default for WarrenServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Warren server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct WarrenServer<T: Transport> {
    transport: T,
    state: Arc<ServerState>,
}

impl WarrenServer<TcpTransport> {
    /// Creates a new builder.
    pub fn builder() -> WarrenServerBuilder {
        WarrenServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, WarrenError> {
        Ok(self.transport.local_addr()?)
    }
}

#[cfg(feature = "websocket")]
impl WarrenServer<WebSocketTransport> {
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, WarrenError> {
        Ok(self.transport.local_addr()?)
    }
}

impl<T: Transport> WarrenServer<T> {
    pub fn world(&self) -> &World {
        &self.state.world
    }

    /// A handle for stopping the server or kicking players from another
    /// task.
    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Runs the accept loop until [`ServerHandle::shutdown`] is called.
    ///
    /// Each accepted connection gets its own task.
    pub async fn run(mut self) -> Result<(), WarrenError> {
        tracing::info!("Warren server running");
        let mut shutdown = self.state.shutdown.subscribe();

        loop {
            tokio::select! {
                biased;

                _ = stopped(&mut shutdown) => break,

                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }

        if let Err(e) = self.transport.shutdown().await {
            tracing::debug!(error = %e, "transport shutdown failed");
        }
        tracing::info!("Warren server stopped");
        Ok(())
    }
}

async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    // An error means the sender is gone, which also means stop.
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Controls a running server from outside its accept loop. Cloneable.
#[derive(Clone)]
pub struct ServerHandle {
    state: Arc<ServerState>,
}

impl ServerHandle {
    /// Stops accepting connections and ends every live session.
    pub fn shutdown(&self) {
        self.state.shutdown.send_replace(true);
        for kill in self.state.online.lock().values() {
            kill.trigger("server shutting down");
        }
    }

    /// Ends the session of the character called `name`. Returns whether
    /// one was online.
    pub fn kick(&self, name: &str) -> bool {
        let Some(character) = self.state.world.store().character_by_name(name)
        else {
            return false;
        };
        match self.state.online.lock().get(&character.id()) {
            Some(kill) => {
                kill.trigger("kicked");
                true
            }
            None => false,
        }
    }

    /// How many sessions are logged in.
    pub fn online_count(&self) -> usize {
        self.state.online.lock().len()
    }

    pub fn world(&self) -> &World {
        &self.state.world
    }
}
