//! The Warren server daemon.
//!
//! Configured from the environment:
//!
//! - `WARREN_BIND`: listen address (default `127.0.0.1:4000`)
//! - `WARREN_DATA_DIR`: directory for the JSON world files; the world is
//!   kept in memory only when unset
//! - `WARREN_TRANSPORT`: `tcp` (default) or `websocket`
//! - `RUST_LOG`: log filter (default `info`)

use std::env;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use warren::prelude::*;

const DEFAULT_BIND: &str = "127.0.0.1:4000";

#[tokio::main]
async fn main() -> Result<(), WarrenError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let bind = env::var("WARREN_BIND").unwrap_or_else(|_| DEFAULT_BIND.into());
    let mut builder = WarrenServer::builder().bind(&bind);
    if let Ok(dir) = env::var("WARREN_DATA_DIR") {
        tracing::info!(%dir, "loading world");
        let persistence = JsonFilePersistence::open(dir)?;
        builder = builder.persistence(Arc::new(persistence));
    }

    match env::var("WARREN_TRANSPORT").as_deref() {
        #[cfg(feature = "websocket")]
        Ok("websocket") | Ok("ws") => {
            let server = builder.build_websocket().await?;
            tracing::info!(addr = %server.local_addr()?, "listening (websocket)");
            stop_on_ctrl_c(server.handle());
            server.run().await
        }
        _ => {
            let server = builder.build().await?;
            tracing::info!(addr = %server.local_addr()?, "listening (tcp)");
            stop_on_ctrl_c(server.handle());
            server.run().await
        }
    }
}

fn stop_on_ctrl_c(handle: ServerHandle) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutting down");
            handle.shutdown();
        }
    });
}
