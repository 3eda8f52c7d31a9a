use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::config::Config;
use crate::http::connection::Connection;

/// Binds the configured port and serves connections until the task is
/// cancelled.
pub async fn run(cfg: Arc<Config>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(cfg.listen_addr()).await?;
    info!("Listening on {}", cfg.listen_addr());

    serve(listener, cfg).await
}

/// Accept loop over an already-bound listener. Split from `run` so tests
/// can bind an ephemeral port.
pub async fn serve(listener: TcpListener, cfg: Arc<Config>) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        debug!("Accepted connection from {}", peer);

        let cfg = cfg.clone();
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, peer, cfg);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
