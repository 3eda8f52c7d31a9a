use std::sync::Arc;

use minnow::config::Config;
use minnow::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Arc::new(Config::load()?);

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(if cfg.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    tokio::select! {
        res = server::listener::run(cfg.clone()) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
