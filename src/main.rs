use std::sync::Arc;

use socketd::config::Settings;
use socketd::handler::FileHandler;
use socketd::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(path)?,
        None => Settings::from_env()?,
    };

    let handler = Arc::new(FileHandler::new(settings.files.root.clone()));
    let mut server = Server::new(settings, handler);
    server.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    server.stop().await;

    Ok(())
}
