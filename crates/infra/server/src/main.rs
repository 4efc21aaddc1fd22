//! docrelay binary.

use docrelay_server::{RelayServer, load_config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config path: first argument, then DOCRELAY_CONFIG
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("DOCRELAY_CONFIG").ok());
    let config = load_config(path.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let server = RelayServer::new(config)?;
    server.run().await?;

    Ok(())
}
