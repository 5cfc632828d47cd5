use anyhow::Result;
use tracing::info;

use karst_uci::UciEngine;

fn main() -> Result<()> {
    // Logs go to stderr; stdout is reserved for the UCI protocol.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    info!("karst starting");

    UciEngine::new().run()?;
    Ok(())
}
