//! `--serve` / `--launch` implementation.

use crate::cli::types::ids::GameId;
use crate::error::Result;
use crate::server::{self, ServerConfig};

/// Start the local launcher server; with `launch`, also open a browser on
/// that game once the listener is up.
pub async fn handle_serve(config: ServerConfig, launch: Option<GameId>) -> Result<()> {
    server::run(config, launch).await
}
