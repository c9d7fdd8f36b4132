//! `anirent serve` - run the HTTP/SSE server until Ctrl-C.

use std::net::SocketAddr;

use anirent_axum::{CorsConfig, start_server};
use anyhow::Result;

use crate::bootstrap::CliConfig;

/// Serve the API on `addr`.
pub async fn execute(cli: &CliConfig, addr: SocketAddr, cors_origins: Vec<String>) -> Result<()> {
    let config = cli.service_config().with_listen_addr(addr);
    config.validate()?;

    let cors = if cors_origins.is_empty() {
        CorsConfig::AllowAll
    } else {
        CorsConfig::AllowOrigins(cors_origins)
    };

    start_server(config, cors).await
}
