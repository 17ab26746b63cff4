use std::io;

use aris_mcp::{ArisServer, ServerConfig, Transport};
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    init_tracing();

    let config = ServerConfig::from_env()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let server = ArisServer::new(&config);
    match config.transport {
        Transport::Stdio => server.serve_stdio(),
        Transport::Http => server.serve_http(&config.http_addr),
    }
}

/// Logs go to stderr; stdout carries the JSON-RPC stream.
fn init_tracing() {
    let filter = std::env::var("ARIS_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
