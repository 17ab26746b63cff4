pub mod config;
mod metrics;
pub mod protocol;
pub mod server;

pub use config::{ServerConfig, Transport};
pub use server::ArisServer;
