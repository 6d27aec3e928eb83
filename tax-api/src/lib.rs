pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod routes;
pub mod server;
pub mod utils;

pub use config::{AppConfig, ConfigError, ServerConfig};
pub use error::ApiError;
pub use routes::router;

/// Parses the command line and runs the selected command.
pub async fn run() -> anyhow::Result<()> {
    cli::run().await
}
