use clap::Parser;
use l7_scripts::{
    cli::Cli,
    config_store::{ConfigStore, FileConfigRepository},
    errors::ScriptError,
    networks::{Credentials, NetworkRegistry},
};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// The log level used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "info";

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli {
        config_path,
        secret_path,
        command,
    } = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let credentials = Credentials::load(&secret_path);
    let registry = NetworkRegistry::builtin();
    let store = ConfigStore::new(FileConfigRepository::new(config_path));

    command
        .run(&registry, &credentials, &store)
        .await
        .map_err(|e| {
            error!("{e}");
            e
        })
}
