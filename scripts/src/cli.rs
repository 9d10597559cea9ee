//! Definitions of CLI arguments and commands for the migration scripts

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{list_networks, migrate, show_deployments},
    config_store::{ConfigStore, FileConfigRepository},
    constants::{DEFAULT_ARTIFACTS_DIR, DEFAULT_CONFIG_PATH, DEFAULT_SECRET_PATH},
    errors::ScriptError,
    networks::{Credentials, NetworkRegistry},
};

/// Deploy the L7 token contracts and record their addresses
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the config document recording deployed addresses
    #[arg(long, env = "CONFIG_PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: PathBuf,

    /// Path to the file holding the deployer's private key
    #[arg(long, env = "SECRET_PATH", default_value = DEFAULT_SECRET_PATH)]
    pub secret_path: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The commands the scripts can run
#[derive(Subcommand)]
pub enum Command {
    /// Run the migrations against a network
    Migrate(MigrateArgs),
    /// List the known networks and whether they can be used
    Networks,
    /// Show the addresses recorded for a network
    Show(ShowArgs),
}

impl Command {
    /// Run the command
    pub async fn run(
        self,
        registry: &NetworkRegistry,
        credentials: &Credentials,
        store: &ConfigStore<FileConfigRepository>,
    ) -> Result<(), ScriptError> {
        match self {
            Command::Migrate(args) => migrate(args, registry, credentials, store).await,
            Command::Networks => {
                list_networks(registry, credentials);
                Ok(())
            }
            Command::Show(args) => show_deployments(args, store),
        }
    }
}

/// Run the migrations against a network
#[derive(Args)]
pub struct MigrateArgs {
    /// Name of the network profile to deploy to
    #[arg(short, long)]
    pub network: String,

    /// RPC URL overriding the network profile's endpoint
    #[arg(short, long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Directory containing the compiled contract artifacts
    #[arg(long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Number of the first migration to run
    #[arg(short, long)]
    pub from: Option<u32>,

    /// Number of the last migration to run
    #[arg(short, long)]
    pub to: Option<u32>,
}

/// Show the addresses recorded for a network
#[derive(Args)]
pub struct ShowArgs {
    /// Name of the network
    #[arg(short, long)]
    pub network: String,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_migrate() {
        let cli = Cli::try_parse_from([
            "l7-scripts",
            "--config-path",
            "out/config.json",
            "migrate",
            "--network",
            "bsc_testnet",
            "--from",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.config_path, PathBuf::from("out/config.json"));
        match cli.command {
            Command::Migrate(args) => {
                assert_eq!(args.network, "bsc_testnet");
                assert_eq!(args.from, Some(3));
                assert_eq!(args.to, None);
            }
            _ => panic!("expected the migrate command"),
        }
    }
}
