//! Implementations of the various migration commands

use itertools::Itertools;
use tracing::info;

use crate::{
    artifacts::ArtifactStore,
    cli::{MigrateArgs, ShowArgs},
    config_store::{ConfigRepository, ConfigStore, FileConfigRepository},
    deployer::RpcDeployer,
    errors::ScriptError,
    networks::{Credentials, NetworkRegistry},
    runner::{run_migrations, select_migrations, Migration},
    utils::setup_client,
};

/// Run the selected migrations against the given network
pub async fn migrate(
    args: MigrateArgs,
    registry: &NetworkRegistry,
    credentials: &Credentials,
    store: &ConfigStore<FileConfigRepository>,
) -> Result<(), ScriptError> {
    let profile = registry.lookup(&args.network)?;
    let profile = match args.rpc_url {
        Some(rpc_url) => profile.with_endpoint(rpc_url),
        None => profile.clone(),
    };

    let migrations = select_migrations(Migration::all(), args.from, args.to);
    if migrations.is_empty() {
        info!("No migrations selected");
        return Ok(());
    }

    let connection = setup_client(&profile, credentials).await?;
    info!(
        "Deploying to {} (chain {}) from {:#x}: {}",
        profile.name,
        connection.chain_id,
        connection.sender,
        migrations.iter().join(", ")
    );

    let artifacts = ArtifactStore::new(args.artifacts_dir);
    let deployer = RpcDeployer::new(connection, profile.clone(), artifacts);
    let report = run_migrations(&profile.name, &migrations, &deployer, store).await?;

    info!(
        "Recorded {} deployments for {} in {}",
        report.records.len(),
        profile.name,
        store.repository().path().display()
    );

    Ok(())
}

/// Print the known networks and whether the loaded credentials can use them
pub fn list_networks(registry: &NetworkRegistry, credentials: &Credentials) {
    for row in network_rows(registry, credentials) {
        println!("{row}");
    }
}

/// One line per known network, with its chain, endpoint, and usability
fn network_rows(registry: &NetworkRegistry, credentials: &Credentials) -> Vec<String> {
    registry
        .profiles()
        .iter()
        .map(|profile| {
            let status = if profile.is_usable(credentials) {
                "ready"
            } else {
                "unavailable (no credentials)"
            };
            format!(
                "{:<12} chain {:<4} {:<48} {}",
                profile.name, profile.chain_id, profile.endpoint, status
            )
        })
        .collect()
}

/// Print the addresses recorded for a network
pub fn show_deployments(
    args: ShowArgs,
    store: &ConfigStore<FileConfigRepository>,
) -> Result<(), ScriptError> {
    for row in deployment_rows(&args.network, store)? {
        println!("{row}");
    }

    Ok(())
}

/// One line per contract recorded for `network`, or a notice if there are none
fn deployment_rows<R: ConfigRepository>(
    network: &str,
    store: &ConfigStore<R>,
) -> Result<Vec<String>, ScriptError> {
    let deployments = store.deployments(network)?;
    if deployments.is_empty() {
        return Ok(vec![format!("No deployments recorded for {network}")]);
    }

    Ok(deployments
        .into_iter()
        .map(|(contract, address)| format!("{contract:<24} {address}"))
        .collect())
}
