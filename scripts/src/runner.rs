//! The migration runner, which sequences migrations against a single network

use std::fmt::{self, Display};

use tracing::{debug, info, warn};

use crate::{
    config_store::{ConfigRepository, ConfigStore},
    deployer::Deployer,
    errors::ScriptError,
    plan::ContractFamily,
    types::DeploymentRecord,
};

/// A numbered migration deploying one contract family
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Migration {
    /// The migration's position in the run order
    pub number: u32,
    /// The migration's name
    pub name: &'static str,
    /// The contract family the migration deploys
    pub family: ContractFamily,
}

impl Migration {
    /// All migrations, in run order
    pub fn all() -> Vec<Migration> {
        vec![
            Migration {
                number: 2,
                name: "erc721_migration",
                family: ContractFamily::Erc721,
            },
            Migration {
                number: 3,
                name: "erc1155_migration",
                family: ContractFamily::Erc1155,
            },
        ]
    }
}

impl Display for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.number, self.name)
    }
}

/// The migrations numbered within the inclusive `from..=to` range, in run order
pub fn select_migrations(
    mut migrations: Vec<Migration>,
    from: Option<u32>,
    to: Option<u32>,
) -> Vec<Migration> {
    migrations.sort_by_key(|migration| migration.number);
    migrations.retain(|migration| {
        from.map_or(true, |from| migration.number >= from)
            && to.map_or(true, |to| migration.number <= to)
    });
    migrations
}

/// The deployments recorded by a migration run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Every deployment recorded, in the order it happened
    pub records: Vec<DeploymentRecord>,
}

/// Run a single migration's plan on `network`, appending each recorded deployment to `report`
pub async fn run_migration<D, R>(
    network: &str,
    migration: &Migration,
    deployer: &D,
    store: &ConfigStore<R>,
    report: &mut MigrationReport,
) -> Result<(), ScriptError>
where
    D: Deployer + ?Sized,
    R: ConfigRepository,
{
    info!("Running migration {migration} ({}) on {network}", migration.family);

    for step in migration.family.plan(network) {
        let address = deployer.deploy(&step).await?;
        info!(
            "Main contract ({}) deployed at address {}",
            step.label,
            address.to_checksum(None /* chain_id */)
        );

        let record = DeploymentRecord {
            network: network.to_string(),
            contract_name: step.artifact.to_string(),
            address,
        };
        store.record_deployment(&record)?;
        debug!("recorded {} at {}", record.checksummed_address(), step.config_key(network));
        report.records.push(record);
    }

    Ok(())
}

/// Run `migrations` in order on `network`.
///
/// Stops at the first failure. Contracts deployed and addresses recorded
/// before the failure are left in place.
pub async fn run_migrations<D, R>(
    network: &str,
    migrations: &[Migration],
    deployer: &D,
    store: &ConfigStore<R>,
) -> Result<MigrationReport, ScriptError>
where
    D: Deployer + ?Sized,
    R: ConfigRepository,
{
    let mut report = MigrationReport::default();
    for migration in migrations {
        if let Err(e) = run_migration(network, migration, deployer, store, &mut report).await {
            warn!(
                "Migration {migration} failed after {} recorded deployments; recorded addresses are kept",
                report.records.len()
            );
            return Err(e);
        }
    }

    Ok(report)
}
