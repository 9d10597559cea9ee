//! Utilities for the migration scripts.

use alloy::{
    network::Ethereum,
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    transports::http::reqwest::Url,
};
use tokio::time;
use tracing::debug;

use crate::{
    errors::ScriptError,
    networks::{ChainId, Credentials, NetworkProfile},
};

/// The provider type used for deployments
pub type Client = DynProvider<Ethereum>;

/// A checked connection to a network
#[derive(Clone)]
pub struct Connection {
    /// The RPC client, with the deployer's wallet attached if the profile signs locally
    pub client: Client,
    /// The account deployments are sent from
    pub sender: Address,
    /// The chain ID reported by the endpoint
    pub chain_id: u64,
}

/// Sets up the client with which to deploy to the given network.
///
/// Fails if the profile's credentials are unavailable, if the endpoint does not
/// answer within the profile's network check timeout, or if it serves a
/// different chain than the profile expects.
pub async fn setup_client(
    profile: &NetworkProfile,
    credentials: &Credentials,
) -> Result<Connection, ScriptError> {
    let signer = profile.signer(credentials)?;
    let url = Url::parse(&profile.endpoint)
        .map_err(|e| ScriptError::ClientInitialization(format!("{}: {}", profile.endpoint, e)))?;

    let local_sender = signer.as_ref().map(|signer| signer.address());
    let client = match signer {
        Some(signer) => DynProvider::new(ProviderBuilder::new().wallet(signer).connect_http(url)),
        None => DynProvider::new(ProviderBuilder::new().connect_http(url)),
    };

    let chain_id = check_network(&client, profile).await?;
    let sender = match local_sender {
        Some(sender) => sender,
        None => node_account(&client, profile).await?,
    };
    debug!(network = %profile.name, chain_id, sender = %sender, "connected");

    Ok(Connection {
        client,
        sender,
        chain_id,
    })
}

/// Check that the endpoint answers in time and serves the expected chain
async fn check_network(client: &Client, profile: &NetworkProfile) -> Result<u64, ScriptError> {
    let chain_id = time::timeout(profile.network_check_timeout, client.get_chain_id())
        .await
        .map_err(|_| {
            ScriptError::NetworkCheck(format!(
                "{} did not answer within {:?}",
                profile.endpoint, profile.network_check_timeout
            ))
        })?
        .map_err(|e| ScriptError::NetworkCheck(format!("{}: {}", profile.endpoint, e)))?;

    match profile.chain_id {
        ChainId::Id(expected) if expected != chain_id => Err(ScriptError::ChainIdMismatch {
            expected,
            actual: chain_id,
        }),
        _ => Ok(chain_id),
    }
}

/// The first of the node's own accounts, used when the profile has no local signer
async fn node_account(client: &Client, profile: &NetworkProfile) -> Result<Address, ScriptError> {
    let accounts = client
        .get_accounts()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    accounts.first().copied().ok_or_else(|| {
        ScriptError::ProviderUnavailable(format!(
            "network `{}` has no unlocked accounts to deploy from",
            profile.name
        ))
    })
}
