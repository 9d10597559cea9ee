//! The network profile registry and the deployer credentials the profiles sign with

use std::{
    fmt::{self, Display},
    fs,
    path::Path,
    str::FromStr,
    time::Duration,
};

use alloy::signers::local::PrivateKeySigner;
use tracing::warn;

use crate::{
    constants::{
        BSC_MAINNET_CHAIN_ID, BSC_MAINNET_RPC_URL, BSC_TESTNET_CHAIN_ID, BSC_TESTNET_NETWORK,
        BSC_TESTNET_RPC_URL, DEFAULT_NETWORK_CHECK_TIMEOUT, DEFAULT_TIMEOUT_BLOCKS,
        DEVELOPMENT_NETWORK, DEVELOPMENT_RPC_URL, KOVAN_CHAIN_ID, KOVAN_NETWORK, KOVAN_RPC_URL,
        PRODUCTION_NETWORK,
    },
    errors::ScriptError,
};

// ---------------
// | Credentials |
// ---------------

/// The deployer key, loaded once from the secret file at startup
#[derive(Clone, Debug, Default)]
pub struct Credentials {
    /// The deployer's signer, absent if the secret could not be loaded
    signer: Option<PrivateKeySigner>,
}

impl Credentials {
    /// Load credentials from the secret file at `path`.
    ///
    /// Never fails: a missing or malformed secret is logged, and the profiles
    /// depending on it become unusable for the rest of the process.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!("{e}; networks requiring credentials will be unavailable");
                Self::default()
            }
        }
    }

    /// Load credentials from the secret file at `path`, which holds a hex private key
    pub fn try_load(path: &Path) -> Result<Self, ScriptError> {
        let secret = fs::read_to_string(path)
            .map_err(|e| ScriptError::ReadSecret(format!("{}: {}", path.display(), e)))?;
        let signer = PrivateKeySigner::from_str(secret.trim()).map_err(|e| {
            ScriptError::ReadSecret(format!("{}: invalid private key: {}", path.display(), e))
        })?;

        Ok(Self::from_signer(signer))
    }

    /// Credentials wrapping an existing signer
    pub fn from_signer(signer: PrivateKeySigner) -> Self {
        Self {
            signer: Some(signer),
        }
    }

    /// The deployer's signer, if the secret was loaded
    pub fn signer(&self) -> Option<&PrivateKeySigner> {
        self.signer.as_ref()
    }
}

// --------------------
// | Network Profiles |
// --------------------

/// Where a network profile gets its signing key from
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CredentialsSource {
    /// Transactions are signed by the node's own unlocked accounts
    None,
    /// Transactions are signed with the key from the shared secret file
    SharedSecret,
}

/// The chain a network profile expects its endpoint to serve
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChainId {
    /// Any chain is accepted
    Any,
    /// Exactly this EIP-155 chain ID
    Id(u64),
}

impl Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainId::Any => write!(f, "*"),
            ChainId::Id(id) => write!(f, "{}", id),
        }
    }
}

/// Connection and signing parameters for one network
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkProfile {
    /// The unique name operators select the network by
    pub name: String,
    /// The RPC endpoint
    pub endpoint: String,
    /// Where the signing key comes from
    pub credentials: CredentialsSource,
    /// The chain the endpoint must serve
    pub chain_id: ChainId,
    /// Blocks to wait on top of the inclusion block before a deployment counts as done
    pub confirmations: u64,
    /// Gas limit override for deployment transactions
    pub gas_limit: Option<u64>,
    /// Gas price override for deployment transactions, in wei
    pub gas_price: Option<u128>,
    /// Blocks to wait for a deployment to be mined before giving up
    pub timeout_blocks: u64,
    /// The expected time between blocks
    pub block_time: Duration,
    /// Whether to broadcast deployments without simulating them first
    pub skip_dry_run: bool,
    /// How long to wait for the endpoint to answer the network check
    pub network_check_timeout: Duration,
}

impl NetworkProfile {
    /// A profile with default settings for a credentialed network
    fn new(name: &str, endpoint: &str, chain_id: ChainId, block_time: Duration) -> Self {
        Self {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            credentials: CredentialsSource::SharedSecret,
            chain_id,
            confirmations: 0,
            gas_limit: None,
            gas_price: None,
            timeout_blocks: DEFAULT_TIMEOUT_BLOCKS,
            block_time,
            skip_dry_run: false,
            network_check_timeout: DEFAULT_NETWORK_CHECK_TIMEOUT,
        }
    }

    /// A copy of this profile pointed at a different RPC endpoint
    pub fn with_endpoint(&self, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..self.clone()
        }
    }

    /// The signer for this profile's transactions.
    ///
    /// `None` means the node's own accounts sign. Fails if the profile needs
    /// the shared secret and it was not loaded.
    pub fn signer(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<PrivateKeySigner>, ScriptError> {
        match self.credentials {
            CredentialsSource::None => Ok(None),
            CredentialsSource::SharedSecret => credentials.signer().cloned().map(Some).ok_or_else(
                || {
                    ScriptError::ProviderUnavailable(format!(
                        "network `{}` requires credentials, but none were loaded",
                        self.name
                    ))
                },
            ),
        }
    }

    /// Whether this profile can be used with the given credentials
    pub fn is_usable(&self, credentials: &Credentials) -> bool {
        self.signer(credentials).is_ok()
    }

    /// Whether deployments are simulated before being broadcast
    pub fn dry_run_enabled(&self) -> bool {
        !self.skip_dry_run && self.credentials == CredentialsSource::SharedSecret
    }

    /// How long to wait for a deployment receipt, derived from the timeout in blocks
    pub fn receipt_timeout(&self) -> Duration {
        let blocks = u32::try_from(self.timeout_blocks).unwrap_or(u32::MAX);
        self.block_time.saturating_mul(blocks)
    }
}

/// The local development chain, signing with the node's unlocked accounts
fn development() -> NetworkProfile {
    NetworkProfile {
        credentials: CredentialsSource::None,
        ..NetworkProfile::new(
            DEVELOPMENT_NETWORK,
            DEVELOPMENT_RPC_URL,
            ChainId::Any,
            Duration::from_secs(1),
        )
    }
}

/// The BSC testnet
fn bsc_testnet() -> NetworkProfile {
    NetworkProfile {
        confirmations: 1,
        timeout_blocks: 10_000,
        gas_limit: Some(100_000_000),
        ..NetworkProfile::new(
            BSC_TESTNET_NETWORK,
            BSC_TESTNET_RPC_URL,
            ChainId::Id(BSC_TESTNET_CHAIN_ID),
            Duration::from_secs(3),
        )
    }
}

/// The Kovan testnet
fn kovan() -> NetworkProfile {
    NetworkProfile {
        gas_limit: Some(5_000_000),
        gas_price: Some(25_000_000_000),
        skip_dry_run: true,
        ..NetworkProfile::new(
            KOVAN_NETWORK,
            KOVAN_RPC_URL,
            ChainId::Id(KOVAN_CHAIN_ID),
            Duration::from_secs(4),
        )
    }
}

/// BSC mainnet, the production network
fn mainnet() -> NetworkProfile {
    NetworkProfile {
        confirmations: 5,
        timeout_blocks: 200,
        skip_dry_run: true,
        network_check_timeout: Duration::from_secs(100),
        ..NetworkProfile::new(
            PRODUCTION_NETWORK,
            BSC_MAINNET_RPC_URL,
            ChainId::Id(BSC_MAINNET_CHAIN_ID),
            Duration::from_secs(3),
        )
    }
}

/// The set of networks migrations can target
#[derive(Clone, Debug)]
pub struct NetworkRegistry {
    /// The registered profiles, in display order
    profiles: Vec<NetworkProfile>,
}

impl NetworkRegistry {
    /// A registry over the given profiles
    pub fn new(profiles: Vec<NetworkProfile>) -> Self {
        Self { profiles }
    }

    /// The registry of built-in networks
    pub fn builtin() -> Self {
        Self::new(vec![development(), bsc_testnet(), kovan(), mainnet()])
    }

    /// All registered profiles
    pub fn profiles(&self) -> &[NetworkProfile] {
        &self.profiles
    }

    /// Look up a profile by name
    pub fn lookup(&self, name: &str) -> Result<&NetworkProfile, ScriptError> {
        self.profiles
            .iter()
            .find(|profile| profile.name == name)
            .ok_or_else(|| ScriptError::ProfileNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    /// The first default Anvil account key
    const TEST_PKEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_builtin_profiles() {
        let registry = NetworkRegistry::builtin();

        let development = registry.lookup("development").unwrap();
        assert_eq!(development.chain_id, ChainId::Any);
        assert_eq!(development.confirmations, 0);
        assert_eq!(development.credentials, CredentialsSource::None);

        let testnet = registry.lookup("bsc_testnet").unwrap();
        assert_eq!(testnet.chain_id, ChainId::Id(97));
        assert_eq!(testnet.confirmations, 1);
        assert_eq!(testnet.gas_limit, Some(100_000_000));
        assert!(testnet.dry_run_enabled());

        let kovan = registry.lookup("kovan").unwrap();
        assert_eq!(kovan.chain_id, ChainId::Id(42));
        assert_eq!(kovan.gas_price, Some(25_000_000_000));
        assert!(!kovan.dry_run_enabled());

        let mainnet = registry.lookup("mainnet").unwrap();
        assert_eq!(mainnet.chain_id, ChainId::Id(56));
        assert_eq!(mainnet.confirmations, 5);
        assert_eq!(mainnet.network_check_timeout, Duration::from_secs(100));
        assert!(!mainnet.dry_run_enabled());
    }

    #[test]
    fn test_unknown_profile() {
        let registry = NetworkRegistry::builtin();
        assert!(matches!(
            registry.lookup("ropsten"),
            Err(ScriptError::ProfileNotFound(name)) if name == "ropsten"
        ));
    }

    #[test]
    fn test_missing_secret_degrades_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let credentials = Credentials::load(&dir.path().join(".secret"));
        assert!(credentials.signer().is_none());

        let registry = NetworkRegistry::builtin();
        let development = registry.lookup("development").unwrap();
        assert!(matches!(development.signer(&credentials), Ok(None)));

        for name in ["bsc_testnet", "kovan", "mainnet"] {
            let profile = registry.lookup(name).unwrap();
            assert!(!profile.is_usable(&credentials));
            assert!(matches!(
                profile.signer(&credentials),
                Err(ScriptError::ProviderUnavailable(_))
            ));
        }
    }

    #[test]
    fn test_malformed_secret() {
        let mut secret = NamedTempFile::new().unwrap();
        writeln!(secret, "not a private key").unwrap();

        assert!(matches!(
            Credentials::try_load(secret.path()),
            Err(ScriptError::ReadSecret(_))
        ));
        assert!(Credentials::load(secret.path()).signer().is_none());
    }

    #[test]
    fn test_secret_is_trimmed() {
        let mut secret = NamedTempFile::new().unwrap();
        writeln!(secret, "  {TEST_PKEY}  ").unwrap();

        let credentials = Credentials::load(secret.path());
        let expected = PrivateKeySigner::from_str(TEST_PKEY).unwrap();
        assert_eq!(
            credentials.signer().map(|s| s.address()),
            Some(expected.address())
        );

        let mainnet = NetworkRegistry::builtin().lookup("mainnet").unwrap().clone();
        assert!(mainnet.is_usable(&credentials));
    }

    #[test]
    fn test_receipt_timeout() {
        let registry = NetworkRegistry::builtin();
        assert_eq!(
            registry.lookup("mainnet").unwrap().receipt_timeout(),
            Duration::from_secs(600)
        );
        assert_eq!(
            registry.lookup("development").unwrap().receipt_timeout(),
            Duration::from_secs(50)
        );
    }

    #[test]
    fn test_endpoint_override() {
        let registry = NetworkRegistry::builtin();
        let kovan = registry.lookup("kovan").unwrap();
        let overridden = kovan.with_endpoint("http://localhost:8545");

        assert_eq!(overridden.endpoint, "http://localhost:8545");
        assert_eq!(overridden.chain_id, kovan.chain_id);
        assert_eq!(registry.lookup("kovan").unwrap().endpoint, KOVAN_RPC_URL);
    }
}
