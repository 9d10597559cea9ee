//! Constants used in the migration scripts

use std::time::Duration;

/// The top-level key under which deployed addresses are recorded in the config document
pub const DEPLOYED_KEY: &str = "deployed";

/// The separator between segments of a config path
pub const CONFIG_PATH_SEPARATOR: char = '.';

/// The default location of the config document
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// The default location of the deployer secret file
pub const DEFAULT_SECRET_PATH: &str = ".secret";

/// The default directory containing compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "abi";

/// The extension of a compiled contract artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The name of the production network, on which only the lazy-mint variants are deployed
pub const PRODUCTION_NETWORK: &str = "mainnet";

/// How long to wait for an RPC endpoint to report its chain ID, unless a profile overrides it
pub const DEFAULT_NETWORK_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// How many blocks to wait for a deployment to be mined, unless a profile overrides it
pub const DEFAULT_TIMEOUT_BLOCKS: u64 = 50;

// --- Contract artifacts --- //

/// The base ERC-721 contract
pub const L7_ERC721: &str = "L7ERC721";

/// The enumerable ERC-721 contract
pub const L7_ERC721_ENUMERABLE: &str = "L7ERC721Enumerable";

/// The lazy-mint ERC-721 contract
pub const L7_ERC721_LAZY_MINT: &str = "L7ERC721LazyMint";

/// The base ERC-1155 contract
pub const L7_ERC1155: &str = "L7ERC1155";

/// The lazy-mint ERC-1155 contract
pub const L7_ERC1155_LAZY_MINT: &str = "L7ERC1155LazyMint";

/// The metadata URI passed to the ERC-1155 constructors
pub const ERC1155_METADATA_URI: &str = "";

// --- Network profiles --- //

/// The name of the local development network
pub const DEVELOPMENT_NETWORK: &str = "development";

/// The RPC endpoint of the local development chain
pub const DEVELOPMENT_RPC_URL: &str = "http://127.0.0.1:7545";

/// The name of the BSC testnet
pub const BSC_TESTNET_NETWORK: &str = "bsc_testnet";

/// The RPC endpoint of the BSC testnet
pub const BSC_TESTNET_RPC_URL: &str = "https://data-seed-prebsc-1-s1.binance.org:8545";

/// The chain ID of the BSC testnet
pub const BSC_TESTNET_CHAIN_ID: u64 = 97;

/// The name of the Kovan testnet
pub const KOVAN_NETWORK: &str = "kovan";

/// The RPC endpoint of the Kovan testnet
pub const KOVAN_RPC_URL: &str = "https://kovan.poa.network";

/// The chain ID of the Kovan testnet
pub const KOVAN_CHAIN_ID: u64 = 42;

/// The RPC endpoint of BSC mainnet
pub const BSC_MAINNET_RPC_URL: &str = "https://bsc-dataseed.binance.org";

/// The chain ID of BSC mainnet
pub const BSC_MAINNET_CHAIN_ID: u64 = 56;
