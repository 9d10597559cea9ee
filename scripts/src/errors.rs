//! Definitions of errors that can occur during the execution of the migration scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the migration scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error reading or parsing the deployer secret file
    ReadSecret(String),
    /// No network profile is registered under the given name
    ProfileNotFound(String),
    /// The network profile cannot be used, e.g. its credentials failed to load
    ProviderUnavailable(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error checking that the RPC endpoint is reachable
    NetworkCheck(String),
    /// The RPC endpoint reports a different chain than the profile expects
    ChainIdMismatch {
        /// The chain ID configured in the network profile
        expected: u64,
        /// The chain ID reported by the RPC endpoint
        actual: u64,
    },
    /// Error parsing a contract compilation artifact
    ArtifactParsing(String),
    /// Constructor arguments do not match the contract's constructor
    ConstructorArgs(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error reading the config document
    ReadConfig(String),
    /// Error writing the config document
    WriteConfig(String),
    /// Error de/serializing a document
    Serde(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ReadSecret(s) => write!(f, "error reading secret: {}", s),
            ScriptError::ProfileNotFound(s) => write!(f, "network profile not found: {}", s),
            ScriptError::ProviderUnavailable(s) => write!(f, "provider unavailable: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::NetworkCheck(s) => write!(f, "error checking network: {}", s),
            ScriptError::ChainIdMismatch { expected, actual } => write!(
                f,
                "chain id mismatch: expected {}, endpoint reports {}",
                expected, actual
            ),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::ConstructorArgs(s) => {
                write!(f, "invalid constructor arguments: {}", s)
            }
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ReadConfig(s) => write!(f, "error reading config: {}", s),
            ScriptError::WriteConfig(s) => write!(f, "error writing config: {}", s),
            ScriptError::Serde(s) => write!(f, "error de/serializing: {}", s),
        }
    }
}

impl Error for ScriptError {}
