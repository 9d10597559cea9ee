//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};

/// A constructor argument passed when deploying a contract
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstructorArg {
    /// A Solidity `string`
    String(String),
    /// A Solidity `address`
    Address(Address),
    /// A Solidity `uint256`
    Uint(U256),
    /// A Solidity `bool`
    Bool(bool),
}

impl ConstructorArg {
    /// Convert the argument into a dynamically-typed Solidity value for ABI encoding
    pub fn to_sol_value(&self) -> DynSolValue {
        match self {
            ConstructorArg::String(s) => DynSolValue::String(s.clone()),
            ConstructorArg::Address(a) => DynSolValue::Address(*a),
            ConstructorArg::Uint(u) => DynSolValue::Uint(*u, 256),
            ConstructorArg::Bool(b) => DynSolValue::Bool(*b),
        }
    }
}

impl Display for ConstructorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructorArg::String(s) => write!(f, "{:?}", s),
            ConstructorArg::Address(a) => write!(f, "{:#x}", a),
            ConstructorArg::Uint(u) => write!(f, "{}", u),
            ConstructorArg::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A contract deployed on a network, as recorded in the config store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentRecord {
    /// The network the contract was deployed to
    pub network: String,
    /// The name of the deployed contract artifact
    pub contract_name: String,
    /// The address the contract was deployed at
    pub address: Address,
}

impl DeploymentRecord {
    /// The EIP-55 checksummed form of the deployed address
    pub fn checksummed_address(&self) -> String {
        self.address.to_checksum(None /* chain_id */)
    }
}
