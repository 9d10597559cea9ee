//! Declarative deployment plans for each contract family
//!
//! A plan is the ordered list of contracts a migration deploys on a given
//! network. Production only receives the lazy-mint variants; every other
//! network receives the full family.

use std::fmt::{self, Display};

use crate::{
    config_store::deployment_key,
    constants::{
        ERC1155_METADATA_URI, L7_ERC1155, L7_ERC1155_LAZY_MINT, L7_ERC721, L7_ERC721_ENUMERABLE,
        L7_ERC721_LAZY_MINT, PRODUCTION_NETWORK,
    },
    types::ConstructorArg,
};

/// Whether `network` is the production network
pub fn is_production_network(network: &str) -> bool {
    network == PRODUCTION_NETWORK
}

/// The contract families deployed by the migrations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContractFamily {
    /// The ERC-721 contracts
    Erc721,
    /// The ERC-1155 contracts
    Erc1155,
}

impl Display for ContractFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractFamily::Erc721 => write!(f, "erc721"),
            ContractFamily::Erc1155 => write!(f, "erc1155"),
        }
    }
}

impl ContractFamily {
    /// The deployment plan for this family on `network`
    pub fn plan(&self, network: &str) -> Vec<DeploymentStep> {
        let production = is_production_network(network);
        match self {
            ContractFamily::Erc721 if production => vec![DeploymentStep::new(
                L7_ERC721_LAZY_MINT,
                "lazyMint",
                vec![],
            )],
            ContractFamily::Erc721 => vec![
                DeploymentStep::new(L7_ERC721, "ERC721", vec![]),
                DeploymentStep::new(L7_ERC721_ENUMERABLE, "ERC721Enumerable", vec![]),
                DeploymentStep::new(L7_ERC721_LAZY_MINT, "ERC721LazyMint", vec![]),
            ],
            ContractFamily::Erc1155 if production => vec![DeploymentStep::new(
                L7_ERC1155_LAZY_MINT,
                "ERC1155LazyMint",
                vec![metadata_uri()],
            )],
            ContractFamily::Erc1155 => vec![
                DeploymentStep::new(L7_ERC1155, "ERC1155", vec![metadata_uri()]),
                DeploymentStep::new(L7_ERC1155_LAZY_MINT, "ERC1155LazyMint", vec![metadata_uri()]),
            ],
        }
    }
}

/// The metadata URI constructor argument of the ERC-1155 contracts
fn metadata_uri() -> ConstructorArg {
    ConstructorArg::String(ERC1155_METADATA_URI.to_string())
}

/// A single contract deployment within a plan
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentStep {
    /// The name of the contract artifact to deploy
    pub artifact: &'static str,
    /// A short label for the deployed variant, used in logs
    pub label: &'static str,
    /// The arguments passed to the contract's constructor
    pub constructor_args: Vec<ConstructorArg>,
}

impl DeploymentStep {
    /// Create a deployment step
    pub fn new(
        artifact: &'static str,
        label: &'static str,
        constructor_args: Vec<ConstructorArg>,
    ) -> Self {
        Self {
            artifact,
            label,
            constructor_args,
        }
    }

    /// The config path under which this step's address is recorded on `network`
    pub fn config_key(&self, network: &str) -> String {
        deployment_key(network, self.artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The artifact names of a plan, in order
    fn artifacts(plan: &[DeploymentStep]) -> Vec<&'static str> {
        plan.iter().map(|step| step.artifact).collect()
    }

    #[test]
    fn test_production_network() {
        assert!(is_production_network("mainnet"));
        assert!(!is_production_network("bsc_testnet"));
        assert!(!is_production_network("Mainnet"));
        assert!(!is_production_network(""));
    }

    #[test]
    fn test_erc721_mainnet_plan() {
        let plan = ContractFamily::Erc721.plan("mainnet");
        assert_eq!(artifacts(&plan), vec!["L7ERC721LazyMint"]);
    }

    #[test]
    fn test_erc721_non_production_plan() {
        for network in ["development", "bsc_testnet", "kovan", "some_fork"] {
            let plan = ContractFamily::Erc721.plan(network);
            assert_eq!(
                artifacts(&plan),
                vec!["L7ERC721", "L7ERC721Enumerable", "L7ERC721LazyMint"]
            );
            assert!(plan.iter().all(|step| step.constructor_args.is_empty()));
        }
    }

    #[test]
    fn test_erc1155_plans() {
        let mainnet = ContractFamily::Erc1155.plan("mainnet");
        assert_eq!(artifacts(&mainnet), vec!["L7ERC1155LazyMint"]);

        let testnet = ContractFamily::Erc1155.plan("bsc_testnet");
        assert_eq!(artifacts(&testnet), vec!["L7ERC1155", "L7ERC1155LazyMint"]);

        let empty_uri = vec![ConstructorArg::String(String::new())];
        assert!(mainnet
            .iter()
            .chain(testnet.iter())
            .all(|step| step.constructor_args == empty_uri));
    }

    #[test]
    fn test_config_key() {
        let step = &ContractFamily::Erc721.plan("bsc_testnet")[0];
        assert_eq!(step.config_key("bsc_testnet"), "deployed.bsc_testnet.L7ERC721");
    }
}
