//! The deploy primitive: turning a deployment step into an on-chain contract

use alloy::{
    network::{ReceiptResponse, TransactionBuilder},
    primitives::{Address, TxHash},
    providers::Provider,
    rpc::types::TransactionRequest,
};
use async_trait::async_trait;
use tracing::debug;

use crate::{
    artifacts::ArtifactStore,
    errors::ScriptError,
    networks::NetworkProfile,
    plan::DeploymentStep,
    utils::{Client, Connection},
};

/// Deploys contracts, one step at a time
#[async_trait]
pub trait Deployer: Sync {
    /// Deploy the step's contract and return its address once it is mined
    async fn deploy(&self, step: &DeploymentStep) -> Result<Address, ScriptError>;
}

/// A deployer sending creation transactions over RPC
pub struct RpcDeployer {
    /// The RPC client
    client: Client,
    /// The account deployments are sent from
    sender: Address,
    /// The profile of the network being deployed to
    profile: NetworkProfile,
    /// Where the contracts' creation bytecode is read from
    artifacts: ArtifactStore,
}

impl RpcDeployer {
    /// Create a deployer over a checked connection
    pub fn new(connection: Connection, profile: NetworkProfile, artifacts: ArtifactStore) -> Self {
        Self {
            client: connection.client,
            sender: connection.sender,
            profile,
            artifacts,
        }
    }

    /// Build the creation transaction for a step, applying the profile's gas overrides
    fn creation_tx(&self, step: &DeploymentStep) -> Result<TransactionRequest, ScriptError> {
        let artifact = self.artifacts.load(step.artifact)?;
        let code = artifact.deploy_code(&step.constructor_args)?;

        let mut tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_deploy_code(code);
        if let Some(gas_limit) = self.profile.gas_limit {
            tx = tx.with_gas_limit(gas_limit);
        }
        if let Some(gas_price) = self.profile.gas_price {
            tx = tx.with_gas_price(gas_price);
        }

        Ok(tx)
    }

    /// Simulate the creation transaction if the profile asks for a dry run
    async fn dry_run(
        &self,
        step: &DeploymentStep,
        tx: &TransactionRequest,
    ) -> Result<(), ScriptError> {
        if !self.profile.dry_run_enabled() {
            return Ok(());
        }

        let gas = self.client.estimate_gas(tx.clone()).await.map_err(|e| {
            ScriptError::ContractDeployment(format!("dry run of {} failed: {}", step.artifact, e))
        })?;
        debug!("dry run of {} estimated {} gas", step.artifact, gas);

        Ok(())
    }
}

/// The address of the contract created by a mined deployment
fn deployed_address<R: ReceiptResponse>(
    step: &DeploymentStep,
    tx_hash: TxHash,
    receipt: &R,
) -> Result<Address, ScriptError> {
    if !receipt.status() {
        return Err(ScriptError::ContractDeployment(format!(
            "{} deployment reverted in tx {:#x}",
            step.artifact, tx_hash
        )));
    }

    receipt.contract_address().ok_or_else(|| {
        ScriptError::ContractDeployment(format!(
            "receipt of tx {:#x} has no contract address",
            tx_hash
        ))
    })
}

#[async_trait]
impl Deployer for RpcDeployer {
    async fn deploy(&self, step: &DeploymentStep) -> Result<Address, ScriptError> {
        let tx = self.creation_tx(step)?;
        self.dry_run(step, &tx).await?;

        let pending = self
            .client
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(format!("{}: {}", step.artifact, e)))?;
        let tx_hash = *pending.tx_hash();
        debug!("sent {} deployment in tx {:#x}", step.artifact, tx_hash);

        // The inclusion block counts as the first confirmation
        let receipt = pending
            .with_required_confirmations(self.profile.confirmations + 1)
            .with_timeout(Some(self.profile.receipt_timeout()))
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(format!("{}: {}", step.artifact, e)))?;

        deployed_address(step, tx_hash, &receipt)
    }
}

#[cfg(test)]
mod tests {
    use alloy::{
        consensus::{Eip658Value, Receipt, ReceiptEnvelope, ReceiptWithBloom},
        primitives::{Bloom, TxKind, U64},
        providers::{mock::Asserter, DynProvider, ProviderBuilder},
        rpc::types::TransactionReceipt,
    };
    use serde_json::json;
    use tempfile::TempDir;

    use crate::{
        constants::{L7_ERC1155, L7_ERC721},
        networks::NetworkRegistry,
        plan::ContractFamily,
        types::ConstructorArg,
    };

    use super::*;

    // -----------
    // | Helpers |
    // -----------

    /// An artifact directory holding a constructor-less `L7ERC721` and a string-taking `L7ERC1155`
    fn artifact_dir() -> (TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ArtifactStore::new(dir.path());

        let erc721 = json!({ "contractName": L7_ERC721, "abi": [], "bytecode": "0x6080" });
        std::fs::write(artifacts.artifact_path(L7_ERC721), erc721.to_string()).unwrap();

        let erc1155 = json!({
            "contractName": L7_ERC1155,
            "abi": [{
                "type": "constructor",
                "inputs": [{ "name": "uri_", "type": "string", "internalType": "string" }],
                "stateMutability": "nonpayable"
            }],
            "bytecode": "0x6080"
        });
        std::fs::write(artifacts.artifact_path(L7_ERC1155), erc1155.to_string()).unwrap();

        (dir, artifacts)
    }

    /// A deployer for the named built-in profile over a mocked RPC client
    fn mocked_deployer(network: &str, artifacts: ArtifactStore) -> (Asserter, RpcDeployer) {
        let asserter = Asserter::new();
        let client = DynProvider::new(
            ProviderBuilder::new()
                .disable_recommended_fillers()
                .connect_mocked_client(asserter.clone()),
        );
        let connection = Connection {
            client,
            sender: Address::with_last_byte(0xaa),
            chain_id: 1,
        };
        let profile = NetworkRegistry::builtin().lookup(network).unwrap().clone();

        (asserter, RpcDeployer::new(connection, profile, artifacts))
    }

    /// A mined receipt with the given status and created contract
    fn receipt(status: bool, contract_address: Option<Address>) -> TransactionReceipt {
        TransactionReceipt {
            inner: ReceiptEnvelope::Legacy(ReceiptWithBloom {
                receipt: Receipt {
                    status: Eip658Value::Eip658(status),
                    cumulative_gas_used: 21_000,
                    logs: vec![],
                },
                logs_bloom: Bloom::ZERO,
            }),
            transaction_hash: TxHash::with_last_byte(1),
            transaction_index: Some(0),
            block_hash: None,
            block_number: Some(1),
            gas_used: 21_000,
            effective_gas_price: 1,
            blob_gas_used: None,
            blob_gas_price: None,
            from: Address::with_last_byte(0xaa),
            to: None,
            contract_address,
        }
    }

    /// The ERC-721 step of the non-production plan
    fn erc721_step() -> DeploymentStep {
        ContractFamily::Erc721.plan("development").remove(0)
    }

    // ---------
    // | Tests |
    // ---------

    #[test]
    fn test_creation_tx_applies_gas_overrides() {
        let (_dir, artifacts) = artifact_dir();

        let (_, kovan) = mocked_deployer("kovan", artifacts.clone());
        let tx = kovan.creation_tx(&erc721_step()).unwrap();
        assert_eq!(tx.gas, Some(5_000_000));
        assert_eq!(tx.gas_price, Some(25_000_000_000));
        assert_eq!(tx.to, Some(TxKind::Create));
        assert_eq!(tx.from, Some(Address::with_last_byte(0xaa)));
        assert_eq!(tx.input.input().map(|code| code.len()), Some(2));

        let (_, testnet) = mocked_deployer("bsc_testnet", artifacts.clone());
        let tx = testnet.creation_tx(&erc721_step()).unwrap();
        assert_eq!(tx.gas, Some(100_000_000));
        assert_eq!(tx.gas_price, None);

        let (_, development) = mocked_deployer("development", artifacts);
        let tx = development.creation_tx(&erc721_step()).unwrap();
        assert_eq!(tx.gas, None);
        assert_eq!(tx.gas_price, None);
    }

    #[test]
    fn test_creation_tx_appends_constructor_args() {
        let (_dir, artifacts) = artifact_dir();
        let (_, deployer) = mocked_deployer("development", artifacts);

        let step = ContractFamily::Erc1155.plan("development").remove(0);
        let tx = deployer.creation_tx(&step).unwrap();

        // Bytecode, then the string's offset and a zero length
        assert_eq!(tx.input.input().map(|code| code.len()), Some(2 + 64));
    }

    #[test]
    fn test_creation_tx_rejects_bad_args() {
        let (_dir, artifacts) = artifact_dir();
        let (_, deployer) = mocked_deployer("development", artifacts);

        let step = DeploymentStep::new(L7_ERC721, "ERC721", vec![ConstructorArg::Bool(true)]);
        assert!(matches!(
            deployer.creation_tx(&step),
            Err(ScriptError::ConstructorArgs(_))
        ));
    }

    #[tokio::test]
    async fn test_dry_run_estimates_gas_on_testnet() {
        let (_dir, artifacts) = artifact_dir();
        let (asserter, deployer) = mocked_deployer("bsc_testnet", artifacts);
        let step = erc721_step();
        let tx = deployer.creation_tx(&step).unwrap();

        asserter.push_success(&U64::from(1_500_000));
        deployer.dry_run(&step, &tx).await.unwrap();
        assert!(asserter.read_q().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_skipped_elsewhere() {
        let (_dir, artifacts) = artifact_dir();
        for network in ["kovan", "mainnet", "development"] {
            let (asserter, deployer) = mocked_deployer(network, artifacts.clone());
            let step = erc721_step();
            let tx = deployer.creation_tx(&step).unwrap();

            // An estimate request would consume this response
            asserter.push_success(&U64::from(1_500_000));
            deployer.dry_run(&step, &tx).await.unwrap();
            assert_eq!(asserter.read_q().len(), 1, "{network} ran a dry run");
        }
    }

    #[tokio::test]
    async fn test_failed_dry_run_aborts_deployment() {
        let (_dir, artifacts) = artifact_dir();
        let (asserter, deployer) = mocked_deployer("bsc_testnet", artifacts);

        asserter.push_failure_msg("execution reverted");
        let res = deployer.deploy(&erc721_step()).await;

        assert!(matches!(res, Err(ScriptError::ContractDeployment(_))));
        assert!(asserter.read_q().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_send_fails_deployment() {
        let (_dir, artifacts) = artifact_dir();
        let (asserter, deployer) = mocked_deployer("kovan", artifacts);

        asserter.push_failure_msg("insufficient funds for gas * price + value");
        let res = deployer.deploy(&erc721_step()).await;

        assert!(matches!(res, Err(ScriptError::ContractDeployment(_))));
    }

    #[tokio::test]
    async fn test_missing_artifact_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ArtifactStore::new(dir.path());
        let (asserter, deployer) = mocked_deployer("bsc_testnet", artifacts);

        asserter.push_success(&U64::from(1_500_000));
        let res = deployer.deploy(&erc721_step()).await;

        assert!(matches!(res, Err(ScriptError::ArtifactParsing(_))));
        assert_eq!(asserter.read_q().len(), 1);
    }

    #[test]
    fn test_receipt_yields_contract_address() {
        let created = Address::with_last_byte(0x42);
        let res =
            deployed_address(&erc721_step(), TxHash::with_last_byte(1), &receipt(true, Some(created)));
        assert_eq!(res.unwrap(), created);
    }

    #[test]
    fn test_reverted_receipt_fails() {
        let res = deployed_address(
            &erc721_step(),
            TxHash::with_last_byte(1),
            &receipt(false, Some(Address::with_last_byte(0x42))),
        );
        assert!(
            matches!(res, Err(ScriptError::ContractDeployment(msg)) if msg.contains("reverted"))
        );
    }

    #[test]
    fn test_receipt_without_contract_address_fails() {
        let res = deployed_address(&erc721_step(), TxHash::with_last_byte(1), &receipt(true, None));
        assert!(
            matches!(res, Err(ScriptError::ContractDeployment(msg)) if msg.contains("no contract address"))
        );
    }
}
