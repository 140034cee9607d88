//! [`Ledger`] backed by a JSON-RPC node.
//!
//! Transactions are sent with `eth_sendTransaction` from an account the node holds
//! the key for (Hardhat, Anvil or a signing proxy), then confirmed by polling
//! `eth_getTransactionReceipt`.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use alloy_core::{
    dyn_abi::DynSolValue,
    primitives::{Address, B256, Bytes},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use url::Url;

use super::{
    ContractHandle, ContractKind, Ledger, Libraries, NetworkInfo,
    artifact::{Artifact, ArtifactStore},
};
use crate::{
    DeployError,
    rpc::{self, RpcError, deserialize_u64_from_hex},
};

/// Default time to wait for a transaction to be mined.
pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 300;

fn default_receipt_timeout_secs() -> u64 {
    DEFAULT_RECEIPT_TIMEOUT_SECS
}

/// Connection settings for one named network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// The JSON-RPC endpoint.
    pub rpc_url: String,
    /// The unlocked account transactions are sent from.
    pub from: Address,
    /// How long to wait for a receipt before giving up.
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,
}

/// Receipt fields the ledger relies on.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionReceipt {
    transaction_hash: B256,
    #[serde(deserialize_with = "deserialize_u64_from_hex")]
    block_number: u64,
    #[serde(deserialize_with = "deserialize_u64_from_hex")]
    status: u64,
    contract_address: Option<Address>,
}

/// A configured network together with the shared HTTP client.
#[derive(Debug, Clone)]
struct Endpoint {
    name: String,
    client: reqwest::Client,
    config: NetworkConfig,
}

impl Endpoint {
    /// Submit a transaction and return its hash.
    ///
    /// A node-side rejection comes back as [`RpcError`].
    async fn submit(&self, to: Option<Address>, data: Bytes) -> Result<B256> {
        let mut tx = serde_json::json!({
            "from": self.config.from,
            "data": data,
        });
        if let Some(to) = to {
            tx["to"] = serde_json::json!(to);
        }

        let tx_hash: B256 =
            rpc::json_rpc_call(&self.client, &self.config.rpc_url, "eth_sendTransaction", vec![tx])
                .await?;

        tracing::debug!(
            network = %self.name,
            tx_hash = %tx_hash,
            "Transaction submitted, waiting for receipt..."
        );
        Ok(tx_hash)
    }

    /// Wait until a submitted transaction is mined and check that it succeeded.
    async fn confirm(&self, tx_hash: B256, action: &str) -> Result<TransactionReceipt> {
        let receipt = self.wait_for_receipt(tx_hash).await?;
        if receipt.status != 1 {
            return Err(DeployError::ChainRejected {
                action: action.to_string(),
                reason: format!(
                    "transaction {} reverted in block {}",
                    receipt.transaction_hash, receipt.block_number
                ),
            }
            .into());
        }

        Ok(receipt)
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt> {
        let timeout = Duration::from_secs(self.config.receipt_timeout_secs);
        let endpoint = self;

        rpc::poll_until(
            &format!("receipt of {tx_hash}"),
            timeout,
            rpc::DEFAULT_POLL_INTERVAL,
            move || async move {
                rpc::json_rpc_call::<Option<TransactionReceipt>>(
                    &endpoint.client,
                    &endpoint.config.rpc_url,
                    "eth_getTransactionReceipt",
                    vec![serde_json::json!(tx_hash)],
                )
                .await
            },
        )
        .await
    }

    async fn code_at(&self, address: Address) -> Result<Bytes> {
        rpc::json_rpc_call(
            &self.client,
            &self.config.rpc_url,
            "eth_getCode",
            vec![serde_json::json!(address), serde_json::json!("latest")],
        )
        .await
    }
}

/// Map a failed submission to [`DeployError::ChainRejected`] when the node refused it.
fn rejected(err: anyhow::Error, action: &str) -> anyhow::Error {
    match err.downcast::<RpcError>() {
        Ok(rpc_error) => DeployError::ChainRejected {
            action: action.to_string(),
            reason: rpc_error.message,
        }
        .into(),
        Err(err) => err.context(format!("Failed to submit {action}")),
    }
}

/// A revert that gives no reason. This is what an address holding some other
/// contract answers to a selector it does not know.
fn is_unrecognized_call(error: &RpcError) -> bool {
    let message = error.message.to_lowercase();
    if message.contains("function selector was not recognized")
        || message.contains("reverted without a reason")
    {
        return true;
    }

    let no_data = match &error.data {
        None | Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::String(data)) => data.is_empty() || data == "0x",
        Some(_) => false,
    };
    no_data && message.trim_end() == "execution reverted"
}

/// Production ledger: Hardhat artifacts plus JSON-RPC endpoints.
#[derive(Debug, Clone)]
pub struct RpcLedger {
    client: reqwest::Client,
    artifacts: ArtifactStore,
    networks: BTreeMap<String, NetworkConfig>,
}

impl RpcLedger {
    /// Create a ledger over the given networks. Every RPC URL must parse.
    pub fn new(
        artifacts: ArtifactStore,
        networks: BTreeMap<String, NetworkConfig>,
    ) -> Result<Self> {
        for (name, network) in &networks {
            Url::parse(&network.rpc_url).with_context(|| {
                format!("Invalid RPC URL for network {name}: {}", network.rpc_url)
            })?;
        }

        Ok(Self {
            client: rpc::create_client()?,
            artifacts,
            networks,
        })
    }

    fn endpoint(&self, network: &str) -> Result<Endpoint, DeployError> {
        let config = self
            .networks
            .get(network)
            .ok_or_else(|| DeployError::UnknownNetwork(network.to_string()))?;

        Ok(Endpoint {
            name: network.to_string(),
            client: self.client.clone(),
            config: config.clone(),
        })
    }
}

impl Ledger for RpcLedger {
    type Contract = RpcContract;

    async fn connect(&self, network: &str) -> Result<NetworkInfo> {
        let endpoint = self.endpoint(network)?;

        let chain_id: String =
            rpc::json_rpc_call(&endpoint.client, &endpoint.config.rpc_url, "eth_chainId", vec![])
                .await
                .with_context(|| format!("Failed to connect to network {network}"))?;

        Ok(NetworkInfo {
            name: endpoint.name,
            chain_id: rpc::parse_quantity(&chain_id)?,
        })
    }

    async fn deploy(
        &self,
        network: &str,
        kind: ContractKind,
        libraries: &Libraries,
        args: Vec<DynSolValue>,
    ) -> Result<RpcContract> {
        let endpoint = self.endpoint(network)?;
        let artifact = self.artifacts.load(kind)?;
        let data = artifact.deploy_data(libraries, &args)?;

        let action = format!("deployment of {kind} on {network}");
        let tx_hash = endpoint
            .submit(None, data)
            .await
            .map_err(|err| rejected(err, &action))?;
        let receipt = endpoint.confirm(tx_hash, &action).await?;
        let address = receipt
            .contract_address
            .ok_or_else(|| DeployError::ChainRejected {
                action,
                reason: format!("receipt of {} has no contract address", receipt.transaction_hash),
            })?;

        tracing::debug!(
            contract = %kind,
            tx_hash = %receipt.transaction_hash,
            block_number = receipt.block_number,
            "Deployment mined"
        );

        Ok(RpcContract {
            endpoint,
            kind,
            address,
            artifact: Arc::new(artifact),
            attached: false,
            has_code: Arc::new(OnceCell::new_with(Some(()))),
        })
    }

    fn attach(&self, network: &str, kind: ContractKind, address: Address) -> Result<RpcContract> {
        Ok(RpcContract {
            endpoint: self.endpoint(network)?,
            kind,
            address,
            artifact: Arc::new(self.artifacts.load(kind)?),
            attached: true,
            has_code: Arc::new(OnceCell::new()),
        })
    }
}

/// A contract reachable through an [`RpcLedger`].
#[derive(Debug, Clone)]
pub struct RpcContract {
    endpoint: Endpoint,
    kind: ContractKind,
    address: Address,
    artifact: Arc<Artifact>,
    /// Located by address rather than deployed in this run.
    attached: bool,
    /// Set once code was seen at `address`. Attached handles check on first call.
    has_code: Arc<OnceCell<()>>,
}

impl RpcContract {
    fn mismatch(&self, method: &str) -> DeployError {
        DeployError::LocatorMismatch {
            kind: self.kind,
            address: self.address,
            method: method.to_string(),
        }
    }

    async fn ensure_code(&self, method: &str) -> Result<()> {
        self.has_code
            .get_or_try_init(|| async {
                let code = self.endpoint.code_at(self.address).await?;
                if code.is_empty() {
                    return Err(anyhow::Error::from(self.mismatch(method)));
                }
                Ok(())
            })
            .await?;

        Ok(())
    }
}

impl ContractHandle for RpcContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn call(&self, method: &str, args: Vec<DynSolValue>) -> Result<B256> {
        let data = self
            .artifact
            .encode_call(method, &args)?
            .ok_or_else(|| self.mismatch(method))?;

        self.ensure_code(method).await?;

        let action = format!("{}.{method} at {}", self.kind, self.address);
        let tx_hash = self
            .endpoint
            .submit(Some(self.address), data)
            .await
            .map_err(|err| {
                let unrecognized = self.attached
                    && err
                        .downcast_ref::<RpcError>()
                        .is_some_and(is_unrecognized_call);
                if unrecognized {
                    anyhow::Error::from(self.mismatch(method))
                } else {
                    rejected(err, &action)
                }
            })?;
        let receipt = self.endpoint.confirm(tx_hash, &action).await?;

        Ok(receipt.transaction_hash)
    }
}
