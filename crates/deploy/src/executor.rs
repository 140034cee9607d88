//! Deploying contracts and attaching to deployed ones on a named network.

use alloy_core::{dyn_abi::DynSolValue, primitives::Address};
use anyhow::{Context, Result};

use crate::{ContractHandle, ContractKind, Ledger, Libraries};

/// Deployment executor and contract locator for one network.
pub struct ContractDeployer<'a, L> {
    ledger: &'a L,
    network: &'a str,
}

impl<'a, L: Ledger> ContractDeployer<'a, L> {
    pub fn new(ledger: &'a L, network: &'a str) -> Self {
        Self { ledger, network }
    }

    pub fn network(&self) -> &str {
        self.network
    }

    /// Deploy `kind` with positional constructor arguments and wait until it is live.
    ///
    /// `libraries` is only needed for contracts linking external libraries.
    /// Failures are not retried.
    pub async fn deploy(
        &self,
        kind: ContractKind,
        libraries: Option<&Libraries>,
        args: Vec<DynSolValue>,
    ) -> Result<L::Contract> {
        tracing::info!(network = %self.network, contract = %kind, "Deploying contract...");

        let no_libraries = Libraries::new();
        let contract = self
            .ledger
            .deploy(self.network, kind, libraries.unwrap_or(&no_libraries), args)
            .await
            .with_context(|| format!("Failed to deploy {kind} on {}", self.network))?;

        tracing::info!(
            network = %self.network,
            contract = %kind,
            address = %contract.address(),
            "Contract deployed"
        );
        Ok(contract)
    }

    /// Get a handle on an already deployed `kind` at `address`.
    ///
    /// Nothing is checked on chain here. A wrong address shows up on the first call.
    pub fn attach(&self, kind: ContractKind, address: Address) -> Result<L::Contract> {
        let contract = self
            .ledger
            .attach(self.network, kind, address)
            .with_context(|| format!("Failed to attach to {kind} at {address}"))?;

        tracing::debug!(network = %self.network, contract = %kind, address = %address, "Attached to contract");
        Ok(contract)
    }
}
