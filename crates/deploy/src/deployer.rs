use std::path::PathBuf;

use alloy_core::{dyn_abi::DynSolValue, primitives::Address};
use anyhow::Result;

use crate::{
    ConstantsSource, ContractDeployer, ContractHandle, ContractKind, DeploymentState, Ledger,
    NetworkConstants, NetworkInfo, StateStore,
};

/// The steps the deployment flows go through, in the order they can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Stage {
    ResolveConfig,
    DeployRouters,
    DeployExecutor,
    LoadPriorState,
    LocateExecutor,
    UpdateTrustedTokens,
    DeactivatePriorRouters,
    RegisterNewRouters,
    PersistState,
}

/// Result of a completed flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentOutcome {
    /// The network the flow ran against.
    pub network: NetworkInfo,
    /// The state file that was written.
    pub path: PathBuf,
    /// The recorded state.
    pub state: DeploymentState,
}

/// Orchestrates the core deployment and the router integration of a network.
///
/// The flows themselves live in [`crate::flows`]. Each network is handled on its
/// own; running two flows against the same network at once is not supported.
pub struct Deployer<L, C> {
    ledger: L,
    constants: C,
    store: StateStore,
}

impl<L, C> Deployer<L, C>
where
    L: Ledger,
    C: ConstantsSource,
{
    pub fn new(ledger: L, constants: C, store: StateStore) -> Self {
        Self {
            ledger,
            constants,
            store,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub(crate) fn enter(network: &str, stage: Stage) {
        tracing::info!(network = %network, stage = %stage, "Entering stage");
    }

    pub(crate) fn contracts<'a>(&'a self, network: &'a str) -> ContractDeployer<'a, L> {
        ContractDeployer::new(&self.ledger, network)
    }

    pub(crate) fn resolve_config(&self, network: &str) -> Result<NetworkConstants> {
        Self::enter(network, Stage::ResolveConfig);
        Ok(self.constants.resolve(network)?)
    }

    pub(crate) async fn connect(&self, network: &str) -> Result<NetworkInfo> {
        let info = self.ledger.connect(network).await?;
        tracing::debug!(network = %info.name, chain_id = info.chain_id, "Connected");
        Ok(info)
    }

    /// Deploy one router generation: V2 first, then V3.
    ///
    /// Addresses are returned in deployment order.
    pub(crate) async fn deploy_routers(
        &self,
        contracts: &ContractDeployer<'_, L>,
        constants: &NetworkConstants,
    ) -> Result<Vec<Address>> {
        Self::enter(contracts.network(), Stage::DeployRouters);
        let mut routers = Vec::with_capacity(2);

        let v2 = contracts
            .deploy(
                ContractKind::SeloraV2Router,
                None,
                vec![DynSolValue::Address(constants.selora_v2_router)],
            )
            .await?;
        routers.push(v2.address());

        let v3 = contracts
            .deploy(
                ContractKind::SeloraV3Router,
                None,
                vec![
                    DynSolValue::Address(constants.selora_v3_router),
                    DynSolValue::Address(constants.selora_v3_factory),
                ],
            )
            .await?;
        routers.push(v3.address());

        Ok(routers)
    }
}
