use alloy_core::{dyn_abi::DynSolValue, primitives::U256};
use anyhow::Result;

use crate::{
    ConstantsSource, ContractHandle, ContractKind, Deployer, DeploymentOutcome, DeploymentState,
    Ledger, Stage, constants::SWAP_EXECUTOR_FEE, ledger::address_array,
};

impl<L, C> Deployer<L, C>
where
    L: Ledger,
    C: ConstantsSource,
{
    /// Deploy the V2 router, the V3 router and the swap executor wired to both,
    /// then record their addresses for the connected chain.
    ///
    /// Any failure aborts the run. Contracts deployed before the failure stay on
    /// chain but are not recorded.
    pub async fn deploy_core(&self, network: &str) -> Result<DeploymentOutcome> {
        tracing::info!(network = %network, "Starting core deployment...");

        let constants = self.resolve_config(network)?;
        let contracts = self.contracts(network);

        let routers = self.deploy_routers(&contracts, &constants).await?;

        Self::enter(network, Stage::DeployExecutor);
        let executor = contracts
            .deploy(
                ContractKind::SwapExecutor,
                None,
                vec![
                    DynSolValue::Address(constants.team),
                    address_array(&routers),
                    DynSolValue::Uint(U256::from(SWAP_EXECUTOR_FEE), 256),
                    DynSolValue::Address(constants.weth),
                    address_array(&constants.trusted_tokens),
                ],
            )
            .await?;

        Self::enter(network, Stage::PersistState);
        let info = self.connect(network).await?;
        let state = DeploymentState {
            routers,
            swap_executor: executor.address(),
        };
        let path = self.store().save(info.chain_id, &state).await?;

        tracing::info!(
            network = %network,
            chain_id = info.chain_id,
            swap_executor = %state.swap_executor,
            "✓ Core deployment complete!"
        );

        Ok(DeploymentOutcome {
            network: info,
            path,
            state,
        })
    }
}
