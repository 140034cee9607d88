use alloy_core::dyn_abi::DynSolValue;
use anyhow::{Context, Result};
use futures::future::try_join_all;

use crate::{
    ConstantsSource, ContractHandle, ContractKind, Deployer, DeploymentOutcome, DeploymentState,
    Ledger, Stage, ledger::address_array,
};

/// Replaces the executor's trusted token list.
pub const SET_TRUSTED_TOKENS: &str = "setTrustedTokens";
/// Flips the active flag of a registered router.
pub const SWITCH_ROUTER_ACTIVE_STATUS: &str = "switchRouterActiveStatus";
/// Registers new routers on the executor.
pub const ADD_ROUTERS: &str = "addRouters";

impl<L, C> Deployer<L, C>
where
    L: Ledger,
    C: ConstantsSource,
{
    /// Deploy a new router generation and swap it in on the recorded executor.
    ///
    /// Requires a state file written by [`Deployer::deploy_core`] for the chain.
    /// The executor's trusted tokens are replaced, every recorded router is
    /// toggled off and the new routers are added. The state file is only
    /// rewritten once all of those calls went through; a failed toggle leaves the
    /// on-chain registry partly updated and the file untouched.
    pub async fn deploy_integrations(&self, network: &str) -> Result<DeploymentOutcome> {
        tracing::info!(network = %network, "Starting router integration...");

        let constants = self.resolve_config(network)?;
        let contracts = self.contracts(network);

        let routers = self.deploy_routers(&contracts, &constants).await?;

        Self::enter(network, Stage::LoadPriorState);
        let info = self.connect(network).await?;
        let prior = self.store().load(info.chain_id).await?;

        Self::enter(network, Stage::LocateExecutor);
        let executor = contracts.attach(ContractKind::SwapExecutor, prior.swap_executor)?;

        Self::enter(network, Stage::UpdateTrustedTokens);
        executor
            .call(
                SET_TRUSTED_TOKENS,
                vec![address_array(&constants.trusted_tokens)],
            )
            .await?;

        Self::enter(network, Stage::DeactivatePriorRouters);
        let executor_ref = &executor;
        try_join_all(prior.routers.iter().map(|router| async move {
            executor_ref
                .call(
                    SWITCH_ROUTER_ACTIVE_STATUS,
                    vec![DynSolValue::Address(*router)],
                )
                .await
                .with_context(|| format!("Failed to switch active status of router {router}"))
        }))
        .await?;

        Self::enter(network, Stage::RegisterNewRouters);
        executor.call(ADD_ROUTERS, vec![address_array(&routers)]).await?;

        Self::enter(network, Stage::PersistState);
        let state = DeploymentState {
            routers,
            swap_executor: prior.swap_executor,
        };
        let path = self.store().save(info.chain_id, &state).await?;

        tracing::info!(
            network = %network,
            chain_id = info.chain_id,
            replaced = prior.routers.len(),
            "✓ Router integration complete!"
        );

        Ok(DeploymentOutcome {
            network: info,
            path,
            state,
        })
    }
}
