//! selora-deploy - Deployment library for the Selora swap contracts.
//!
//! This crate deploys the Selora routers and swap executor on a network, records
//! their addresses in a per-chain state file, and later swaps a new router
//! generation in on the recorded executor.

mod deployer;
pub use deployer::{Deployer, DeploymentOutcome, Stage};

pub mod constants;
pub use constants::{ConstantsSource, ConstantsTable, NetworkConstants};

mod error;
pub use error::DeployError;

mod executor;
pub use executor::ContractDeployer;

pub mod flows;
mod fs;

pub mod ledger;
pub use ledger::{
    ContractHandle, ContractKind, Ledger, Libraries, NetworkInfo,
    artifact::ArtifactStore,
    rpc::{NetworkConfig, RpcContract, RpcLedger},
};

pub mod rpc;

pub mod state;
pub use state::{DeploymentState, StateStore};
