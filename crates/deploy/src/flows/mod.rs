//! The two deployment flows.
//!
//! - [`Deployer::deploy_core`](crate::Deployer::deploy_core) deploys both routers and
//!   the swap executor, then records their addresses.
//! - [`Deployer::deploy_integrations`](crate::Deployer::deploy_integrations) deploys a
//!   new router generation and swaps it in on the recorded executor.
//!
//! Both write `CoreOutput-<chain-id>.json` through the [`StateStore`](crate::StateStore).

mod deploy_core;
mod integration;

pub use integration::{ADD_ROUTERS, SET_TRUSTED_TOKENS, SWITCH_ROUTER_ACTIVE_STATUS};
