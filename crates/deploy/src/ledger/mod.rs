//! Chain access used by the deployment flows.
//!
//! The flows never talk to a node directly. They go through a [`Ledger`], which can
//! connect to a named network, deploy a contract kind and attach to an existing
//! address. Deployed or attached contracts are exposed as [`ContractHandle`]s.

use std::{collections::BTreeMap, future::Future};

use alloy_core::{
    dyn_abi::DynSolValue,
    primitives::{Address, B256},
};
use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod artifact;
pub mod rpc;

/// Link-library name to deployed library address.
///
/// Keys are either the bare library name or the fully qualified `source:Name` form.
pub type Libraries = BTreeMap<String, Address>;

/// The contract kinds known to the deployment flows.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum ContractKind {
    SeloraV2Router,
    SeloraV3Router,
    SwapExecutor,
}

/// Identity of a network after connecting to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    /// The human-readable name the network was requested by.
    pub name: String,
    /// The chain id reported by the node.
    pub chain_id: u64,
}

/// A live contract instance bound to one network.
pub trait ContractHandle: Send + Sync {
    /// The address of the contract.
    fn address(&self) -> Address;

    /// Send a state-changing call and wait for it to be mined.
    ///
    /// Returns the transaction hash.
    fn call(
        &self,
        method: &str,
        args: Vec<DynSolValue>,
    ) -> impl Future<Output = Result<B256>> + Send;
}

/// The chain capabilities the flows need.
pub trait Ledger: Send + Sync {
    /// The handle type returned by [`Ledger::deploy`] and [`Ledger::attach`].
    type Contract: ContractHandle;

    /// Resolve a network by name and report its chain id.
    fn connect(&self, network: &str) -> impl Future<Output = Result<NetworkInfo>> + Send;

    /// Deploy a contract and wait until it is live.
    fn deploy(
        &self,
        network: &str,
        kind: ContractKind,
        libraries: &Libraries,
        args: Vec<DynSolValue>,
    ) -> impl Future<Output = Result<Self::Contract>> + Send;

    /// Bind a handle to an already deployed contract. No transaction is sent.
    fn attach(&self, network: &str, kind: ContractKind, address: Address)
    -> Result<Self::Contract>;
}

/// Encode a list of addresses as an `address[]` argument.
pub fn address_array(addresses: &[Address]) -> DynSolValue {
    DynSolValue::Array(addresses.iter().copied().map(DynSolValue::Address).collect())
}
