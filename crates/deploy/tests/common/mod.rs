//! In-memory ledger used by the flow tests.

#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use tokio::sync::Barrier;

use alloy_core::{
    dyn_abi::DynSolValue,
    primitives::{Address, B256},
};
use anyhow::Result;
use rand::Rng;
use selora_deploy::{
    ConstantsTable, ContractHandle, ContractKind, DeployError, Ledger, Libraries, NetworkConstants,
    NetworkInfo,
};

/// Something the ledger was asked to do, in the order it was asked.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Deploy {
        kind: ContractKind,
        address: Address,
        args: Vec<DynSolValue>,
    },
    Call {
        address: Address,
        method: String,
        args: Vec<DynSolValue>,
    },
}

#[derive(Debug, Default)]
struct Chain {
    events: Vec<Event>,
    deployed: BTreeMap<Address, ContractKind>,
    next_address: u64,
    failing_deploy: Option<ContractKind>,
    failing_call: Option<(String, Vec<DynSolValue>)>,
    gates: BTreeMap<String, Arc<Barrier>>,
}

/// A ledger keeping every deployment and call in memory.
///
/// Clones share the same chain, so a test can keep one to inspect what a
/// [`selora_deploy::Deployer`] did with the other.
#[derive(Debug, Clone)]
pub struct MockLedger {
    networks: BTreeMap<String, u64>,
    chain: Arc<Mutex<Chain>>,
}

impl MockLedger {
    pub fn new(networks: &[(&str, u64)]) -> Self {
        Self {
            networks: networks
                .iter()
                .map(|(name, chain_id)| (name.to_string(), *chain_id))
                .collect(),
            chain: Arc::default(),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.chain.lock().unwrap().events.clone()
    }

    pub fn calls(&self) -> Vec<(Address, String, Vec<DynSolValue>)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Call {
                    address,
                    method,
                    args,
                } => Some((address, method, args)),
                Event::Deploy { .. } => None,
            })
            .collect()
    }

    pub fn deployments(&self) -> Vec<(ContractKind, Address, Vec<DynSolValue>)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Deploy {
                    kind,
                    address,
                    args,
                } => Some((kind, address, args)),
                Event::Call { .. } => None,
            })
            .collect()
    }

    /// Make every deployment of `kind` revert.
    pub fn fail_deploy(&self, kind: ContractKind) {
        self.chain.lock().unwrap().failing_deploy = Some(kind);
    }

    /// Make calls to `method` with exactly `args` revert.
    pub fn fail_call(&self, method: &str, args: Vec<DynSolValue>) {
        self.chain.lock().unwrap().failing_call = Some((method.to_string(), args));
    }

    /// Hold calls to `method` until `count` of them are in flight at once.
    pub fn gate_calls(&self, method: &str, count: usize) {
        self.chain
            .lock()
            .unwrap()
            .gates
            .insert(method.to_string(), Arc::new(Barrier::new(count)));
    }

    fn chain_id(&self, network: &str) -> Result<u64, DeployError> {
        self.networks
            .get(network)
            .copied()
            .ok_or_else(|| DeployError::UnknownNetwork(network.to_string()))
    }
}

impl Ledger for MockLedger {
    type Contract = MockContract;

    async fn connect(&self, network: &str) -> Result<NetworkInfo> {
        Ok(NetworkInfo {
            name: network.to_string(),
            chain_id: self.chain_id(network)?,
        })
    }

    async fn deploy(
        &self,
        network: &str,
        kind: ContractKind,
        _libraries: &Libraries,
        args: Vec<DynSolValue>,
    ) -> Result<MockContract> {
        self.chain_id(network)?;
        tokio::task::yield_now().await;

        let mut chain = self.chain.lock().unwrap();
        if chain.failing_deploy == Some(kind) {
            return Err(DeployError::ChainRejected {
                action: format!("deployment of {kind}"),
                reason: "execution reverted".to_string(),
            }
            .into());
        }

        chain.next_address += 1;
        let mut bytes = [0u8; 20];
        bytes[0] = 0xc0;
        bytes[12..].copy_from_slice(&chain.next_address.to_be_bytes());
        let address = Address::from(bytes);

        chain.deployed.insert(address, kind);
        chain.events.push(Event::Deploy {
            kind,
            address,
            args,
        });

        Ok(MockContract {
            kind,
            address,
            attached: false,
            chain: self.chain.clone(),
        })
    }

    fn attach(&self, network: &str, kind: ContractKind, address: Address) -> Result<MockContract> {
        self.chain_id(network)?;
        Ok(MockContract {
            kind,
            address,
            attached: true,
            chain: self.chain.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct MockContract {
    kind: ContractKind,
    address: Address,
    attached: bool,
    chain: Arc<Mutex<Chain>>,
}

impl ContractHandle for MockContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn call(&self, method: &str, args: Vec<DynSolValue>) -> Result<B256> {
        tokio::task::yield_now().await;

        let gate = self.chain.lock().unwrap().gates.get(method).cloned();
        if let Some(barrier) = gate {
            barrier.wait().await;
        }

        let mut chain = self.chain.lock().unwrap();
        if chain.deployed.get(&self.address) != Some(&self.kind) {
            // Another contract reverts on the unknown selector. Only a handle
            // located by address can point at one.
            if self.attached {
                return Err(DeployError::LocatorMismatch {
                    kind: self.kind,
                    address: self.address,
                    method: method.to_string(),
                }
                .into());
            }
            return Err(DeployError::ChainRejected {
                action: format!("{}.{method}", self.kind),
                reason: "execution reverted".to_string(),
            }
            .into());
        }

        chain.events.push(Event::Call {
            address: self.address,
            method: method.to_string(),
            args: args.clone(),
        });

        if chain
            .failing_call
            .as_ref()
            .is_some_and(|(m, a)| m == method && *a == args)
        {
            return Err(DeployError::ChainRejected {
                action: format!("{}.{method}", self.kind),
                reason: "execution reverted".to_string(),
            }
            .into());
        }

        Ok(B256::with_last_byte(chain.events.len() as u8))
    }
}

/// Generate a random chain ID so tests never share a state file name.
pub fn random_chain_id() -> u64 {
    rand::rng().random_range(100000..=999999)
}

pub fn address(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// Constants for a network called `testnet`.
pub fn testnet_constants() -> NetworkConstants {
    NetworkConstants {
        selora_v2_router: address(0xa2),
        selora_v3_router: address(0xa3),
        selora_v3_factory: address(0xf3),
        team: address(0x7e),
        weth: address(0xee),
        trusted_tokens: vec![address(0x01), address(0x02)],
    }
}

pub fn constants_table(networks: &[&str]) -> ConstantsTable {
    ConstantsTable::new(
        networks
            .iter()
            .map(|name| (name.to_string(), testnet_constants()))
            .collect(),
    )
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
