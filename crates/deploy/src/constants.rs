//! Per-network constructor arguments.

use std::{collections::BTreeMap, path::Path};

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use derive_more::Deref;
use serde::{Deserialize, Serialize};

use crate::DeployError;

/// Fee passed to the swap executor constructor.
pub const SWAP_EXECUTOR_FEE: u64 = 1000;

/// Constructor inputs for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConstants {
    /// Constructor argument of the V2 router.
    pub selora_v2_router: Address,
    /// First constructor argument of the V3 router.
    pub selora_v3_router: Address,
    /// The V3 factory, second constructor argument of the V3 router.
    pub selora_v3_factory: Address,
    /// Team / treasury address handed to the swap executor.
    pub team: Address,
    /// Wrapped native token.
    pub weth: Address,
    /// Tokens the swap executor trusts.
    pub trusted_tokens: Vec<Address>,
}

/// Resolves the constants of a network by name.
pub trait ConstantsSource: Send + Sync {
    fn resolve(&self, network: &str) -> Result<NetworkConstants, DeployError>;
}

/// Network name to constants, as read from a `constants.json` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstantsTable(BTreeMap<String, NetworkConstants>);

impl ConstantsTable {
    pub fn new(networks: BTreeMap<String, NetworkConstants>) -> Self {
        Self(networks)
    }

    /// Load the table from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read constants from {}", path.display()))?;
        let table: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse constants file {}", path.display()))?;

        tracing::debug!(path = %path.display(), networks = table.len(), "Constants loaded");
        Ok(table)
    }
}

impl ConstantsSource for ConstantsTable {
    fn resolve(&self, network: &str) -> Result<NetworkConstants, DeployError> {
        self.get(network)
            .cloned()
            .ok_or_else(|| DeployError::ConfigMissing(network.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    const CONSTANTS: &str = r#"{
        "testnet": {
            "seloraV2Router": "0x1000000000000000000000000000000000000001",
            "seloraV3Router": "0x1000000000000000000000000000000000000002",
            "seloraV3Factory": "0x1000000000000000000000000000000000000003",
            "team": "0x1000000000000000000000000000000000000004",
            "weth": "0x1000000000000000000000000000000000000005",
            "trustedTokens": [
                "0x1000000000000000000000000000000000000006",
                "0x1000000000000000000000000000000000000007"
            ]
        }
    }"#;

    #[test]
    fn test_load_and_resolve() {
        let temp_dir = TempDir::new("selora-constants").expect("Failed to create temp dir");
        let path = temp_dir.path().join("constants.json");
        std::fs::write(&path, CONSTANTS).unwrap();

        let table = ConstantsTable::load_from_file(&path).unwrap();
        let constants = table.resolve("testnet").unwrap();

        assert_eq!(
            constants.team,
            "0x1000000000000000000000000000000000000004".parse::<Address>().unwrap()
        );
        assert_eq!(constants.trusted_tokens.len(), 2);
        assert_eq!(
            constants.trusted_tokens[1],
            "0x1000000000000000000000000000000000000007".parse::<Address>().unwrap()
        );
    }

    #[test]
    fn test_missing_network() {
        let table: ConstantsTable = serde_json::from_str(CONSTANTS).unwrap();

        assert!(matches!(
            table.resolve("mainnet"),
            Err(DeployError::ConfigMissing(name)) if name == "mainnet"
        ));
    }

    #[test]
    fn test_rejects_malformed_address() {
        let json = CONSTANTS.replace("0x1000000000000000000000000000000000000004", "0xTEAM");
        assert!(serde_json::from_str::<ConstantsTable>(&json).is_err());
    }
}
