//! Persisted record of the deployed addresses, one JSON file per chain.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{DeployError, fs::FsHandler};

/// Default directory the state files are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "scripts/deployments";

/// Addresses recorded for one chain.
///
/// `swap_executor` is written by the core deployment and carried over unchanged
/// afterwards. `routers` only ever holds the active router generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentState {
    pub routers: Vec<Address>,
    pub swap_executor: Address,
}

impl DeploymentState {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize deployment state")
    }

    /// Write the state to `path`, creating the file or replacing its contents.
    ///
    /// The JSON is rendered before anything touches the disk, and the file is
    /// replaced in one rename, so a failure leaves the previous record intact.
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;

        if let Err(source) = FsHandler::replace_file(path, json.as_bytes()).await {
            tracing::error!(path = %path.display(), error = %source, "Failed to write deployment state");
            return Err(DeployError::FileIo {
                action: "write",
                path: path.to_path_buf(),
                source,
            }
            .into());
        }

        tracing::info!(path = %path.display(), "Deployment state saved");
        Ok(())
    }

    /// Read the state from `path`.
    ///
    /// Fails with [`DeployError::StateMissing`] if the file does not exist.
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(DeployError::StateMissing {
                    path: path.to_path_buf(),
                }
                .into());
            }
            Err(source) => {
                return Err(DeployError::FileIo {
                    action: "read",
                    path: path.to_path_buf(),
                    source,
                }
                .into());
            }
        };

        let state: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse deployment state {}", path.display()))?;

        tracing::info!(path = %path.display(), routers = state.routers.len(), "Deployment state loaded");
        Ok(state)
    }
}

/// Locates the state file of a chain inside an output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateStore {
    output_dir: PathBuf,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

impl StateStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `<output-dir>/CoreOutput-<chain_id>.json`. Only the chain id is used, so
    /// every alias of a chain shares one record.
    pub fn path_for(&self, chain_id: u64) -> PathBuf {
        self.output_dir.join(format!("CoreOutput-{chain_id}.json"))
    }

    pub async fn load(&self, chain_id: u64) -> Result<DeploymentState> {
        DeploymentState::load_from_file(&self.path_for(chain_id)).await
    }

    /// Save the state of a chain and return the path written.
    pub async fn save(&self, chain_id: u64, state: &DeploymentState) -> Result<PathBuf> {
        FsHandler::create_output_directory(&self.output_dir)
            .await
            .map_err(|source| DeployError::FileIo {
                action: "create",
                path: self.output_dir.clone(),
                source,
            })?;

        let path = self.path_for(chain_id);
        state.save_to_file(&path).await?;
        Ok(path)
    }
}
