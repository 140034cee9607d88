//! Error kinds surfaced by the deployment flows.

use std::path::PathBuf;

use alloy_core::primitives::Address;

use crate::ContractKind;

/// Failures the flows distinguish between.
///
/// Library functions return [`anyhow::Result`]; these variants travel inside the
/// `anyhow::Error` and can be recovered with [`DeployError::find`].
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The requested network has no entry in the constants table.
    #[error("no deployment constants for network `{0}`")]
    ConfigMissing(String),

    /// The requested network is not configured on the ledger.
    #[error("network `{0}` is not configured")]
    UnknownNetwork(String),

    /// No artifact could be resolved for a contract kind.
    #[error("no artifact found for contract `{0}`")]
    UnknownContract(ContractKind),

    /// The integration flow ran before a core deployment was recorded.
    #[error("no deployment state recorded at {}", path.display())]
    StateMissing { path: PathBuf },

    /// A submitted transaction was rejected by the node or reverted.
    #[error("{action} was rejected: {reason}")]
    ChainRejected { action: String, reason: String },

    /// The attached address does not implement the expected interface.
    #[error("contract at {address} does not implement `{method}` of {kind}")]
    LocatorMismatch {
        kind: ContractKind,
        address: Address,
        method: String,
    },

    /// The state file could not be read or written.
    #[error("failed to {action} {}", path.display())]
    FileIo {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DeployError {
    /// Find the first [`DeployError`] in the chain of an [`anyhow::Error`].
    pub fn find(err: &anyhow::Error) -> Option<&DeployError> {
        err.chain().find_map(|cause| cause.downcast_ref::<DeployError>())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn test_find_through_context() {
        let result: anyhow::Result<()> = Err(DeployError::ConfigMissing("testnet".to_string()))
            .context("Failed to resolve constants");

        let err = result.unwrap_err();
        assert!(matches!(
            DeployError::find(&err),
            Some(DeployError::ConfigMissing(name)) if name == "testnet"
        ));
    }

    #[test]
    fn test_find_absent() {
        let err = anyhow::anyhow!("plain failure");
        assert!(DeployError::find(&err).is_none());
    }
}
