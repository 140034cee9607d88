//! Hardhat build artifacts: ABI lookup, library linking and call encoding.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use alloy_core::{
    dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier},
    json_abi::{JsonAbi, Param},
    primitives::Bytes,
};
use anyhow::{Context, Result};
use serde::Deserialize;

use super::{ContractKind, Libraries};
use crate::DeployError;

/// Offsets of one library placeholder inside the creation bytecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LinkOffset {
    pub start: usize,
    pub length: usize,
}

/// `source file -> library name -> placeholder offsets`, as emitted by Hardhat.
pub type LinkReferences = BTreeMap<String, BTreeMap<String, Vec<LinkOffset>>>;

/// A compiled contract as found in the Hardhat `artifacts/` directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    pub abi: JsonAbi,
    /// Creation bytecode, possibly with unlinked library placeholders.
    pub bytecode: String,
    #[serde(default)]
    pub link_references: LinkReferences,
}

impl Artifact {
    /// Parse an artifact from its JSON representation.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse contract artifact")
    }

    /// Creation bytecode with every library placeholder replaced by its address.
    pub fn linked_bytecode(&self, libraries: &Libraries) -> Result<Vec<u8>> {
        let mut code = self.bytecode.trim_start_matches("0x").to_string();

        for (source, libs) in &self.link_references {
            for (name, offsets) in libs {
                let address = libraries
                    .get(&format!("{source}:{name}"))
                    .or_else(|| libraries.get(name))
                    .with_context(|| {
                        format!(
                            "Missing address for library {name} required by {}",
                            self.contract_name
                        )
                    })?;
                let address_hex = hex::encode(address);

                for offset in offsets {
                    let (from, to) = (offset.start * 2, (offset.start + offset.length) * 2);
                    if offset.length != 20 || to > code.len() {
                        anyhow::bail!(
                            "Invalid link reference for {name} at byte {} in {}",
                            offset.start,
                            self.contract_name
                        );
                    }
                    code.replace_range(from..to, &address_hex);
                }
            }
        }

        if code.contains("__$") {
            anyhow::bail!("Bytecode of {} has unlinked libraries", self.contract_name);
        }

        hex::decode(&code)
            .with_context(|| format!("Invalid bytecode in artifact {}", self.contract_name))
    }

    /// Build the payload of a deployment transaction: linked bytecode followed by the
    /// ABI-encoded constructor arguments.
    pub fn deploy_data(&self, libraries: &Libraries, args: &[DynSolValue]) -> Result<Bytes> {
        let mut data = self.linked_bytecode(libraries)?;

        match &self.abi.constructor {
            Some(constructor) => {
                let encoded = conform_args(&constructor.inputs, args)
                    .and_then(|args| Ok(constructor.abi_encode_input(&args)?))
                    .with_context(|| {
                        format!("Invalid constructor arguments for {}", self.contract_name)
                    })?;
                data.extend_from_slice(&encoded);
            }
            None if !args.is_empty() => {
                anyhow::bail!(
                    "{} has no constructor but {} arguments were given",
                    self.contract_name,
                    args.len()
                );
            }
            None => {}
        }

        Ok(data.into())
    }

    /// Encode a call to `method`, choosing the overload whose arity matches `args`.
    ///
    /// Returns `None` when the ABI has no such method.
    pub fn encode_call(&self, method: &str, args: &[DynSolValue]) -> Result<Option<Bytes>> {
        let Some(function) = self
            .abi
            .function(method)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == args.len()))
        else {
            return Ok(None);
        };

        let data = conform_args(&function.inputs, args)
            .and_then(|args| Ok(function.abi_encode_input(&args)?))
            .with_context(|| format!("Invalid arguments for {}.{method}", self.contract_name))?;

        Ok(Some(data.into()))
    }
}

/// Re-type integer arguments to the widths the ABI declares.
///
/// Callers pass amounts as `uint256`; a `uint16` parameter receives the same
/// value as long as it fits.
fn conform_args(params: &[Param], args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
    if params.len() != args.len() {
        return Ok(args.to_vec());
    }

    params
        .iter()
        .zip(args)
        .map(|(param, arg)| conform(arg, &param.resolve()?))
        .collect()
}

fn conform(value: &DynSolValue, ty: &DynSolType) -> Result<DynSolValue> {
    Ok(match (value, ty) {
        (DynSolValue::Uint(v, _), DynSolType::Uint(bits)) => {
            if v.bit_len() > *bits {
                anyhow::bail!("{v} does not fit in uint{bits}");
            }
            DynSolValue::Uint(*v, *bits)
        }
        (DynSolValue::Array(values), DynSolType::Array(inner)) => DynSolValue::Array(
            values
                .iter()
                .map(|value| conform(value, inner))
                .collect::<Result<_>>()?,
        ),
        _ => value.clone(),
    })
}

/// Resolves contract kinds to artifacts below a Hardhat `artifacts/` directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load the artifact for a contract kind.
    pub fn load(&self, kind: ContractKind) -> Result<Artifact> {
        let file_name = format!("{kind}.json");
        let path = find_file(&self.root, &file_name)
            .with_context(|| format!("Failed to search artifacts in {}", self.root.display()))?
            .ok_or(DeployError::UnknownContract(kind))?;

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let artifact = Artifact::from_json(&content)
            .with_context(|| format!("Failed to load artifact {}", path.display()))?;

        tracing::debug!(contract = %kind, path = %path.display(), "Artifact loaded");
        Ok(artifact)
    }
}

/// Depth-first search for `file_name` below `dir`, in sorted order.
fn find_file(dir: &Path, file_name: &str) -> std::io::Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut entries = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            if let Some(found) = find_file(&path, file_name)? {
                return Ok(Some(found));
            }
        } else if path.file_name().is_some_and(|name| name == file_name) {
            return Ok(Some(path));
        }
    }

    Ok(None)
}
