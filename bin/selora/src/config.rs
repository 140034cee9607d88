//! Application configuration: `Selora.toml` merged with `SELORA_*` environment variables.

use std::{collections::BTreeMap, path::PathBuf};

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use selora_deploy::{
    ArtifactStore, ConstantsTable, Deployer, NetworkConfig, RpcLedger, StateStore,
    state::DEFAULT_OUTPUT_DIR,
};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "Selora.toml";
/// Environment variable overriding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "SELORA_CONFIG";
/// Prefix of the environment variables merged over the file.
pub const ENV_PREFIX: &str = "SELORA_";

fn default_verbosity() -> String {
    "info".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_constants() -> PathBuf {
    PathBuf::from("scripts/constants.json")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Maximum log level (`off`, `error`, `warn`, `info`, `debug`, `trace`).
    #[serde(default = "default_verbosity")]
    pub verbosity: String,

    /// Directory the `CoreOutput-<chainId>.json` files live in.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Root of the compiled contract artifacts.
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,

    /// Per-network constructor constants.
    #[serde(default = "default_constants")]
    pub constants: PathBuf,

    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
}

impl AppConfig {
    /// Load from the configuration file and the environment.
    ///
    /// A missing file is not an error; every key has a default except the
    /// networks, which are checked when a flow connects.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        tracing::debug!(path = %path.display(), "Loading configuration");

        let figment = Figment::new().merge(Toml::file(&path)).merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["config"])
                .split("__"),
        );
        Self::from_figment(figment)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        Ok(figment.extract()?)
    }

    pub fn level(&self) -> Result<LevelFilter> {
        self.verbosity
            .parse()
            .with_context(|| format!("Invalid verbosity: {}", self.verbosity))
    }

    /// Build a deployer talking JSON-RPC to the configured networks.
    pub fn deployer(&self) -> Result<Deployer<RpcLedger, ConstantsTable>> {
        let constants = ConstantsTable::load_from_file(&self.constants)?;
        let ledger = RpcLedger::new(
            ArtifactStore::new(&self.artifacts_dir),
            self.networks.clone(),
        )?;

        Ok(Deployer::new(
            ledger,
            constants,
            StateStore::new(&self.output_dir),
        ))
    }
}
