use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use alloy_primitives::{Address, B256};
use exit_tree_types::{ExitRootSource, MAINNET_NETWORK_ID, TREE_DEPTH};
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::global_exit_root::RedundantUpdatePolicy;

pub const DEFAULT_ROLLUP_NETWORK_ID: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgeConfig {
    /// The network this bridge instance runs on.
    pub network_id: u32,
    #[serde(default = "default_rollup_network_id")]
    pub rollup_network_id: u32,
    /// Deployer address for wrapped token CREATE2 addresses.
    #[serde(default)]
    pub bridge_address: Address,
    #[serde(default)]
    pub wrapper_init_code_hash: B256,
    #[serde(default = "default_tree_depth")]
    pub tree_depth: usize,
    #[serde(default)]
    pub reject_zero_amount: bool,
    #[serde(default)]
    pub redundant_update_policy: RedundantUpdatePolicy,
    /// Directory of the bridge's deposit log, claim set and snapshots. In-memory when unset.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    /// Directory of the global exit root history. In-memory when unset.
    #[serde(default)]
    pub exit_root_store_path: Option<PathBuf>,
}

fn default_rollup_network_id() -> u32 {
    DEFAULT_ROLLUP_NETWORK_ID
}

fn default_tree_depth() -> usize {
    TREE_DEPTH
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::for_network(MAINNET_NETWORK_ID)
    }
}

impl BridgeConfig {
    pub fn for_network(network_id: u32) -> Self {
        Self {
            network_id,
            rollup_network_id: default_rollup_network_id(),
            bridge_address: Address::ZERO,
            wrapper_init_code_hash: B256::ZERO,
            tree_depth: default_tree_depth(),
            reject_zero_amount: false,
            redundant_update_policy: RedundantUpdatePolicy::default(),
            storage_path: None,
            exit_root_store_path: None,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("cannot read {}: {e}", path.display())))?;
        serde_yaml::from_str(&yaml).map_err(|e| BridgeError::Config(format!("invalid config {}: {e}", path.display())))
    }

    /// Reads `BRIDGE_*` variables, loading a `.env` file first if one exists.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let network_id = parse_env::<u32>("BRIDGE_NETWORK_ID")?.unwrap_or(MAINNET_NETWORK_ID);
        let mut config = Self::for_network(network_id);
        if let Some(rollup_network_id) = parse_env("BRIDGE_ROLLUP_NETWORK_ID")? {
            config.rollup_network_id = rollup_network_id;
        }
        if let Some(bridge_address) = parse_env("BRIDGE_ADDRESS")? {
            config.bridge_address = bridge_address;
        }
        if let Some(hash) = parse_env("BRIDGE_WRAPPER_INIT_CODE_HASH")? {
            config.wrapper_init_code_hash = hash;
        }
        if let Some(depth) = parse_env("BRIDGE_TREE_DEPTH")? {
            config.tree_depth = depth;
        }
        if let Some(reject) = parse_env("BRIDGE_REJECT_ZERO_AMOUNT")? {
            config.reject_zero_amount = reject;
        }
        if let Some(policy) = parse_env("BRIDGE_REDUNDANT_UPDATE_POLICY")? {
            config.redundant_update_policy = policy;
        }
        config.storage_path = env::var("BRIDGE_STORAGE_PATH").ok().map(PathBuf::from);
        config.exit_root_store_path = env::var("BRIDGE_EXIT_ROOT_STORE_PATH").ok().map(PathBuf::from);
        Ok(config)
    }

    /// The side of the global exit root this network's deposits feed.
    pub fn exit_root_source(&self) -> ExitRootSource {
        ExitRootSource::for_network(self.network_id)
    }

    /// The network whose deposits this bridge claims, and the side of the global exit root
    /// their exit tree feeds.
    pub fn claim_source(&self) -> (u32, ExitRootSource) {
        match self.exit_root_source() {
            ExitRootSource::Mainnet => (self.rollup_network_id, ExitRootSource::Rollup),
            ExitRootSource::Rollup => (MAINNET_NETWORK_ID, ExitRootSource::Mainnet),
        }
    }
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|e| BridgeError::Config(format!("invalid {key}={value}: {e}"))),
        Err(_) => Ok(None),
    }
}
