//! Fuses the mainnet and rollup exit roots into the global exit root both chains verify
//! claims against, and keeps every published value.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::B256;
use exit_tree_types::events::GlobalExitRootEvent;
use exit_tree_types::{ExitRootSource, GlobalExitRootRecord, calculate_global_exit_root};
use serde::{Deserialize, Serialize};
use storage::{ExitRootStorage, RocksDbExitRootStore, Storage};
use tracing::{debug, info};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};

/// What `update` does with a global exit root that has already been published.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RedundantUpdatePolicy {
    /// Append a fresh timestamped record anyway. Lookups by digest still resolve to the first one.
    Append,
    /// Leave the history untouched and return the known digest.
    #[default]
    Skip,
}

impl FromStr for RedundantUpdatePolicy {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "skip" => Ok(Self::Skip),
            other => Err(BridgeError::Config(format!("unknown redundant update policy: {other}"))),
        }
    }
}

impl fmt::Display for RedundantUpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => write!(f, "append"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

#[derive(Debug, Default)]
struct HistoryState {
    last_mainnet_exit_root: B256,
    last_rollup_exit_root: B256,
    history: Vec<GlobalExitRootRecord>,
    /// Digest to the sequence that first published it.
    by_digest: HashMap<B256, u64>,
    events: Vec<GlobalExitRootEvent>,
}

impl HistoryState {
    fn from_history(history: Vec<GlobalExitRootRecord>) -> Self {
        let mut by_digest = HashMap::with_capacity(history.len());
        for record in &history {
            by_digest.entry(record.global_exit_root).or_insert(record.sequence);
        }
        let (last_mainnet_exit_root, last_rollup_exit_root) = history
            .last()
            .map(|record| (record.mainnet_exit_root, record.rollup_exit_root))
            .unwrap_or_default();
        Self {
            last_mainnet_exit_root,
            last_rollup_exit_root,
            history,
            by_digest,
            events: Vec::new(),
        }
    }
}

pub struct GlobalExitRootManager {
    policy: RedundantUpdatePolicy,
    state: RwLock<HistoryState>,
    storage: Option<Arc<dyn ExitRootStorage>>,
}

impl GlobalExitRootManager {
    /// An in-memory manager with empty history and both exit roots at zero.
    pub fn new(policy: RedundantUpdatePolicy) -> Self {
        Self {
            policy,
            state: RwLock::new(HistoryState::default()),
            storage: None,
        }
    }

    /// A manager backed by `storage`, resuming from whatever history it already holds.
    pub fn with_storage(policy: RedundantUpdatePolicy, storage: Arc<dyn ExitRootStorage>) -> Result<Self> {
        let history = storage.load_history()?;
        info!(records = history.len(), %policy, "loaded global exit root history");
        Ok(Self {
            policy,
            state: RwLock::new(HistoryState::from_history(history)),
            storage: Some(storage),
        })
    }

    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        match &config.exit_root_store_path {
            Some(path) => {
                let store = RocksDbExitRootStore::open(path)?;
                Self::with_storage(config.redundant_update_policy, Arc::new(store))
            }
            None => Ok(Self::new(config.redundant_update_policy)),
        }
    }

    pub fn policy(&self) -> RedundantUpdatePolicy {
        self.policy
    }

    /// Publish the global exit root of the given pair and return it.
    pub fn update(&self, mainnet_exit_root: B256, rollup_exit_root: B256) -> Result<B256> {
        let mut state = self.state.write().unwrap();
        self.apply(&mut state, mainnet_exit_root, rollup_exit_root)
    }

    /// Replace one side's exit root, keeping the other side's last known value.
    pub fn update_exit_root(&self, source: ExitRootSource, exit_root: B256) -> Result<B256> {
        let mut state = self.state.write().unwrap();
        let (mainnet_exit_root, rollup_exit_root) = match source {
            ExitRootSource::Mainnet => (exit_root, state.last_rollup_exit_root),
            ExitRootSource::Rollup => (state.last_mainnet_exit_root, exit_root),
        };
        self.apply(&mut state, mainnet_exit_root, rollup_exit_root)
    }

    fn apply(&self, state: &mut HistoryState, mainnet_exit_root: B256, rollup_exit_root: B256) -> Result<B256> {
        let global_exit_root = calculate_global_exit_root(&mainnet_exit_root, &rollup_exit_root);
        if self.policy == RedundantUpdatePolicy::Skip && state.by_digest.contains_key(&global_exit_root) {
            debug!(%global_exit_root, "global exit root already published");
            state.last_mainnet_exit_root = mainnet_exit_root;
            state.last_rollup_exit_root = rollup_exit_root;
            return Ok(global_exit_root);
        }

        let record = GlobalExitRootRecord::new(
            state.history.len() as u64,
            mainnet_exit_root,
            rollup_exit_root,
            unix_timestamp(),
        );
        // nothing in memory changes unless the record is durable
        if let Some(storage) = &self.storage {
            storage.append_record(&record)?;
        }

        state.by_digest.entry(global_exit_root).or_insert(record.sequence);
        state.last_mainnet_exit_root = mainnet_exit_root;
        state.last_rollup_exit_root = rollup_exit_root;
        state.events.push(GlobalExitRootEvent {
            mainnet_exit_root,
            rollup_exit_root,
            global_exit_root,
        });
        info!(
            sequence = record.sequence,
            %mainnet_exit_root,
            %rollup_exit_root,
            %global_exit_root,
            "global exit root updated"
        );
        state.history.push(record);
        Ok(global_exit_root)
    }

    pub fn latest(&self) -> Option<GlobalExitRootRecord> {
        self.state.read().unwrap().history.last().cloned()
    }

    /// The record that first published `global_exit_root`.
    pub fn get(&self, global_exit_root: &B256) -> Option<GlobalExitRootRecord> {
        let state = self.state.read().unwrap();
        let sequence = *state.by_digest.get(global_exit_root)?;
        state.history.get(sequence as usize).cloned()
    }

    pub fn get_by_index(&self, sequence: u64) -> Option<GlobalExitRootRecord> {
        self.state.read().unwrap().history.get(sequence as usize).cloned()
    }

    pub fn contains(&self, global_exit_root: &B256) -> bool {
        self.state.read().unwrap().by_digest.contains_key(global_exit_root)
    }

    /// Number of records in the history.
    pub fn len(&self) -> usize {
        self.state.read().unwrap().history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_mainnet_exit_root(&self) -> B256 {
        self.state.read().unwrap().last_mainnet_exit_root
    }

    pub fn last_rollup_exit_root(&self) -> B256 {
        self.state.read().unwrap().last_rollup_exit_root
    }

    pub fn last_exit_root(&self, source: ExitRootSource) -> B256 {
        match source {
            ExitRootSource::Mainnet => self.last_mainnet_exit_root(),
            ExitRootSource::Rollup => self.last_rollup_exit_root(),
        }
    }

    /// Take the update notifications accumulated since the last call.
    pub fn drain_events(&self) -> Vec<GlobalExitRootEvent> {
        std::mem::take(&mut self.state.write().unwrap().events)
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
