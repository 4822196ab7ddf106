use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::hash::keccak256_concat;

pub const MAINNET_NETWORK_ID: u32 = 0;

/// Fuses the two exit roots into the checkpoint both chains verify claims against.
pub fn calculate_global_exit_root(mainnet_exit_root: &B256, rollup_exit_root: &B256) -> B256 {
    keccak256_concat(mainnet_exit_root, rollup_exit_root)
}

/// Which half of the global exit root an exit tree feeds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitRootSource {
    Mainnet,
    Rollup,
}

impl ExitRootSource {
    pub fn for_network(network_id: u32) -> Self {
        if network_id == MAINNET_NETWORK_ID {
            Self::Mainnet
        } else {
            Self::Rollup
        }
    }
}

/// One entry of the append-only global exit root history.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GlobalExitRootRecord {
    pub sequence: u64,
    pub mainnet_exit_root: B256,
    pub rollup_exit_root: B256,
    pub global_exit_root: B256,
    pub timestamp: u64,
}

impl GlobalExitRootRecord {
    pub fn new(sequence: u64, mainnet_exit_root: B256, rollup_exit_root: B256, timestamp: u64) -> Self {
        Self {
            sequence,
            mainnet_exit_root,
            rollup_exit_root,
            global_exit_root: calculate_global_exit_root(&mainnet_exit_root, &rollup_exit_root),
            timestamp,
        }
    }

    pub fn exit_root(&self, source: ExitRootSource) -> B256 {
        match source {
            ExitRootSource::Mainnet => self.mainnet_exit_root,
            ExitRootSource::Rollup => self.rollup_exit_root,
        }
    }
}
