use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::leaf::{Leaf, LeafType};

/// Identifies a claimable leaf: the network whose exit tree holds it and its index there.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClaimKey {
    pub source_network: u32,
    pub index: u32,
}

/// A consumed leaf. Being present in a bridge's claim set is what marks it claimed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClaimRecord {
    pub key: ClaimKey,
    pub leaf_digest: B256,
    pub leaf_type: LeafType,
    pub origin_network: u32,
    pub origin_address: Address,
    pub destination_network: u32,
    pub destination_address: Address,
    pub amount: U256,
}

impl ClaimRecord {
    pub fn new(key: ClaimKey, leaf: &Leaf) -> Self {
        Self {
            key,
            leaf_digest: leaf.digest(),
            leaf_type: leaf.leaf_type,
            origin_network: leaf.origin_network,
            origin_address: leaf.origin_address,
            destination_network: leaf.destination_network,
            destination_address: leaf.destination_address,
            amount: leaf.amount,
        }
    }
}
