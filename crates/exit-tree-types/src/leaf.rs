use alloy_primitives::{Address, B256, U256, keccak256};
use serde::{Deserialize, Serialize};

use crate::hash::metadata_hash;

/// Packed length of an encoded leaf: type, two networks, two addresses, amount, metadata hash.
pub const LEAF_ENCODED_LENGTH: usize = 1 + 4 + 20 + 4 + 20 + 32 + 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LeafType {
    Asset = 0,
    Message = 1,
}

impl From<LeafType> for u8 {
    fn from(leaf_type: LeafType) -> Self {
        leaf_type as u8
    }
}

/// A single transfer committed into an exit tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    pub leaf_type: LeafType,
    pub origin_network: u32,
    pub origin_address: Address,
    pub destination_network: u32,
    pub destination_address: Address,
    pub amount: U256,
    pub metadata_hash: B256,
}

impl Leaf {
    pub fn new(
        leaf_type: LeafType,
        origin_network: u32,
        origin_address: Address,
        destination_network: u32,
        destination_address: Address,
        amount: U256,
        metadata: &[u8],
    ) -> Self {
        Self {
            leaf_type,
            origin_network,
            origin_address,
            destination_network,
            destination_address,
            amount,
            metadata_hash: metadata_hash(metadata),
        }
    }

    /// The leaf's identity in the exit tree.
    pub fn digest(&self) -> B256 {
        keccak256(encode_leaf(self))
    }
}

/// Packs the leaf fields big-endian, without padding.
pub fn encode_leaf(leaf: &Leaf) -> [u8; LEAF_ENCODED_LENGTH] {
    let mut encoded = Vec::with_capacity(LEAF_ENCODED_LENGTH);
    encoded.push(u8::from(leaf.leaf_type));
    encoded.extend_from_slice(&leaf.origin_network.to_be_bytes());
    encoded.extend_from_slice(leaf.origin_address.as_slice());
    encoded.extend_from_slice(&leaf.destination_network.to_be_bytes());
    encoded.extend_from_slice(leaf.destination_address.as_slice());
    encoded.extend_from_slice(&leaf.amount.to_be_bytes::<32>());
    encoded.extend_from_slice(leaf.metadata_hash.as_slice());

    let mut packed = [0u8; LEAF_ENCODED_LENGTH];
    packed.copy_from_slice(&encoded);
    packed
}
