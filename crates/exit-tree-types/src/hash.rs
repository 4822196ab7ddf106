use std::sync::LazyLock;

use alloy_primitives::{B256, keccak256};
use sha3::{Digest, Keccak256};

use crate::tree::TREE_DEPTH;

/// Roots of empty subtrees, indexed by height. `ZERO_HASHES[0]` is the zero leaf.
pub static ZERO_HASHES: LazyLock<[B256; TREE_DEPTH + 1]> = LazyLock::new(|| {
    let mut hashes = [B256::ZERO; TREE_DEPTH + 1];
    for height in 0..TREE_DEPTH {
        hashes[height + 1] = keccak256_concat(&hashes[height], &hashes[height]);
    }
    hashes
});

/// Hash two nodes together using Keccak256
pub fn keccak256_concat(left: &B256, right: &B256) -> B256 {
    let mut hasher = Keccak256::new();
    hasher.update(left);
    hasher.update(right);
    B256::from_slice(&hasher.finalize())
}

/// Commits an arbitrary-length payload to a fixed-size digest.
pub fn metadata_hash(metadata: &[u8]) -> B256 {
    keccak256(metadata)
}
