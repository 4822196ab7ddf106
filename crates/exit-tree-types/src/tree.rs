//! Incremental merkle tree recording every deposit leaving a network.
//!
//! The frontier (`branch`) and the root are maintained the way the Ethereum deposit contract's
//! incremental tree does it: one stored node per level, updated in O(depth) on every
//! insertion. Completed subtree roots are retained per level so that inclusion proofs can be
//! served against the current root or any earlier one.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::hash::{ZERO_HASHES, keccak256_concat};

pub const TREE_DEPTH: usize = 32;

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct ExitTree {
    depth: usize,
    branch: Vec<B256>,
    count: u64,
    root: B256,
    /// `nodes[h][i]` is the root of the completed subtree covering leaves `[i << h, (i + 1) << h)`.
    nodes: Vec<Vec<B256>>,
}

impl Default for ExitTree {
    fn default() -> Self {
        Self::empty(TREE_DEPTH)
    }
}

impl ExitTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tree of a non-standard depth, mostly useful to exercise capacity limits.
    pub fn with_depth(depth: usize) -> Result<Self, TreeError> {
        if depth == 0 || depth > TREE_DEPTH {
            return Err(TreeError::InvalidDepth(depth));
        }
        Ok(Self::empty(depth))
    }

    fn empty(depth: usize) -> Self {
        Self {
            depth,
            branch: vec![B256::ZERO; depth],
            count: 0,
            root: ZERO_HASHES[depth],
            nodes: vec![Vec::new(); depth + 1],
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of leaves inserted so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn capacity(&self) -> u64 {
        1u64 << self.depth
    }

    pub fn root(&self) -> B256 {
        self.root
    }

    pub fn branch(&self) -> &[B256] {
        &self.branch
    }

    /// Insert a new leaf, returning its index and the new root.
    pub fn insert(&mut self, leaf: B256) -> Result<(u32, B256), TreeError> {
        if self.count >= self.capacity() {
            return Err(TreeError::CapacityExceeded {
                capacity: self.capacity(),
            });
        }
        let index = self.count as u32;
        self.count += 1;
        self.nodes[0].push(leaf);

        let mut node = leaf;
        let mut size = self.count;
        for height in 0..self.depth {
            if (size & 1) == 1 {
                self.branch[height] = node;
                self.root = self.root_from_branch();
                return Ok((index, self.root));
            }
            node = keccak256_concat(&self.branch[height], &node);
            self.nodes[height + 1].push(node);
            size /= 2;
        }

        // the last free slot was filled, `node` now covers every leaf
        self.root = node;
        Ok((index, self.root))
    }

    fn root_from_branch(&self) -> B256 {
        let mut current = B256::ZERO;
        for (height, zero) in ZERO_HASHES.iter().take(self.depth).enumerate() {
            current = match (self.count >> height) & 1 {
                1 => keccak256_concat(&self.branch[height], &current),
                _ => keccak256_concat(&current, zero),
            };
        }
        current
    }

    /// Sibling path of `index` against the current root.
    pub fn prove(&self, index: u32) -> Result<Vec<B256>, TreeError> {
        self.prove_at(index, self.count)
    }

    /// Sibling path of `index` against the root the tree had after `count` insertions.
    pub fn prove_at(&self, index: u32, count: u64) -> Result<Vec<B256>, TreeError> {
        self.check_count(count)?;
        if u64::from(index) >= count {
            return Err(TreeError::IndexOutOfRange { index, count });
        }
        let proof = (0..self.depth)
            .map(|height| {
                let sibling = (u64::from(index) >> height) ^ 1;
                self.node_at(height, sibling, count)
            })
            .collect();
        Ok(proof)
    }

    /// Root of the tree as it stood after `count` insertions.
    pub fn root_at(&self, count: u64) -> Result<B256, TreeError> {
        self.check_count(count)?;
        Ok(self.node_at(self.depth, 0, count))
    }

    fn check_count(&self, count: u64) -> Result<(), TreeError> {
        if count > self.count {
            return Err(TreeError::CountOutOfRange {
                requested: count,
                current: self.count,
            });
        }
        Ok(())
    }

    /// Value of node `position` at `height` in the tree holding only the first `count` leaves.
    /// At most one child per level is partially filled, so this recurses at most `height` times.
    fn node_at(&self, height: usize, position: u64, count: u64) -> B256 {
        let first_leaf = position << height;
        let end_leaf = (position + 1) << height;
        if first_leaf >= count {
            return ZERO_HASHES[height];
        }
        if end_leaf <= count {
            return self.nodes[height][position as usize];
        }
        let left = self.node_at(height - 1, position * 2, count);
        let right = self.node_at(height - 1, position * 2 + 1, count);
        keccak256_concat(&left, &right)
    }

    /// Fold `item` up through `branch`, taking left or right at each level from the bits of `index`.
    pub fn branch_root(mut item: B256, branch: &[B256], index: u32) -> B256 {
        for (height, next) in branch.iter().enumerate() {
            item = match (u64::from(index) >> height) & 1 {
                1 => keccak256_concat(next, &item),
                _ => keccak256_concat(&item, next),
            }
        }
        item
    }

    /// Check that `leaf` sits at `index` under `expected_root`. Needs no access to a live tree.
    pub fn verify_inclusion(leaf: B256, index: u32, siblings: &[B256], expected_root: B256) -> bool {
        if siblings.len() > TREE_DEPTH {
            return false;
        }
        // an index wider than the path cannot be addressed by it
        if siblings.len() < TREE_DEPTH && (u64::from(index) >> siblings.len()) != 0 {
            return false;
        }
        Self::branch_root(leaf, siblings, index) == expected_root
    }
}
