//! Commitment primitives for the two-chain exit-root bridge: Keccak hashing, the canonical
//! leaf encoding, the incremental exit tree and the global exit root record.

pub mod claim;
pub mod error;
pub mod events;
pub mod global;
pub mod hash;
pub mod leaf;
pub mod tree;

pub use claim::{ClaimKey, ClaimRecord};
pub use error::TreeError;
pub use global::{ExitRootSource, GlobalExitRootRecord, MAINNET_NETWORK_ID, calculate_global_exit_root};
pub use leaf::{Leaf, LeafType};
pub use tree::{ExitTree, TREE_DEPTH};
