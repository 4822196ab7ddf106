use alloy_primitives::B256;
use exit_tree_types::TreeError;
use storage::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Exit tree is full: capacity of {capacity} deposits reached")]
    CapacityExceeded { capacity: u64 },

    #[error("Invalid merkle proof for leaf {index}")]
    InvalidProof { index: u32 },

    #[error("Unknown global exit root {0}")]
    UnknownCheckpoint(B256),

    #[error("Leaf {index} from network {source_network} is already claimed")]
    DoubleClaim { source_network: u32, index: u32 },

    #[error("Invalid destination network {destination_network} on network {network_id}")]
    InvalidDestination { network_id: u32, destination_network: u32 },

    #[error("Zero amount transfers are rejected")]
    ZeroAmount,

    #[error("Custody rejected the operation: {0}")]
    Custody(anyhow::Error),

    /// The deposit is recorded; only the forced global exit root update failed.
    #[error("Deposit {deposit_index} recorded but the global exit root update failed: {reason}")]
    PendingGlobalExitRoot { deposit_index: u32, reason: Box<BridgeError> },

    #[error("Exit tree error: {0}")]
    Tree(TreeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<TreeError> for BridgeError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::CapacityExceeded { capacity } => Self::CapacityExceeded { capacity },
            other => Self::Tree(other),
        }
    }
}
