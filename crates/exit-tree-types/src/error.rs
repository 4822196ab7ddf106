use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Exit tree is full: capacity of {capacity} leaves reached")]
    CapacityExceeded { capacity: u64 },
    #[error("Leaf index {index} out of range for a tree of {count} leaves")]
    IndexOutOfRange { index: u32, count: u64 },
    #[error("Requested leaf count {requested} exceeds current leaf count {current}")]
    CountOutOfRange { requested: u64, current: u64 },
    #[error("Unsupported tree depth {0}, expected 1 to 32")]
    InvalidDepth(usize),
}
