//! Two-chain exit-root bridge engine.
//!
//! Each network runs a [`Bridge`] that commits outbound transfers into its exit tree and
//! releases inbound ones after checking their inclusion under a global exit root published by
//! the shared [`GlobalExitRootManager`].

pub mod bridge;
pub mod config;
pub mod custody;
pub mod error;
pub mod global_exit_root;
pub mod telemetry;

pub use bridge::{AssetDeposit, Bridge, BridgeNotification, ClaimRequest, MessageDeposit, TokenInfo};
pub use config::BridgeConfig;
pub use custody::{Custody, LockOrder, RecordingCustody, ReleaseOrder};
pub use error::{BridgeError, Result};
pub use global_exit_root::{GlobalExitRootManager, RedundantUpdatePolicy};
pub use telemetry::init_tracing;
