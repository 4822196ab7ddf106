use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_sol_types::sol;
use serde::{Deserialize, Serialize};

use crate::leaf::{Leaf, LeafType};

// ABI form of the notifications, for observers that index Ethereum-style logs
sol! {
    event BridgeEvent(
        uint8 leafType,
        uint32 originNetwork,
        address originAddress,
        uint32 destinationNetwork,
        address destinationAddress,
        uint256 amount,
        bytes metadata,
        uint32 depositCount
    );

    event ClaimEvent(
        uint32 index,
        uint32 originNetwork,
        address originAddress,
        address destinationAddress,
        uint256 amount
    );

    event NewWrappedToken(
        uint32 originNetwork,
        address originTokenAddress,
        address wrappedTokenAddress,
        bytes metadata
    );

    event UpdateGlobalExitRoot(
        bytes32 indexed mainnetExitRoot,
        bytes32 indexed rollupExitRoot
    );
}

/// Emitted once per successful deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    pub leaf_type: LeafType,
    pub origin_network: u32,
    pub origin_address: Address,
    pub destination_network: u32,
    pub destination_address: Address,
    pub amount: U256,
    pub metadata: Bytes,
    pub deposit_count: u32,
}

impl DepositEvent {
    /// The leaf this deposit committed, as a claimant rebuilds it.
    pub fn leaf(&self) -> Leaf {
        Leaf::new(
            self.leaf_type,
            self.origin_network,
            self.origin_address,
            self.destination_network,
            self.destination_address,
            self.amount,
            &self.metadata,
        )
    }
}

impl From<&DepositEvent> for BridgeEvent {
    fn from(event: &DepositEvent) -> Self {
        Self {
            leafType: event.leaf_type.into(),
            originNetwork: event.origin_network,
            originAddress: event.origin_address,
            destinationNetwork: event.destination_network,
            destinationAddress: event.destination_address,
            amount: event.amount,
            metadata: event.metadata.clone(),
            depositCount: event.deposit_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedEvent {
    pub index: u32,
    pub origin_network: u32,
    pub origin_address: Address,
    pub destination_address: Address,
    pub amount: U256,
}

impl From<&ClaimedEvent> for ClaimEvent {
    fn from(event: &ClaimedEvent) -> Self {
        Self {
            index: event.index,
            originNetwork: event.origin_network,
            originAddress: event.origin_address,
            destinationAddress: event.destination_address,
            amount: event.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedTokenEvent {
    pub origin_network: u32,
    pub origin_token_address: Address,
    pub wrapped_token_address: Address,
    pub metadata: Bytes,
}

impl From<&WrappedTokenEvent> for NewWrappedToken {
    fn from(event: &WrappedTokenEvent) -> Self {
        Self {
            originNetwork: event.origin_network,
            originTokenAddress: event.origin_token_address,
            wrappedTokenAddress: event.wrapped_token_address,
            metadata: event.metadata.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalExitRootEvent {
    pub mainnet_exit_root: B256,
    pub rollup_exit_root: B256,
    pub global_exit_root: B256,
}

impl From<&GlobalExitRootEvent> for UpdateGlobalExitRoot {
    fn from(event: &GlobalExitRootEvent) -> Self {
        Self {
            mainnetExitRoot: event.mainnet_exit_root,
            rollupExitRoot: event.rollup_exit_root,
        }
    }
}
