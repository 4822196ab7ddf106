#![allow(dead_code)]

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256, address};
use exit_bridge::{
    AssetDeposit, Bridge, BridgeConfig, BridgeNotification, ClaimRequest, GlobalExitRootManager, RecordingCustody,
    RedundantUpdatePolicy,
};
use exit_tree_types::events::DepositEvent;

pub const MAINNET: u32 = 0;
pub const ROLLUP: u32 = 1;

pub const ALICE: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
pub const BOB: Address = address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");
pub const TOKEN: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");

/// One bridge per network sharing a global exit root manager.
pub struct TwoChains {
    pub manager: Arc<GlobalExitRootManager>,
    pub mainnet: Bridge,
    pub rollup: Bridge,
    pub mainnet_custody: Arc<RecordingCustody>,
    pub rollup_custody: Arc<RecordingCustody>,
}

impl TwoChains {
    pub fn new() -> Self {
        Self::with_configs(BridgeConfig::for_network(MAINNET), BridgeConfig::for_network(ROLLUP))
    }

    pub fn with_configs(mainnet_config: BridgeConfig, rollup_config: BridgeConfig) -> Self {
        exit_bridge::init_tracing();
        let manager = Arc::new(GlobalExitRootManager::from_config(&mainnet_config).unwrap());
        Self::with_manager(manager, mainnet_config, rollup_config)
    }

    pub fn with_manager(
        manager: Arc<GlobalExitRootManager>,
        mainnet_config: BridgeConfig,
        rollup_config: BridgeConfig,
    ) -> Self {
        let mainnet_custody = Arc::new(RecordingCustody::new());
        let rollup_custody = Arc::new(RecordingCustody::new());
        let mainnet = Bridge::new(mainnet_config, manager.clone(), mainnet_custody.clone()).unwrap();
        let rollup = Bridge::new(rollup_config, manager.clone(), rollup_custody.clone()).unwrap();
        Self {
            manager,
            mainnet,
            rollup,
            mainnet_custody,
            rollup_custody,
        }
    }
}

pub fn asset_deposit(destination_network: u32, token: Address, amount: u64, force: bool) -> AssetDeposit {
    AssetDeposit {
        destination_network,
        destination_address: BOB,
        amount: U256::from(amount),
        token,
        force_update_global_exit_root: force,
        metadata: Bytes::new(),
        sender: ALICE,
    }
}

/// Deposit events drained from `bridge`, in order.
pub fn deposit_events(bridge: &Bridge) -> Vec<DepositEvent> {
    bridge
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            BridgeNotification::Deposit(deposit) => Some(deposit),
            _ => None,
        })
        .collect()
}

/// Claim for `event` against the latest global exit root, proven on the bridge it was deposited on.
pub fn claim_for(origin: &Bridge, manager: &GlobalExitRootManager, event: &DepositEvent) -> ClaimRequest {
    let latest = manager.latest().unwrap();
    let siblings = origin.prove_deposit(event.deposit_count).unwrap();
    ClaimRequest::from_deposit(event, siblings, latest.global_exit_root)
}

pub fn policy_configs(policy: RedundantUpdatePolicy) -> (BridgeConfig, BridgeConfig) {
    let mut mainnet = BridgeConfig::for_network(MAINNET);
    mainnet.redundant_update_policy = policy;
    let mut rollup = BridgeConfig::for_network(ROLLUP);
    rollup.redundant_update_policy = policy;
    (mainnet, rollup)
}
