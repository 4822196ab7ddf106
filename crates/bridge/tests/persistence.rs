mod common;

use std::sync::Arc;

use alloy_primitives::Address;
use common::{MAINNET, ROLLUP, TOKEN, TwoChains, asset_deposit, claim_for, deposit_events};
use exit_bridge::{BridgeConfig, BridgeError, GlobalExitRootManager};
use storage::{ExitRootStorage, RocksDbExitRootStore, Storage};
use tempfile::TempDir;

fn configs(dir: &TempDir) -> (BridgeConfig, BridgeConfig) {
    let mut mainnet = BridgeConfig::for_network(MAINNET);
    mainnet.storage_path = Some(dir.path().join("mainnet"));
    mainnet.exit_root_store_path = Some(dir.path().join("global_exit_roots"));
    let mut rollup = BridgeConfig::for_network(ROLLUP);
    rollup.storage_path = Some(dir.path().join("rollup"));
    (mainnet, rollup)
}

#[test]
fn test_bridges_resume_after_restart() {
    let dir = TempDir::new().unwrap();
    let (mainnet_config, rollup_config) = configs(&dir);

    let (mainnet_root, global_exit_root, claim) = {
        let chains = TwoChains::with_configs(mainnet_config.clone(), rollup_config.clone());
        for _ in 0..4 {
            chains
                .mainnet
                .bridge_asset(asset_deposit(ROLLUP, Address::ZERO, 1, false))
                .unwrap();
        }
        chains.mainnet.checkpoint().unwrap();
        chains
            .mainnet
            .bridge_asset(asset_deposit(ROLLUP, TOKEN, 9, true))
            .unwrap();
        let event = deposit_events(&chains.mainnet).pop().unwrap();
        let claim = claim_for(&chains.mainnet, &chains.manager, &event);
        chains.rollup.claim_asset(&claim).unwrap();
        (
            chains.mainnet.deposit_root(),
            chains.manager.latest().unwrap().global_exit_root,
            claim,
        )
    };

    let chains = TwoChains::with_configs(mainnet_config, rollup_config);
    assert_eq!(chains.mainnet.deposit_count(), 5);
    assert_eq!(chains.mainnet.deposit_root(), mainnet_root);
    assert_eq!(chains.manager.len(), 1);
    assert_eq!(chains.manager.latest().unwrap().global_exit_root, global_exit_root);
    assert_eq!(chains.manager.last_mainnet_exit_root(), mainnet_root);

    // claims and the wrapped tokens they minted survive
    assert!(chains.rollup.is_claimed(MAINNET, 4));
    assert_eq!(
        chains.rollup.get_token_wrapped_address(MAINNET, TOKEN),
        Some(chains.rollup.precalculated_wrapper_address(MAINNET, TOKEN))
    );
    assert!(matches!(chains.rollup.claim_asset(&claim), Err(BridgeError::DoubleClaim { .. })));

    // proofs for deposits replayed past the snapshot still verify
    let siblings = chains.mainnet.prove_deposit(4).unwrap();
    assert_eq!(siblings, claim.siblings);
    assert_eq!(chains.mainnet.update_global_exit_root().unwrap(), None);
}

#[test]
fn test_history_is_queryable_by_remote_verifiers() {
    let dir = TempDir::new().unwrap();
    let (mainnet_config, rollup_config) = configs(&dir);
    let published = {
        let chains = TwoChains::with_configs(mainnet_config.clone(), rollup_config);
        let mut published = Vec::new();
        for _ in 0..3 {
            chains
                .mainnet
                .bridge_asset(asset_deposit(ROLLUP, Address::ZERO, 1, true))
                .unwrap();
            published.push(chains.manager.latest().unwrap());
        }
        published
    };

    let path = mainnet_config.exit_root_store_path.unwrap();
    let store = RocksDbExitRootStore::open(&path).unwrap();
    for record in &published {
        assert_eq!(store.get_by_digest(&record.global_exit_root).unwrap().as_ref(), Some(record));
        assert_eq!(store.get_record(record.sequence).unwrap().as_ref(), Some(record));
    }
    assert_eq!(store.load_history().unwrap(), published);

    let manager = GlobalExitRootManager::with_storage(Default::default(), Arc::new(store)).unwrap();
    assert_eq!(manager.len(), 3);
}

#[test]
fn test_mismatched_depth_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (mainnet_config, rollup_config) = configs(&dir);
    {
        let chains = TwoChains::with_configs(mainnet_config.clone(), rollup_config.clone());
        chains
            .mainnet
            .bridge_asset(asset_deposit(ROLLUP, Address::ZERO, 1, false))
            .unwrap();
        chains.mainnet.checkpoint().unwrap();
    }

    let manager = Arc::new(GlobalExitRootManager::new(Default::default()));
    let mut shallow = mainnet_config;
    shallow.tree_depth = 16;
    let result = exit_bridge::Bridge::new(shallow, manager, Arc::new(exit_bridge::RecordingCustody::new()));
    assert!(matches!(result, Err(BridgeError::Config(_))));
}
