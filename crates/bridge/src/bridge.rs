//! Deposit and claim intake for one network's side of the bridge.
//!
//! Deposits are serialized behind the exit state's write lock: the leaf is persisted, custody
//! debits the sender and only then is the leaf inserted, so a refusal at any step leaves the
//! tree untouched. Claims are checked against the counterpart network's exit root as recorded
//! in a published global exit root, and a leaf is released at most once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use alloy_primitives::{Address, B256, Bytes, U256, keccak256};
use exit_tree_types::events::{ClaimedEvent, DepositEvent, WrappedTokenEvent};
use exit_tree_types::{ClaimKey, ClaimRecord, ExitTree, Leaf, LeafType, MAINNET_NETWORK_ID};
use serde::{Deserialize, Serialize};
use storage::{BridgeStateStore, Storage, StoredDeposit};
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::custody::{Custody, LockOrder, ReleaseOrder};
use crate::error::{BridgeError, Result};
use crate::global_exit_root::GlobalExitRootManager;

/// Request to move an asset to the other network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDeposit {
    pub destination_network: u32,
    pub destination_address: Address,
    pub amount: U256,
    /// Token being bridged; the zero address is the native gas asset.
    pub token: Address,
    pub force_update_global_exit_root: bool,
    pub metadata: Bytes,
    pub sender: Address,
}

/// Request to send a message, optionally carrying native value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDeposit {
    pub destination_network: u32,
    pub destination_address: Address,
    pub force_update_global_exit_root: bool,
    pub metadata: Bytes,
    pub value: U256,
    pub sender: Address,
}

/// A leaf's original fields together with its position, sibling path and the global exit
/// root the path is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    pub siblings: Vec<B256>,
    pub index: u32,
    pub global_exit_root: B256,
    pub origin_network: u32,
    pub origin_address: Address,
    pub destination_network: u32,
    pub destination_address: Address,
    pub amount: U256,
    pub metadata: Bytes,
}

impl ClaimRequest {
    /// Claim of the leaf a deposit event announced.
    pub fn from_deposit(event: &DepositEvent, siblings: Vec<B256>, global_exit_root: B256) -> Self {
        Self {
            siblings,
            index: event.deposit_count,
            global_exit_root,
            origin_network: event.origin_network,
            origin_address: event.origin_address,
            destination_network: event.destination_network,
            destination_address: event.destination_address,
            amount: event.amount,
            metadata: event.metadata.clone(),
        }
    }

    pub fn leaf(&self, leaf_type: LeafType) -> Leaf {
        Leaf::new(
            leaf_type,
            self.origin_network,
            self.origin_address,
            self.destination_network,
            self.destination_address,
            self.amount,
            &self.metadata,
        )
    }
}

/// Where a wrapped token's underlying asset lives.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenInfo {
    pub origin_network: u32,
    pub origin_token: Address,
}

#[derive(Debug, Default)]
struct TokenRegistry {
    wrapped_to_origin: HashMap<Address, TokenInfo>,
    origin_to_wrapped: HashMap<TokenInfo, Address>,
}

impl TokenRegistry {
    fn register(&mut self, info: TokenInfo, wrapped_token: Address) {
        self.wrapped_to_origin.insert(wrapped_token, info);
        self.origin_to_wrapped.insert(info, wrapped_token);
    }
}

/// Notifications for off-chain observers, drained with [`Bridge::drain_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeNotification {
    Deposit(DepositEvent),
    Claim(ClaimedEvent),
    NewWrappedToken(WrappedTokenEvent),
}

#[derive(Debug)]
struct ExitState {
    tree: ExitTree,
    /// Deposit count at the last exit root pushed to the global exit root manager.
    last_updated_count: u64,
}

pub struct Bridge {
    config: BridgeConfig,
    exit: RwLock<ExitState>,
    claims: RwLock<HashMap<ClaimKey, ClaimRecord>>,
    tokens: RwLock<TokenRegistry>,
    manager: Arc<GlobalExitRootManager>,
    custody: Arc<dyn Custody>,
    store: Option<Arc<BridgeStateStore>>,
    events: Mutex<Vec<BridgeNotification>>,
}

impl Bridge {
    /// Opens the state store at `config.storage_path` when one is configured.
    pub fn new(config: BridgeConfig, manager: Arc<GlobalExitRootManager>, custody: Arc<dyn Custody>) -> Result<Self> {
        let store = match &config.storage_path {
            Some(path) => Some(Arc::new(BridgeStateStore::open(path)?)),
            None => None,
        };
        Self::build(config, manager, custody, store)
    }

    pub fn with_store(
        config: BridgeConfig,
        manager: Arc<GlobalExitRootManager>,
        custody: Arc<dyn Custody>,
        store: Arc<BridgeStateStore>,
    ) -> Result<Self> {
        Self::build(config, manager, custody, Some(store))
    }

    fn build(
        config: BridgeConfig,
        manager: Arc<GlobalExitRootManager>,
        custody: Arc<dyn Custody>,
        store: Option<Arc<BridgeStateStore>>,
    ) -> Result<Self> {
        let mut tree = ExitTree::with_depth(config.tree_depth)?;
        let mut claims = HashMap::new();
        let mut tokens = TokenRegistry::default();

        if let Some(store) = &store {
            if let Some(snapshot) = store.latest_snapshot()? {
                if snapshot.depth() != config.tree_depth {
                    return Err(BridgeError::Config(format!(
                        "stored exit tree has depth {}, configured depth is {}",
                        snapshot.depth(),
                        config.tree_depth
                    )));
                }
                tree = snapshot;
            }
            let start = u32::try_from(tree.count())
                .map_err(|_| BridgeError::Config("exit tree snapshot is past the last deposit index".to_string()))?;
            for deposit in store.deposits_from(start)? {
                if u64::from(deposit.event.deposit_count) != tree.count() {
                    return Err(BridgeError::Config(format!(
                        "deposit log has a gap: expected index {}, found {}",
                        tree.count(),
                        deposit.event.deposit_count
                    )));
                }
                tree.insert(deposit.leaf_digest)?;
            }
            for record in store.load_claims()? {
                if let Some(info) = wrapped_origin(&config, record.leaf_type, record.origin_network, record.origin_address) {
                    tokens.register(info, precalculated_wrapper_address(&config, info));
                }
                claims.insert(record.key, record);
            }
            info!(
                network_id = config.network_id,
                deposits = tree.count(),
                claims = claims.len(),
                root = %tree.root(),
                "restored bridge state"
            );
        }

        let last_updated_count = if manager.last_exit_root(config.exit_root_source()) == tree.root() {
            tree.count()
        } else {
            0
        };

        Ok(Self {
            config,
            exit: RwLock::new(ExitState {
                tree,
                last_updated_count,
            }),
            claims: RwLock::new(claims),
            tokens: RwLock::new(tokens),
            manager,
            custody,
            store,
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn network_id(&self) -> u32 {
        self.config.network_id
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn manager(&self) -> &Arc<GlobalExitRootManager> {
        &self.manager
    }

    /// Commit an asset transfer and return its deposit index.
    pub fn bridge_asset(&self, deposit: AssetDeposit) -> Result<u32> {
        self.check_outbound(deposit.destination_network, deposit.amount)?;

        let (origin_network, origin_address, lock) = self.resolve_origin(&deposit);
        let event = DepositEvent {
            leaf_type: LeafType::Asset,
            origin_network,
            origin_address,
            destination_network: deposit.destination_network,
            destination_address: deposit.destination_address,
            amount: deposit.amount,
            metadata: deposit.metadata,
            deposit_count: 0,
        };
        self.commit_deposit(event, lock, deposit.force_update_global_exit_root)
    }

    /// Commit a message transfer and return its deposit index.
    pub fn bridge_message(&self, deposit: MessageDeposit) -> Result<u32> {
        self.check_destination(deposit.destination_network)?;

        let lock = LockOrder::Native {
            sender: deposit.sender,
            amount: deposit.value,
        };
        let event = DepositEvent {
            leaf_type: LeafType::Message,
            origin_network: self.config.network_id,
            origin_address: deposit.sender,
            destination_network: deposit.destination_network,
            destination_address: deposit.destination_address,
            amount: deposit.value,
            metadata: deposit.metadata,
            deposit_count: 0,
        };
        self.commit_deposit(event, lock, deposit.force_update_global_exit_root)
    }

    fn check_destination(&self, destination_network: u32) -> Result<()> {
        if destination_network == self.config.network_id {
            return Err(BridgeError::InvalidDestination {
                network_id: self.config.network_id,
                destination_network,
            });
        }
        Ok(())
    }

    fn check_outbound(&self, destination_network: u32, amount: U256) -> Result<()> {
        self.check_destination(destination_network)?;
        if self.config.reject_zero_amount && amount.is_zero() {
            return Err(BridgeError::ZeroAmount);
        }
        Ok(())
    }

    fn resolve_origin(&self, deposit: &AssetDeposit) -> (u32, Address, LockOrder) {
        if deposit.token == Address::ZERO {
            let lock = LockOrder::Native {
                sender: deposit.sender,
                amount: deposit.amount,
            };
            return (MAINNET_NETWORK_ID, Address::ZERO, lock);
        }

        let wrapped = self.tokens.read().unwrap().wrapped_to_origin.get(&deposit.token).copied();
        match wrapped {
            Some(info) => {
                let lock = LockOrder::Wrapped {
                    wrapped_token: deposit.token,
                    sender: deposit.sender,
                    amount: deposit.amount,
                };
                (info.origin_network, info.origin_token, lock)
            }
            None => {
                let lock = LockOrder::Token {
                    token: deposit.token,
                    sender: deposit.sender,
                    amount: deposit.amount,
                };
                (self.config.network_id, deposit.token, lock)
            }
        }
    }

    fn commit_deposit(&self, mut event: DepositEvent, lock: LockOrder, force_update: bool) -> Result<u32> {
        let digest = event.leaf().digest();
        let mut exit = self.exit.write().unwrap();

        if exit.tree.count() >= exit.tree.capacity() {
            return Err(BridgeError::CapacityExceeded {
                capacity: exit.tree.capacity(),
            });
        }
        event.deposit_count = exit.tree.count() as u32;

        if let Some(store) = &self.store {
            store.insert_deposit(&StoredDeposit::new(digest, event.clone()))?;
        }
        if let Err(err) = self.custody.lock(&lock) {
            warn!(index = event.deposit_count, error = %err, "custody refused deposit");
            self.forget_deposit(event.deposit_count);
            return Err(BridgeError::Custody(err));
        }

        let (index, root) = exit.tree.insert(digest)?;
        info!(
            index,
            leaf_type = ?event.leaf_type,
            origin_network = event.origin_network,
            destination_network = event.destination_network,
            amount = %event.amount,
            %root,
            "deposit committed"
        );
        self.events.lock().unwrap().push(BridgeNotification::Deposit(event));

        if force_update {
            // the deposit stands even if publishing its root fails
            self.push_exit_root(&mut exit)
                .map_err(|err| BridgeError::PendingGlobalExitRoot {
                    deposit_index: index,
                    reason: Box::new(err),
                })?;
        }
        Ok(index)
    }

    fn forget_deposit(&self, index: u32) {
        if let Some(store) = &self.store {
            if let Err(err) = store.remove_deposit(index) {
                warn!(index, error = %err, "failed to remove rejected deposit from the log");
            }
        }
    }

    fn push_exit_root(&self, exit: &mut ExitState) -> Result<B256> {
        let root = exit.tree.root();
        let global_exit_root = self.manager.update_exit_root(self.config.exit_root_source(), root)?;
        exit.last_updated_count = exit.tree.count();
        Ok(global_exit_root)
    }

    /// Publish the current exit root if deposits were made since it was last published.
    pub fn update_global_exit_root(&self) -> Result<Option<B256>> {
        let mut exit = self.exit.write().unwrap();
        if exit.tree.count() == exit.last_updated_count {
            debug!(count = exit.tree.count(), "exit root already published");
            return Ok(None);
        }
        self.push_exit_root(&mut exit).map(Some)
    }

    /// Write an exit tree snapshot so a restart replays only later deposits.
    pub fn checkpoint(&self) -> Result<()> {
        if let Some(store) = &self.store {
            let exit = self.exit.read().unwrap();
            store.insert_snapshot(&exit.tree)?;
        }
        Ok(())
    }

    pub fn claim_asset(&self, claim: &ClaimRequest) -> Result<()> {
        self.process_claim(LeafType::Asset, claim)
    }

    pub fn claim_message(&self, claim: &ClaimRequest) -> Result<()> {
        self.process_claim(LeafType::Message, claim)
    }

    fn process_claim(&self, leaf_type: LeafType, claim: &ClaimRequest) -> Result<()> {
        if claim.destination_network != self.config.network_id {
            return Err(BridgeError::InvalidDestination {
                network_id: self.config.network_id,
                destination_network: claim.destination_network,
            });
        }
        if claim.siblings.len() != self.config.tree_depth {
            warn!(index = claim.index, siblings = claim.siblings.len(), "claim has a malformed sibling path");
            return Err(BridgeError::InvalidProof { index: claim.index });
        }

        let (source_network, source) = self.config.claim_source();
        let checkpoint = self
            .manager
            .get(&claim.global_exit_root)
            .ok_or(BridgeError::UnknownCheckpoint(claim.global_exit_root))?;
        let leaf = claim.leaf(leaf_type);
        if !ExitTree::verify_inclusion(leaf.digest(), claim.index, &claim.siblings, checkpoint.exit_root(source)) {
            warn!(index = claim.index, global_exit_root = %claim.global_exit_root, "claim proof rejected");
            return Err(BridgeError::InvalidProof { index: claim.index });
        }

        let key = ClaimKey {
            source_network,
            index: claim.index,
        };
        let mut claims = self.claims.write().unwrap();
        if claims.contains_key(&key) {
            return Err(BridgeError::DoubleClaim {
                source_network,
                index: claim.index,
            });
        }

        let (order, new_token) = self.release_order(leaf_type, claim);
        let record = ClaimRecord::new(key, &leaf);
        if let Some(store) = &self.store {
            store.insert_claim(&record)?;
        }
        if let Err(err) = self.custody.release(&order) {
            warn!(index = claim.index, error = %err, "custody refused release");
            if let Some(store) = &self.store {
                if let Err(err) = store.remove_claim(&key) {
                    warn!(index = claim.index, error = %err, "failed to remove rejected claim from the store");
                }
            }
            return Err(BridgeError::Custody(err));
        }
        claims.insert(key, record);

        let mut events = self.events.lock().unwrap();
        if let Some(token) = new_token {
            let info = TokenInfo {
                origin_network: token.origin_network,
                origin_token: token.origin_token_address,
            };
            self.tokens.write().unwrap().register(info, token.wrapped_token_address);
            info!(
                origin_network = token.origin_network,
                origin_token = %token.origin_token_address,
                wrapped_token = %token.wrapped_token_address,
                "new wrapped token"
            );
            events.push(BridgeNotification::NewWrappedToken(token));
        }
        events.push(BridgeNotification::Claim(ClaimedEvent {
            index: claim.index,
            origin_network: claim.origin_network,
            origin_address: claim.origin_address,
            destination_address: claim.destination_address,
            amount: claim.amount,
        }));
        info!(
            source_network,
            index = claim.index,
            leaf_type = ?leaf_type,
            amount = %claim.amount,
            "claim released"
        );
        Ok(())
    }

    fn release_order(&self, leaf_type: LeafType, claim: &ClaimRequest) -> (ReleaseOrder, Option<WrappedTokenEvent>) {
        if leaf_type == LeafType::Message {
            let order = ReleaseOrder::Message {
                origin_network: claim.origin_network,
                origin_address: claim.origin_address,
                destination: claim.destination_address,
                amount: claim.amount,
                metadata: claim.metadata.clone(),
            };
            return (order, None);
        }

        let Some(info) = wrapped_origin(&self.config, leaf_type, claim.origin_network, claim.origin_address) else {
            let order = if claim.origin_address == Address::ZERO {
                ReleaseOrder::Native {
                    destination: claim.destination_address,
                    amount: claim.amount,
                }
            } else {
                ReleaseOrder::Token {
                    token: claim.origin_address,
                    destination: claim.destination_address,
                    amount: claim.amount,
                }
            };
            return (order, None);
        };

        let registered = self.tokens.read().unwrap().origin_to_wrapped.get(&info).copied();
        let wrapped_token = registered.unwrap_or_else(|| precalculated_wrapper_address(&self.config, info));
        let new_token = registered.is_none().then(|| WrappedTokenEvent {
            origin_network: info.origin_network,
            origin_token_address: info.origin_token,
            wrapped_token_address: wrapped_token,
            metadata: claim.metadata.clone(),
        });
        let order = ReleaseOrder::Wrapped {
            wrapped_token,
            origin_network: info.origin_network,
            origin_token: info.origin_token,
            destination: claim.destination_address,
            amount: claim.amount,
            metadata: claim.metadata.clone(),
        };
        (order, new_token)
    }

    pub fn deposit_count(&self) -> u64 {
        self.exit.read().unwrap().tree.count()
    }

    pub fn deposit_root(&self) -> B256 {
        self.exit.read().unwrap().tree.root()
    }

    /// Exit root as it stood after `deposit_count` deposits.
    pub fn root_at(&self, deposit_count: u64) -> Result<B256> {
        Ok(self.exit.read().unwrap().tree.root_at(deposit_count)?)
    }

    /// Sibling path of deposit `index` against the current exit root.
    pub fn prove_deposit(&self, index: u32) -> Result<Vec<B256>> {
        Ok(self.exit.read().unwrap().tree.prove(index)?)
    }

    /// Sibling path of deposit `index` against the exit root after `deposit_count` deposits.
    pub fn prove_deposit_at(&self, index: u32, deposit_count: u64) -> Result<Vec<B256>> {
        Ok(self.exit.read().unwrap().tree.prove_at(index, deposit_count)?)
    }

    pub fn is_claimed(&self, source_network: u32, index: u32) -> bool {
        self.claims
            .read()
            .unwrap()
            .contains_key(&ClaimKey { source_network, index })
    }

    pub fn claim_record(&self, source_network: u32, index: u32) -> Option<ClaimRecord> {
        self.claims
            .read()
            .unwrap()
            .get(&ClaimKey { source_network, index })
            .cloned()
    }

    /// Wrapped token minted by this bridge for `origin_token`, if any was minted yet.
    pub fn get_token_wrapped_address(&self, origin_network: u32, origin_token: Address) -> Option<Address> {
        let info = TokenInfo {
            origin_network,
            origin_token,
        };
        self.tokens.read().unwrap().origin_to_wrapped.get(&info).copied()
    }

    pub fn token_info(&self, wrapped_token: Address) -> Option<TokenInfo> {
        self.tokens.read().unwrap().wrapped_to_origin.get(&wrapped_token).copied()
    }

    /// Address the wrapped representation of `origin_token` has or will have on this network.
    pub fn precalculated_wrapper_address(&self, origin_network: u32, origin_token: Address) -> Address {
        precalculated_wrapper_address(
            &self.config,
            TokenInfo {
                origin_network,
                origin_token,
            },
        )
    }

    /// Take the notifications accumulated since the last call.
    pub fn drain_events(&self) -> Vec<BridgeNotification> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

/// The origin of an asset leaf that is released by minting a wrapped token on this network.
fn wrapped_origin(config: &BridgeConfig, leaf_type: LeafType, origin_network: u32, origin_token: Address) -> Option<TokenInfo> {
    if leaf_type != LeafType::Asset || origin_token == Address::ZERO || origin_network == config.network_id {
        return None;
    }
    Some(TokenInfo {
        origin_network,
        origin_token,
    })
}

fn precalculated_wrapper_address(config: &BridgeConfig, info: TokenInfo) -> Address {
    let mut salt_input = [0u8; 24];
    salt_input[..4].copy_from_slice(&info.origin_network.to_be_bytes());
    salt_input[4..].copy_from_slice(info.origin_token.as_slice());
    let salt = keccak256(salt_input);
    config.bridge_address.create2(salt.0, config.wrapper_init_code_hash.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custody::RecordingCustody;
    use crate::global_exit_root::RedundantUpdatePolicy;
    use alloy_primitives::address;
    use tempfile::TempDir;

    const USER: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
    const TOKEN: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");

    fn setup(network_id: u32) -> (Bridge, Arc<RecordingCustody>) {
        let manager = Arc::new(GlobalExitRootManager::new(RedundantUpdatePolicy::Skip));
        let custody = Arc::new(RecordingCustody::new());
        let bridge = Bridge::new(BridgeConfig::for_network(network_id), manager, custody.clone()).unwrap();
        (bridge, custody)
    }

    fn native_deposit(amount: u64, force: bool) -> AssetDeposit {
        AssetDeposit {
            destination_network: 1,
            destination_address: USER,
            amount: U256::from(amount),
            token: Address::ZERO,
            force_update_global_exit_root: force,
            metadata: Bytes::new(),
            sender: USER,
        }
    }

    #[test]
    fn test_native_deposit_leaf() {
        let (bridge, custody) = setup(0);
        let index = bridge.bridge_asset(native_deposit(10_000_000_000_000_000, false)).unwrap();
        assert_eq!(index, 0);
        assert_eq!(bridge.deposit_count(), 1);
        // same leaf as the reference vector for a 0.01 ether deposit to USER on network 1
        assert_eq!(
            bridge.deposit_root(),
            alloy_primitives::b256!("4d8fc15b03f2367a48387aac2a824f4fb3e88c383c4c330ebeba571674f12660")
        );
        assert_eq!(
            custody.locks(),
            vec![LockOrder::Native {
                sender: USER,
                amount: U256::from(10_000_000_000_000_000u64)
            }]
        );
        match bridge.drain_events().as_slice() {
            [BridgeNotification::Deposit(event)] => {
                assert_eq!(event.origin_network, MAINNET_NETWORK_ID);
                assert_eq!(event.origin_address, Address::ZERO);
                assert_eq!(event.deposit_count, 0);
            }
            other => panic!("unexpected events: {other:?}"),
        }
        assert!(bridge.manager().is_empty());
    }

    #[test]
    fn test_self_bridging_rejected() {
        let (bridge, custody) = setup(0);
        let mut deposit = native_deposit(1, true);
        deposit.destination_network = 0;
        assert!(matches!(
            bridge.bridge_asset(deposit),
            Err(BridgeError::InvalidDestination {
                network_id: 0,
                destination_network: 0
            })
        ));
        assert_eq!(bridge.deposit_count(), 0);
        assert!(custody.locks().is_empty());
        assert!(bridge.manager().is_empty());
    }

    #[test]
    fn test_zero_amount_policy() {
        let (bridge, _) = setup(0);
        bridge.bridge_asset(native_deposit(0, false)).unwrap();

        let manager = Arc::new(GlobalExitRootManager::new(RedundantUpdatePolicy::Skip));
        let mut config = BridgeConfig::for_network(0);
        config.reject_zero_amount = true;
        let strict = Bridge::new(config, manager, Arc::new(RecordingCustody::new())).unwrap();
        assert!(matches!(strict.bridge_asset(native_deposit(0, false)), Err(BridgeError::ZeroAmount)));
        assert_eq!(strict.deposit_count(), 0);
    }

    #[test]
    fn test_custody_refusal_leaves_state_unchanged() {
        let (bridge, custody) = setup(0);
        bridge.bridge_asset(native_deposit(1, false)).unwrap();
        let root = bridge.deposit_root();
        bridge.drain_events();

        custody.set_refuse(true);
        assert!(matches!(bridge.bridge_asset(native_deposit(2, true)), Err(BridgeError::Custody(_))));
        assert_eq!(bridge.deposit_count(), 1);
        assert_eq!(bridge.deposit_root(), root);
        assert!(bridge.drain_events().is_empty());
        assert!(bridge.manager().is_empty());
    }

    #[test]
    fn test_capacity_exceeded() {
        let manager = Arc::new(GlobalExitRootManager::new(RedundantUpdatePolicy::Skip));
        let mut config = BridgeConfig::for_network(0);
        config.tree_depth = 2;
        let bridge = Bridge::new(config, manager, Arc::new(RecordingCustody::new())).unwrap();
        for _ in 0..4 {
            bridge.bridge_asset(native_deposit(1, false)).unwrap();
        }
        let root = bridge.deposit_root();
        assert!(matches!(
            bridge.bridge_asset(native_deposit(1, false)),
            Err(BridgeError::CapacityExceeded { capacity: 4 })
        ));
        assert_eq!(bridge.deposit_root(), root);
    }

    #[test]
    fn test_deferred_update() {
        let (bridge, _) = setup(0);
        assert_eq!(bridge.update_global_exit_root().unwrap(), None);
        for _ in 0..3 {
            bridge.bridge_asset(native_deposit(1, false)).unwrap();
        }
        assert!(bridge.manager().is_empty());

        let global_exit_root = bridge.update_global_exit_root().unwrap().unwrap();
        let latest = bridge.manager().latest().unwrap();
        assert_eq!(latest.global_exit_root, global_exit_root);
        assert_eq!(latest.mainnet_exit_root, bridge.deposit_root());
        assert_eq!(latest.rollup_exit_root, B256::ZERO);
        assert_eq!(bridge.update_global_exit_root().unwrap(), None);
    }

    #[test]
    fn test_token_deposit_origin() {
        let (bridge, custody) = setup(1);
        let deposit = AssetDeposit {
            destination_network: 0,
            token: TOKEN,
            ..native_deposit(5, false)
        };
        bridge.bridge_asset(deposit).unwrap();
        match bridge.drain_events().as_slice() {
            [BridgeNotification::Deposit(event)] => {
                assert_eq!(event.origin_network, 1);
                assert_eq!(event.origin_address, TOKEN);
            }
            other => panic!("unexpected events: {other:?}"),
        }
        assert!(matches!(custody.locks()[0], LockOrder::Token { token, .. } if token == TOKEN));
    }

    #[test]
    fn test_message_deposit() {
        let (bridge, custody) = setup(0);
        let index = bridge
            .bridge_message(MessageDeposit {
                destination_network: 1,
                destination_address: TOKEN,
                force_update_global_exit_root: true,
                metadata: Bytes::from_static(b"ping"),
                value: U256::from(3),
                sender: USER,
            })
            .unwrap();
        assert_eq!(index, 0);
        assert_eq!(bridge.manager().len(), 1);
        assert!(matches!(custody.locks()[0], LockOrder::Native { .. }));
        match bridge.drain_events().as_slice() {
            [BridgeNotification::Deposit(event)] => {
                assert_eq!(event.leaf_type, LeafType::Message);
                assert_eq!(event.origin_address, USER);
                assert_eq!(event.amount, U256::from(3));
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn test_precalculated_wrapper_address() {
        let manager = Arc::new(GlobalExitRootManager::new(RedundantUpdatePolicy::Skip));
        let mut config = BridgeConfig::for_network(1);
        config.bridge_address = address!("e7f1725e7734ce288f8367e1bb143e90bb3f0512");
        config.wrapper_init_code_hash = B256::repeat_byte(0x11);
        let bridge = Bridge::new(config.clone(), manager, Arc::new(RecordingCustody::new())).unwrap();

        let mut salt_input = Vec::new();
        salt_input.extend_from_slice(&0u32.to_be_bytes());
        salt_input.extend_from_slice(TOKEN.as_slice());
        let expected = config
            .bridge_address
            .create2(keccak256(&salt_input).0, config.wrapper_init_code_hash.0);
        assert_eq!(bridge.precalculated_wrapper_address(0, TOKEN), expected);
        assert_ne!(bridge.precalculated_wrapper_address(2, TOKEN), expected);
        assert_eq!(bridge.get_token_wrapped_address(0, TOKEN), None);
    }

    #[test]
    fn test_restore_from_store() {
        let temp_dir = TempDir::new().unwrap();
        let manager = Arc::new(GlobalExitRootManager::new(RedundantUpdatePolicy::Skip));
        let custody = Arc::new(RecordingCustody::new());
        let root = {
            let store = Arc::new(BridgeStateStore::open(temp_dir.path()).unwrap());
            let bridge = Bridge::with_store(BridgeConfig::for_network(0), manager.clone(), custody.clone(), store).unwrap();
            for _ in 0..3 {
                bridge.bridge_asset(native_deposit(1, false)).unwrap();
            }
            bridge.checkpoint().unwrap();
            bridge.bridge_asset(native_deposit(2, true)).unwrap();
            bridge.deposit_root()
        };

        let store = Arc::new(BridgeStateStore::open(temp_dir.path()).unwrap());
        let bridge = Bridge::with_store(BridgeConfig::for_network(0), manager, custody, store).unwrap();
        assert_eq!(bridge.deposit_count(), 4);
        assert_eq!(bridge.deposit_root(), root);
        // the last root was already published before the restart
        assert_eq!(bridge.update_global_exit_root().unwrap(), None);
    }
}
