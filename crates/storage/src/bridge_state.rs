// Per-bridge state: the deposit log ("deposits", keyed by deposit index), the claim set
// ("claims", keyed by source network and leaf index) and exit tree snapshots
// ("exit_tree_snapshots", keyed by the leaf count they were taken at). A bridge restores its
// tree from the latest snapshot and replays the deposits recorded after it.

use alloy_primitives::B256;
use anyhow::Context;
use exit_tree_types::{ClaimKey, ClaimRecord, ExitTree, events::DepositEvent};
use rocksdb::{ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::{Storage, StorageError, column_family};

const CF_DEPOSITS: &str = "deposits";
const CF_CLAIMS: &str = "claims";
const CF_SNAPSHOTS: &str = "exit_tree_snapshots";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StoredDeposit {
    pub leaf_digest: B256,
    pub event: DepositEvent,
}

impl StoredDeposit {
    pub fn new(leaf_digest: B256, event: DepositEvent) -> Self {
        Self { leaf_digest, event }
    }
}

pub struct BridgeStateStore {
    db: Arc<DB>,
}

impl Storage for BridgeStateStore {
    const PATH_ENV: &'static str = "BRIDGE_STATE_STORE";

    fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = DB::open_cf_descriptors(&Self::get_opts(), path, Self::get_cfs())?;
        Ok(Self { db: Arc::new(db) })
    }

    fn get_cfs() -> Vec<ColumnFamilyDescriptor> {
        vec![
            ColumnFamilyDescriptor::new(CF_DEPOSITS, Options::default()),
            ColumnFamilyDescriptor::new(CF_CLAIMS, Options::default()),
            ColumnFamilyDescriptor::new(CF_SNAPSHOTS, Options::default()),
        ]
    }
}

fn claim_key(key: &ClaimKey) -> [u8; 8] {
    let mut buf = [0u8; 8];
    buf[..4].copy_from_slice(&key.source_network.to_be_bytes());
    buf[4..].copy_from_slice(&key.index.to_be_bytes());
    buf
}

impl BridgeStateStore {
    pub fn insert_deposit(&self, deposit: &StoredDeposit) -> Result<(), StorageError> {
        let serialized = bincode::serialize(deposit)?;
        let cf = column_family(&self.db, CF_DEPOSITS)?;
        self.db
            .put_cf(cf, deposit.event.deposit_count.to_be_bytes(), serialized)
            .context("Failed to insert deposit into database")?;
        debug!(index = deposit.event.deposit_count, "persisted deposit");
        Ok(())
    }

    pub fn remove_deposit(&self, index: u32) -> Result<(), StorageError> {
        let cf = column_family(&self.db, CF_DEPOSITS)?;
        self.db.delete_cf(cf, index.to_be_bytes())?;
        Ok(())
    }

    pub fn get_deposit(&self, index: u32) -> Result<Option<StoredDeposit>, StorageError> {
        let cf = column_family(&self.db, CF_DEPOSITS)?;
        match self.db.get_cf(cf, index.to_be_bytes())? {
            Some(data) => Ok(Some(bincode::deserialize(&data)?)),
            None => Ok(None),
        }
    }

    /// Deposits with index `start` and above, in index order.
    pub fn deposits_from(&self, start: u32) -> Result<Vec<StoredDeposit>, StorageError> {
        let cf = column_family(&self.db, CF_DEPOSITS)?;
        let start_key = start.to_be_bytes();
        let mut deposits = Vec::new();
        for item in self
            .db
            .iterator_cf(cf, IteratorMode::From(&start_key, Direction::Forward))
        {
            let (_, value) = item?;
            deposits.push(bincode::deserialize(&value)?);
        }
        Ok(deposits)
    }

    pub fn insert_claim(&self, record: &ClaimRecord) -> Result<(), StorageError> {
        let serialized = bincode::serialize(record)?;
        let cf = column_family(&self.db, CF_CLAIMS)?;
        self.db
            .put_cf(cf, claim_key(&record.key), serialized)
            .context("Failed to insert claim into database")?;
        Ok(())
    }

    pub fn remove_claim(&self, key: &ClaimKey) -> Result<(), StorageError> {
        let cf = column_family(&self.db, CF_CLAIMS)?;
        self.db.delete_cf(cf, claim_key(key))?;
        Ok(())
    }

    pub fn load_claims(&self) -> Result<Vec<ClaimRecord>, StorageError> {
        let cf = column_family(&self.db, CF_CLAIMS)?;
        let mut claims = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item?;
            claims.push(bincode::deserialize(&value)?);
        }
        Ok(claims)
    }

    pub fn insert_snapshot(&self, tree: &ExitTree) -> Result<(), StorageError> {
        // Serialize outside of the write to keep it short
        let serialized = bincode::serialize(tree).context("Failed to serialize snapshot")?;
        let cf = column_family(&self.db, CF_SNAPSHOTS)?;
        self.db
            .put_cf(cf, tree.count().to_be_bytes(), serialized)
            .context("Failed to insert snapshot into database")?;
        debug!(count = tree.count(), root = %tree.root(), "persisted exit tree snapshot");
        Ok(())
    }

    pub fn get_snapshot(&self, count: u64) -> Result<Option<ExitTree>, StorageError> {
        let cf = column_family(&self.db, CF_SNAPSHOTS)?;
        match self.db.get_cf(cf, count.to_be_bytes())? {
            Some(data) => Ok(Some(bincode::deserialize(&data)?)),
            None => Ok(None),
        }
    }

    pub fn latest_snapshot(&self) -> Result<Option<ExitTree>, StorageError> {
        let cf = column_family(&self.db, CF_SNAPSHOTS)?;
        let mut iter = self.db.iterator_cf(cf, IteratorMode::End);
        match iter.next() {
            Some(item) => {
                let (_, value) = item?;
                Ok(Some(bincode::deserialize(&value)?))
            }
            None => Ok(None),
        }
    }
}
