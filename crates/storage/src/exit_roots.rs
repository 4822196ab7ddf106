// The published global exit root history. Records live in "global_exit_roots" keyed by
// their sequence number; "global_exit_roots_by_digest" maps a root to the first sequence
// that published it, so remote verifiers can look a checkpoint up by reference.

use alloy_primitives::B256;
use anyhow::Context;
use exit_tree_types::GlobalExitRootRecord;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::{Storage, StorageError, column_family};

const CF_GLOBAL_EXIT_ROOTS: &str = "global_exit_roots";
const CF_GLOBAL_EXIT_ROOTS_BY_DIGEST: &str = "global_exit_roots_by_digest";

pub trait ExitRootStorage: Send + Sync {
    fn append_record(&self, record: &GlobalExitRootRecord) -> Result<(), StorageError>;

    fn get_record(&self, sequence: u64) -> Result<Option<GlobalExitRootRecord>, StorageError>;

    fn get_by_digest(&self, global_exit_root: &B256) -> Result<Option<GlobalExitRootRecord>, StorageError>;

    /// Every record in sequence order.
    fn load_history(&self) -> Result<Vec<GlobalExitRootRecord>, StorageError>;
}

pub struct RocksDbExitRootStore {
    db: Arc<DB>,
}

impl Storage for RocksDbExitRootStore {
    const PATH_ENV: &'static str = "GLOBAL_EXIT_ROOT_STORE";

    fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = DB::open_cf_descriptors(&Self::get_opts(), path, Self::get_cfs())?;
        Ok(Self { db: Arc::new(db) })
    }

    fn get_cfs() -> Vec<ColumnFamilyDescriptor> {
        vec![
            ColumnFamilyDescriptor::new(CF_GLOBAL_EXIT_ROOTS, Options::default()),
            ColumnFamilyDescriptor::new(CF_GLOBAL_EXIT_ROOTS_BY_DIGEST, Options::default()),
        ]
    }
}

impl RocksDbExitRootStore {
    /// Number of records written so far.
    pub fn len(&self) -> Result<u64, StorageError> {
        let cf = column_family(&self.db, CF_GLOBAL_EXIT_ROOTS)?;
        let mut iter = self.db.iterator_cf(cf, IteratorMode::End);
        match iter.next() {
            Some(item) => {
                let (key, _) = item?;
                Ok(decode_sequence(&key)? + 1)
            }
            None => Ok(0),
        }
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

fn decode_sequence(bytes: &[u8]) -> Result<u64, StorageError> {
    let buf: [u8; 8] = bytes.try_into().context("Malformed sequence key")?;
    Ok(u64::from_be_bytes(buf))
}

impl ExitRootStorage for RocksDbExitRootStore {
    fn append_record(&self, record: &GlobalExitRootRecord) -> Result<(), StorageError> {
        // Serialize before touching the database
        let serialized = bincode::serialize(record)?;

        let records = column_family(&self.db, CF_GLOBAL_EXIT_ROOTS)?;
        let by_digest = column_family(&self.db, CF_GLOBAL_EXIT_ROOTS_BY_DIGEST)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(records, record.sequence.to_be_bytes(), serialized);
        if self.db.get_cf(by_digest, record.global_exit_root.as_slice())?.is_none() {
            batch.put_cf(
                by_digest,
                record.global_exit_root.as_slice(),
                record.sequence.to_be_bytes(),
            );
        }
        self.db.write(batch)?;
        debug!(sequence = record.sequence, root = %record.global_exit_root, "persisted global exit root");
        Ok(())
    }

    fn get_record(&self, sequence: u64) -> Result<Option<GlobalExitRootRecord>, StorageError> {
        let cf = column_family(&self.db, CF_GLOBAL_EXIT_ROOTS)?;
        match self.db.get_cf(cf, sequence.to_be_bytes())? {
            Some(data) => Ok(Some(bincode::deserialize(&data)?)),
            None => Ok(None),
        }
    }

    fn get_by_digest(&self, global_exit_root: &B256) -> Result<Option<GlobalExitRootRecord>, StorageError> {
        let cf = column_family(&self.db, CF_GLOBAL_EXIT_ROOTS_BY_DIGEST)?;
        match self.db.get_cf(cf, global_exit_root.as_slice())? {
            Some(sequence) => self.get_record(decode_sequence(&sequence)?),
            None => Ok(None),
        }
    }

    fn load_history(&self) -> Result<Vec<GlobalExitRootRecord>, StorageError> {
        let cf = column_family(&self.db, CF_GLOBAL_EXIT_ROOTS)?;
        let mut history = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item?;
            history.push(bincode::deserialize(&value)?);
        }
        Ok(history)
    }
}
