//! RocksDB persistence for the bridge: the published global exit root history and each
//! bridge's own deposit log, claim set and exit tree snapshots.

use std::env;
use std::path::Path;

use anyhow::anyhow;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options};

pub mod bridge_state;
pub mod error;
pub mod exit_roots;

pub use bridge_state::{BridgeStateStore, StoredDeposit};
pub use error::StorageError;
pub use exit_roots::{ExitRootStorage, RocksDbExitRootStore};

// every storage module should implement this trait
pub trait Storage: Sized {
    /// Environment variable holding the database path used by `from_env`.
    const PATH_ENV: &'static str;

    fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError>;

    fn get_cfs() -> Vec<ColumnFamilyDescriptor>;

    fn get_opts() -> Options {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts
    }

    fn from_env() -> Result<Self, StorageError> {
        dotenvy::dotenv().ok();
        let path = env::var(Self::PATH_ENV).map_err(|_| StorageError::MissingEnv(Self::PATH_ENV))?;
        Self::open(path)
    }
}

pub(crate) fn column_family<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily, StorageError> {
    db.cf_handle(name)
        .ok_or_else(|| anyhow!("Column family {name} not found").into())
}
