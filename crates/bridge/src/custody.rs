//! The token custody collaborator. The bridge decides what moves; custody moves it.

use std::sync::Mutex;

use alloy_primitives::{Address, Bytes, U256};

/// Debit taken from the sender before a deposit is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOrder {
    /// Native gas asset attached to the call.
    Native { sender: Address, amount: U256 },
    /// A token native to this network, held by the bridge until claimed back.
    Token { token: Address, sender: Address, amount: U256 },
    /// A wrapped representation minted by this bridge, burnt on the way out.
    Wrapped { wrapped_token: Address, sender: Address, amount: U256 },
}

/// Credit issued once a claim has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOrder {
    Native {
        destination: Address,
        amount: U256,
    },
    Token {
        token: Address,
        destination: Address,
        amount: U256,
    },
    /// Mint of a foreign token's wrapped representation, deploying it first if needed.
    Wrapped {
        wrapped_token: Address,
        origin_network: u32,
        origin_token: Address,
        destination: Address,
        amount: U256,
        metadata: Bytes,
    },
    /// Delivery of a bridged message payload along with its attached value.
    Message {
        origin_network: u32,
        origin_address: Address,
        destination: Address,
        amount: U256,
        metadata: Bytes,
    },
}

impl ReleaseOrder {
    pub fn amount(&self) -> U256 {
        match self {
            Self::Native { amount, .. }
            | Self::Token { amount, .. }
            | Self::Wrapped { amount, .. }
            | Self::Message { amount, .. } => *amount,
        }
    }

    pub fn destination(&self) -> Address {
        match self {
            Self::Native { destination, .. }
            | Self::Token { destination, .. }
            | Self::Wrapped { destination, .. }
            | Self::Message { destination, .. } => *destination,
        }
    }
}

/// Any error returned aborts the surrounding deposit or claim with no state change.
pub trait Custody: Send + Sync {
    fn lock(&self, order: &LockOrder) -> anyhow::Result<()>;

    fn release(&self, order: &ReleaseOrder) -> anyhow::Result<()>;
}

/// Custody that only records what it was asked to do. Useful for simulations and tests.
#[derive(Debug, Default)]
pub struct RecordingCustody {
    locks: Mutex<Vec<LockOrder>>,
    releases: Mutex<Vec<ReleaseOrder>>,
    refuse: Mutex<bool>,
}

impl RecordingCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following lock and release fail until switched back.
    pub fn set_refuse(&self, refuse: bool) {
        *self.refuse.lock().unwrap() = refuse;
    }

    pub fn locks(&self) -> Vec<LockOrder> {
        self.locks.lock().unwrap().clone()
    }

    pub fn releases(&self) -> Vec<ReleaseOrder> {
        self.releases.lock().unwrap().clone()
    }

    fn check_refused(&self) -> anyhow::Result<()> {
        if *self.refuse.lock().unwrap() {
            anyhow::bail!("custody is refusing transfers");
        }
        Ok(())
    }
}

impl Custody for RecordingCustody {
    fn lock(&self, order: &LockOrder) -> anyhow::Result<()> {
        self.check_refused()?;
        self.locks.lock().unwrap().push(order.clone());
        Ok(())
    }

    fn release(&self, order: &ReleaseOrder) -> anyhow::Result<()> {
        self.check_refused()?;
        self.releases.lock().unwrap().push(order.clone());
        Ok(())
    }
}
