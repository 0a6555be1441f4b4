//! Order book registry
//!
//! Markets and orders live in two arenas keyed by their derived address.
//! Each record sits behind its own mutex; the arena lock is only held to
//! find or insert a record. When an operation needs both, it locks the
//! market before the order.

use std::collections::HashMap;
use std::sync::Arc;

use common::Address;
use ledger::SubAccount;
use parking_lot::{Mutex, RwLock};

use crate::domain::{Market, Order};

pub(crate) struct OrderEntry {
    pub order: Order,
    /// Escrow capability; `None` once the escrow has been closed
    pub escrow: Option<SubAccount>,
}

/// Address-keyed arena of independently locked records
pub(crate) struct Arena<T> {
    records: RwLock<HashMap<Address, Arc<Mutex<T>>>>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, address: &Address) -> Option<Arc<Mutex<T>>> {
        self.records.read().get(address).cloned()
    }

    /// Insert a record; hands it back if the address is taken
    pub fn insert(&self, address: Address, record: T) -> Result<(), T> {
        let mut records = self.records.write();
        if records.contains_key(&address) {
            return Err(record);
        }
        records.insert(address, Arc::new(Mutex::new(record)));
        Ok(())
    }

    /// Clone out every record's handle
    pub fn handles(&self) -> Vec<Arc<Mutex<T>>> {
        self.records.read().values().cloned().collect()
    }
}

pub(crate) type MarketArena = Arena<Market>;
pub(crate) type OrderArena = Arena<OrderEntry>;
