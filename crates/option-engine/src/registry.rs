//! Series registry
//!
//! An arena of series entries keyed by series address. The map lock is held
//! only long enough to look an entry up; each entry carries its own mutex,
//! so operations on different series never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use common::Address;
use ledger::{MintAuthority, SubAccount};
use parking_lot::{Mutex, RwLock, RwLockWriteGuard};

use crate::error::OptionError;
use crate::series::{ConsiderationClaim, Series};
use crate::Result;

/// A series together with the capabilities that only it may use
pub(crate) struct SeriesEntry {
    pub series: Series,
    pub option_mint: MintAuthority,
    pub redemption_mint: MintAuthority,
    pub collateral_vault: SubAccount,
    pub consideration_vault: SubAccount,
    /// Consideration claims keyed by holder
    pub claims: HashMap<Address, ConsiderationClaim>,
}

pub(crate) type SharedEntry = Arc<Mutex<SeriesEntry>>;

#[derive(Default)]
pub(crate) struct SeriesRegistry {
    entries: RwLock<HashMap<Address, SharedEntry>>,
}

impl SeriesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive access for series creation
    pub fn write(&self) -> RwLockWriteGuard<'_, HashMap<Address, SharedEntry>> {
        self.entries.write()
    }

    pub fn get(&self, address: &Address) -> Result<SharedEntry> {
        self.entries
            .read()
            .get(address)
            .cloned()
            .ok_or(OptionError::SeriesNotFound(*address))
    }

    /// Series addresses in ascending order
    pub fn addresses(&self) -> Vec<Address> {
        let mut addresses: Vec<Address> = self.entries.read().keys().copied().collect();
        addresses.sort();
        addresses
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
}
