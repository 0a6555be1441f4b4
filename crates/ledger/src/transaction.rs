//! Multi-operation ledger transactions
//!
//! A [`Transaction`] is applied by [`AssetLedger::commit`](crate::AssetLedger::commit)
//! as a unit: either every operation takes effect or none does.

use common::Address;

use crate::authority::{AssetId, Authority, MintAuthority};

/// A single balance movement
#[derive(Debug)]
pub enum Operation<'a> {
    /// Issue `amount` new units into `to`
    Mint {
        authority: &'a MintAuthority,
        to: Address,
        amount: u64,
    },
    /// Destroy `amount` units held in `from`
    Burn {
        asset: AssetId,
        from: Address,
        amount: u64,
        authority: Authority<'a>,
    },
    /// Move `amount` units from `from` to `to`
    Transfer {
        asset: AssetId,
        from: Address,
        to: Address,
        amount: u64,
        authority: Authority<'a>,
    },
}

/// Ordered list of operations committed atomically
#[derive(Debug, Default)]
pub struct Transaction<'a> {
    operations: Vec<Operation<'a>>,
}

impl<'a> Transaction<'a> {
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
        }
    }

    pub fn mint(mut self, authority: &'a MintAuthority, to: Address, amount: u64) -> Self {
        self.operations.push(Operation::Mint {
            authority,
            to,
            amount,
        });
        self
    }

    pub fn burn(
        mut self,
        asset: AssetId,
        from: Address,
        amount: u64,
        authority: Authority<'a>,
    ) -> Self {
        self.operations.push(Operation::Burn {
            asset,
            from,
            amount,
            authority,
        });
        self
    }

    pub fn transfer(
        mut self,
        asset: AssetId,
        from: Address,
        to: Address,
        amount: u64,
        authority: Authority<'a>,
    ) -> Self {
        self.operations.push(Operation::Transfer {
            asset,
            from,
            to,
            amount,
            authority,
        });
        self
    }

    pub fn operations(&self) -> &[Operation<'a>] {
        &self.operations
    }
}
