//! Asset ledger trait

use std::sync::Arc;

use common::Address;
use serde::{Deserialize, Serialize};

use crate::authority::{AccountOwner, AssetId, Authority, MintAuthority, SubAccount};
use crate::transaction::Transaction;
use crate::Result;

/// Snapshot of a single token account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub address: Address,
    pub asset: AssetId,
    pub owner: AccountOwner,
    pub balance: u64,
}

/// Fungible-asset ledger used by the engines
///
/// Implementations must make [`commit`](AssetLedger::commit) atomic and
/// must never let a balance or supply go negative or overflow.
pub trait AssetLedger: Send + Sync {
    /// Register a new asset class and hand back its only mint authority
    fn create_asset(&self, asset: AssetId, decimals: u8) -> Result<MintAuthority>;

    /// Decimal places of an asset class
    fn decimals(&self, asset: &AssetId) -> Result<u8>;

    /// Units currently in existence
    fn total_supply(&self, asset: &AssetId) -> Result<u64>;

    /// Open (or return the existing) holder account of `owner` for `asset`
    fn open_holder_account(&self, owner: &Address, asset: &AssetId) -> Result<Address>;

    /// Open a custody account at `address`
    ///
    /// Fails with `AccountExists` if anything lives at `address` already, so
    /// the returned authority is the only one for this account.
    fn open_sub_account(&self, address: Address, asset: &AssetId) -> Result<SubAccount>;

    /// Remove an empty custody account
    fn close_sub_account(&self, account: &SubAccount) -> Result<()>;

    /// Account snapshot
    fn account(&self, address: &Address) -> Result<AccountInfo>;

    /// Balance of an account
    fn balance_of(&self, address: &Address) -> Result<u64> {
        Ok(self.account(address)?.balance)
    }

    /// Apply every operation in `transaction`, or none of them
    fn commit(&self, transaction: Transaction<'_>) -> Result<()>;

    fn mint(&self, authority: &MintAuthority, to: &Address, amount: u64) -> Result<()> {
        self.commit(Transaction::new().mint(authority, *to, amount))
    }

    fn burn(
        &self,
        asset: &AssetId,
        from: &Address,
        amount: u64,
        authority: Authority<'_>,
    ) -> Result<()> {
        self.commit(Transaction::new().burn(*asset, *from, amount, authority))
    }

    fn transfer(
        &self,
        asset: &AssetId,
        from: &Address,
        to: &Address,
        amount: u64,
        authority: Authority<'_>,
    ) -> Result<()> {
        self.commit(Transaction::new().transfer(*asset, *from, *to, amount, authority))
    }
}

/// Shared ledger handle
pub type SharedLedger = Arc<dyn AssetLedger>;
