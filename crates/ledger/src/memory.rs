//! In-memory asset ledger
//!
//! All state sits behind one `parking_lot::RwLock`. A commit validates its
//! operations against a scratch overlay of the touched balances and supplies
//! and only writes the overlay back once every operation has passed, so a
//! failing transaction leaves no trace.

use std::collections::HashMap;

use common::Address;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::authority::{
    holder_account_address, AccountOwner, AssetId, Authority, CustodyAuthority, MintAuthority,
    SubAccount,
};
use crate::error::LedgerError;
use crate::traits::{AccountInfo, AssetLedger};
use crate::transaction::{Operation, Transaction};
use crate::Result;

#[derive(Debug)]
struct AssetState {
    decimals: u8,
    supply: u64,
}

#[derive(Debug)]
struct AccountState {
    asset: AssetId,
    owner: AccountOwner,
    /// Opening nonce for custody accounts, zero for holder accounts
    nonce: u64,
    balance: u64,
}

#[derive(Debug, Default)]
struct LedgerState {
    assets: HashMap<AssetId, AssetState>,
    accounts: HashMap<Address, AccountState>,
    next_nonce: u64,
}

/// Pending balances and supplies of an in-flight commit
#[derive(Default)]
struct Overlay {
    balances: HashMap<Address, u64>,
    supplies: HashMap<AssetId, u64>,
}

impl Overlay {
    fn balance(&self, state: &LedgerState, address: &Address) -> Result<u64> {
        match self.balances.get(address) {
            Some(balance) => Ok(*balance),
            None => state
                .accounts
                .get(address)
                .map(|a| a.balance)
                .ok_or(LedgerError::AccountNotFound(*address)),
        }
    }

    fn supply(&self, state: &LedgerState, asset: &AssetId) -> Result<u64> {
        match self.supplies.get(asset) {
            Some(supply) => Ok(*supply),
            None => state
                .assets
                .get(asset)
                .map(|a| a.supply)
                .ok_or(LedgerError::AssetNotFound(*asset)),
        }
    }

    fn credit(&mut self, state: &LedgerState, address: &Address, amount: u64) -> Result<()> {
        let balance = self.balance(state, address)?;
        let updated = balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow(*address))?;
        self.balances.insert(*address, updated);
        Ok(())
    }

    fn debit(&mut self, state: &LedgerState, address: &Address, amount: u64) -> Result<()> {
        let balance = self.balance(state, address)?;
        let updated = balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientFunds {
                account: *address,
                balance,
                required: amount,
            })?;
        self.balances.insert(*address, updated);
        Ok(())
    }
}

/// Ledger kept entirely in process memory
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

fn account_for<'s>(
    state: &'s LedgerState,
    address: &Address,
    asset: &AssetId,
) -> Result<&'s AccountState> {
    let account = state
        .accounts
        .get(address)
        .ok_or(LedgerError::AccountNotFound(*address))?;
    if account.asset != *asset {
        return Err(LedgerError::AssetMismatch {
            account: *address,
            expected: *asset,
            actual: account.asset,
        });
    }
    Ok(account)
}

fn authorize(account: &AccountState, address: &Address, authority: Authority<'_>) -> Result<()> {
    let allowed = match (authority, account.owner) {
        (Authority::Holder(signer), AccountOwner::Holder(owner)) => signer.address() == owner,
        (Authority::Custody(custody), AccountOwner::Custody) => {
            custody.address() == *address && custody.nonce() == account.nonce
        }
        _ => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(LedgerError::Unauthorized(*address))
    }
}

fn apply(state: &LedgerState, overlay: &mut Overlay, operation: &Operation<'_>) -> Result<()> {
    match operation {
        Operation::Mint {
            authority,
            to,
            amount,
        } => {
            let asset = authority.asset();
            account_for(state, to, &asset)?;
            let supply = overlay.supply(state, &asset)?;
            let supply = supply
                .checked_add(*amount)
                .ok_or(LedgerError::SupplyOverflow(asset))?;
            overlay.credit(state, to, *amount)?;
            overlay.supplies.insert(asset, supply);
        }
        Operation::Burn {
            asset,
            from,
            amount,
            authority,
        } => {
            let account = account_for(state, from, asset)?;
            authorize(account, from, *authority)?;
            overlay.debit(state, from, *amount)?;
            let supply = overlay.supply(state, asset)?;
            // Supply always covers any single balance, so this only trips on
            // a corrupted ledger.
            let supply = supply
                .checked_sub(*amount)
                .ok_or(LedgerError::SupplyOverflow(*asset))?;
            overlay.supplies.insert(*asset, supply);
        }
        Operation::Transfer {
            asset,
            from,
            to,
            amount,
            authority,
        } => {
            let source = account_for(state, from, asset)?;
            authorize(source, from, *authority)?;
            account_for(state, to, asset)?;
            overlay.debit(state, from, *amount)?;
            overlay.credit(state, to, *amount)?;
        }
    }
    Ok(())
}

impl AssetLedger for InMemoryLedger {
    fn create_asset(&self, asset: AssetId, decimals: u8) -> Result<MintAuthority> {
        let mut state = self.state.write();
        if state.assets.contains_key(&asset) {
            return Err(LedgerError::AssetExists(asset));
        }
        state.assets.insert(
            asset,
            AssetState {
                decimals,
                supply: 0,
            },
        );
        info!(asset = %asset.short(), decimals, "Asset created");
        Ok(MintAuthority::new(asset))
    }

    fn decimals(&self, asset: &AssetId) -> Result<u8> {
        self.state
            .read()
            .assets
            .get(asset)
            .map(|a| a.decimals)
            .ok_or(LedgerError::AssetNotFound(*asset))
    }

    fn total_supply(&self, asset: &AssetId) -> Result<u64> {
        self.state
            .read()
            .assets
            .get(asset)
            .map(|a| a.supply)
            .ok_or(LedgerError::AssetNotFound(*asset))
    }

    fn open_holder_account(&self, owner: &Address, asset: &AssetId) -> Result<Address> {
        let address = holder_account_address(owner, asset);
        let mut state = self.state.write();
        if !state.assets.contains_key(asset) {
            return Err(LedgerError::AssetNotFound(*asset));
        }
        if let Some(existing) = state.accounts.get(&address) {
            if existing.owner != AccountOwner::Holder(*owner) || existing.asset != *asset {
                return Err(LedgerError::AccountExists(address));
            }
            return Ok(address);
        }
        state.accounts.insert(
            address,
            AccountState {
                asset: *asset,
                owner: AccountOwner::Holder(*owner),
                nonce: 0,
                balance: 0,
            },
        );
        debug!(owner = %owner.short(), asset = %asset.short(), "Holder account opened");
        Ok(address)
    }

    fn open_sub_account(&self, address: Address, asset: &AssetId) -> Result<SubAccount> {
        let mut state = self.state.write();
        if !state.assets.contains_key(asset) {
            return Err(LedgerError::AssetNotFound(*asset));
        }
        if state.accounts.contains_key(&address) {
            return Err(LedgerError::AccountExists(address));
        }
        state.next_nonce += 1;
        let nonce = state.next_nonce;
        state.accounts.insert(
            address,
            AccountState {
                asset: *asset,
                owner: AccountOwner::Custody,
                nonce,
                balance: 0,
            },
        );
        debug!(account = %address.short(), asset = %asset.short(), "Sub-account opened");
        Ok(SubAccount::new(
            *asset,
            CustodyAuthority::new(address, nonce),
        ))
    }

    fn close_sub_account(&self, account: &SubAccount) -> Result<()> {
        let address = account.address();
        let mut state = self.state.write();
        let existing = state
            .accounts
            .get(&address)
            .ok_or(LedgerError::AccountNotFound(address))?;
        authorize(existing, &address, account.as_authority())?;
        if existing.balance != 0 {
            return Err(LedgerError::AccountNotEmpty {
                account: address,
                balance: existing.balance,
            });
        }
        state.accounts.remove(&address);
        debug!(account = %address.short(), "Sub-account closed");
        Ok(())
    }

    fn account(&self, address: &Address) -> Result<AccountInfo> {
        let state = self.state.read();
        let account = state
            .accounts
            .get(address)
            .ok_or(LedgerError::AccountNotFound(*address))?;
        Ok(AccountInfo {
            address: *address,
            asset: account.asset,
            owner: account.owner,
            balance: account.balance,
        })
    }

    fn commit(&self, transaction: Transaction<'_>) -> Result<()> {
        let mut state = self.state.write();
        let mut overlay = Overlay::default();
        for operation in transaction.operations() {
            apply(&state, &mut overlay, operation)?;
        }

        for (address, balance) in overlay.balances {
            if let Some(account) = state.accounts.get_mut(&address) {
                account.balance = balance;
            }
        }
        for (asset, supply) in overlay.supplies {
            if let Some(entry) = state.assets.get_mut(&asset) {
                entry.supply = supply;
            }
        }
        debug!(operations = transaction.operations().len(), "Ledger transaction committed");
        Ok(())
    }
}
