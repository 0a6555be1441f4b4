//! Capabilities over ledger state

use common::{derive, tags, Address};
use serde::{Deserialize, Serialize};

/// Asset classes are identified by their mint address
pub type AssetId = Address;

/// Canonical holder account of `owner` for `asset`
pub fn holder_account_address(owner: &Address, asset: &AssetId) -> Address {
    derive(tags::HOLDER_ACCOUNT, owner, &[asset.as_bytes()])
}

/// Proof that the caller controls `address`
///
/// Produced by the session layer after it has verified the caller's
/// signature. Holder accounts owned by this address can be debited with it.
#[derive(Debug, PartialEq, Eq)]
pub struct Signer {
    address: Address,
}

impl Signer {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

/// Right to issue units of one asset class
///
/// Returned once, by `create_asset`.
#[derive(Debug)]
pub struct MintAuthority {
    asset: AssetId,
}

impl MintAuthority {
    pub(crate) fn new(asset: AssetId) -> Self {
        Self { asset }
    }

    pub fn asset(&self) -> AssetId {
        self.asset
    }
}

/// Right to debit one custody account
///
/// The nonce ties the authority to a single opening of the account, so a
/// handle kept after `close_sub_account` cannot debit a later account
/// opened at the same address.
#[derive(Debug)]
pub struct CustodyAuthority {
    address: Address,
    nonce: u64,
}

impl CustodyAuthority {
    pub(crate) fn new(address: Address, nonce: u64) -> Self {
        Self { address, nonce }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub(crate) fn nonce(&self) -> u64 {
        self.nonce
    }
}

/// A custody account together with the sole authority to debit it
#[derive(Debug)]
pub struct SubAccount {
    asset: AssetId,
    authority: CustodyAuthority,
}

impl SubAccount {
    pub(crate) fn new(asset: AssetId, authority: CustodyAuthority) -> Self {
        Self { asset, authority }
    }

    pub fn address(&self) -> Address {
        self.authority.address
    }

    pub fn asset(&self) -> AssetId {
        self.asset
    }

    /// Borrow as a debit authority for a transaction
    pub fn as_authority(&self) -> Authority<'_> {
        Authority::Custody(&self.authority)
    }
}

/// Authority presented for a debit
#[derive(Debug, Clone, Copy)]
pub enum Authority<'a> {
    /// Owner of a holder account
    Holder(&'a Signer),
    /// Custodian of a sub-account
    Custody(&'a CustodyAuthority),
}

/// Who controls an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "owner", rename_all = "snake_case")]
pub enum AccountOwner {
    /// Debitable by a [`Signer`] for this address
    Holder(Address),
    /// Debitable only through the account's [`CustodyAuthority`]
    Custody,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holder_account_address_depends_on_owner_and_asset() {
        let alice = Address::from_label("alice");
        let bob = Address::from_label("bob");
        let usdc = Address::from_label("usdc");
        let sol = Address::from_label("sol");

        assert_eq!(holder_account_address(&alice, &usdc), holder_account_address(&alice, &usdc));
        assert_ne!(holder_account_address(&alice, &usdc), holder_account_address(&bob, &usdc));
        assert_ne!(holder_account_address(&alice, &usdc), holder_account_address(&alice, &sol));
    }
}
