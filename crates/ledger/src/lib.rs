//! Asset Ledger for optx
//!
//! Fungible asset classes, token accounts and the capabilities that move
//! balances between them. The option and matching engines consume this
//! crate through the [`AssetLedger`] trait; they never touch balances
//! directly.
//!
//! # Capabilities
//!
//! - [`Signer`] proves that the caller controls a holder address.
//! - [`MintAuthority`] is the only way to issue units of an asset class.
//! - [`CustodyAuthority`] (inside a [`SubAccount`]) is the only way to debit
//!   a custody account. It is handed out once, when the account is opened.
//!
//! None of the capability types implement `Clone`, and only this crate can
//! construct the latter two.

pub mod authority;
pub mod error;
pub mod memory;
pub mod traits;
pub mod transaction;

pub use authority::{
    holder_account_address, AccountOwner, AssetId, Authority, CustodyAuthority, MintAuthority,
    Signer, SubAccount,
};
pub use error::LedgerError;
pub use memory::InMemoryLedger;
pub use traits::{AccountInfo, AssetLedger, SharedLedger};
pub use transaction::{Operation, Transaction};

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;
