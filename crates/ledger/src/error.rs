//! Ledger error types

use common::Address;
use thiserror::Error;

/// Errors that can occur while reading or committing ledger state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Asset class already registered
    #[error("Asset already exists: {0}")]
    AssetExists(Address),

    /// Asset class unknown
    #[error("Asset not found: {0}")]
    AssetNotFound(Address),

    /// Account already open at this address
    #[error("Account already exists: {0}")]
    AccountExists(Address),

    /// No account at this address
    #[error("Account not found: {0}")]
    AccountNotFound(Address),

    /// Account holds a different asset class than the operation names
    #[error("Account {account} holds {actual}, expected {expected}")]
    AssetMismatch {
        account: Address,
        expected: Address,
        actual: Address,
    },

    /// Debit larger than the balance
    #[error("Insufficient funds in {account}: balance {balance}, required {required}")]
    InsufficientFunds {
        account: Address,
        balance: u64,
        required: u64,
    },

    /// Authority does not control the debited account
    #[error("Unauthorized debit of account {0}")]
    Unauthorized(Address),

    /// Supply would exceed u64
    #[error("Supply overflow for asset {0}")]
    SupplyOverflow(Address),

    /// Balance would exceed u64
    #[error("Balance overflow for account {0}")]
    BalanceOverflow(Address),

    /// Custody account still holds funds
    #[error("Account {account} is not empty (balance {balance})")]
    AccountNotEmpty { account: Address, balance: u64 },
}
