//! Option engine error types

use common::Address;
use ledger::LedgerError;
use thiserror::Error;

/// Errors returned by option lifecycle operations
///
/// Every error is raised before the ledger commit, so a failed operation
/// leaves balances and counters untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    /// Expiry is not in the future
    #[error("Expiration in past: expiry {expiry}, now {now}")]
    ExpirationInPast { expiry: i64, now: i64 },

    /// Strike price is zero
    #[error("Invalid strike price: must be greater than zero")]
    InvalidStrikePrice,

    /// Amount is zero
    #[error("Invalid amount: must be greater than zero")]
    InvalidAmount,

    /// Checked arithmetic failed
    #[error("Math overflow in {0}")]
    MathOverflow(&'static str),

    /// Operation only allowed before expiry
    #[error("Option expired at {expiry} (now {now})")]
    OptionExpired { expiry: i64, now: i64 },

    /// Operation only allowed at or after expiry
    #[error("Option not expired: expires at {expiry} (now {now})")]
    OptionNotExpired { expiry: i64, now: i64 },

    /// Collateral vault cannot cover the payout
    #[error("Insufficient collateral: vault holds {available}, required {required}")]
    InsufficientCollateral { available: u64, required: u64 },

    /// No redemption asset outstanding
    #[error("No tokens issued for series {0}")]
    NoTokensIssued(Address),

    /// Caller holds no redemption asset
    #[error("No short tokens held by {0}")]
    NoShortTokens(Address),

    /// Entitlement already fully withdrawn
    #[error("No claimable consideration for {0}")]
    NoClaimableConsideration(Address),

    /// Exercise amount too small to owe any consideration
    #[error("Strike payment for {amount} units truncates to zero")]
    StrikePaymentTooSmall { amount: u64 },

    /// Unknown series address
    #[error("Series not found: {0}")]
    SeriesNotFound(Address),

    /// A series with the same parameters exists
    #[error("Series already exists: {0}")]
    SeriesAlreadyExists(Address),

    /// Caller's account cannot cover the debit
    #[error("Insufficient balance in {account}: available {available}, required {required}")]
    InsufficientBalance {
        account: Address,
        available: u64,
        required: u64,
    },

    /// Ledger rejected the transaction
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
