//! Matching engine error types

use common::Address;
use ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur while placing, filling or cancelling orders
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchingError {
    /// Price is zero
    #[error("Invalid price: must be greater than zero")]
    InvalidPrice,

    /// Size is zero
    #[error("Invalid amount: must be greater than zero")]
    InvalidAmount,

    /// Asset does not match the market definition
    #[error("Invalid mint: {0}")]
    InvalidMint(Address),

    /// Fill size is zero or larger than what remains
    #[error("Invalid fill size {requested}: {remaining} remaining")]
    InvalidFillSize { requested: u64, remaining: u64 },

    /// Checked arithmetic failed
    #[error("Math overflow in {0}")]
    MathOverflow(&'static str),

    /// Caller does not own the order
    #[error("Unauthorized access to order {order_id} by {caller}")]
    UnauthorizedAccess { order_id: u64, caller: Address },

    /// Order has nothing left to fill
    #[error("Order {0} is fully filled")]
    OrderFullyFilled(u64),

    /// Order was cancelled
    #[error("Order {0} is cancelled")]
    OrderCancelled(u64),

    /// Unknown market
    #[error("Market not found: {0}")]
    MarketNotFound(Address),

    /// Market for this pair already exists
    #[error("Market already exists: {0}")]
    MarketAlreadyExists(Address),

    /// Order address is already taken
    #[error("Order already exists: {0}")]
    OrderAlreadyExists(Address),

    /// Unknown order id
    #[error("Order {order_id} not found in market {market}")]
    OrderNotFound { market: Address, order_id: u64 },

    /// Caller's account cannot cover the payment
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
