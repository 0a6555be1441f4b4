//! Result types for fill and cancel operations

use common::Address;
use serde::{Deserialize, Serialize};

use crate::domain::OrderSide;

/// Result of a fill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillResult {
    pub market: Address,
    pub order_id: u64,
    pub maker: Address,
    pub taker: Address,
    /// Side of the resting order
    pub side: OrderSide,
    pub price: u64,
    /// Base units exchanged
    pub fill_size: u64,
    /// Quote units exchanged
    pub quote_amount: u64,
    /// Base units still open on the order
    pub remaining: u64,
}

impl FillResult {
    /// Whether this fill completed the order
    pub fn fully_filled(&self) -> bool {
        self.remaining == 0
    }
}

/// Result of a cancel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelResult {
    pub market: Address,
    pub order_id: u64,
    pub owner: Address,
    /// Asset returned from escrow
    pub asset: Address,
    /// Units returned from escrow
    pub refunded: u64,
}
