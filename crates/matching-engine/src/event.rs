//! Event types for the matching engine
//!
//! One event is appended per successful operation, in commit order.

use common::Address;
use serde::{Deserialize, Serialize};

use crate::domain::OrderSide;

/// Event in the matching engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchingEvent {
    /// A market was opened for a pair
    MarketCreated {
        market: Address,
        base_asset: Address,
        quote_asset: Address,
    },

    /// An order was placed and its deposit escrowed
    OrderPlaced {
        market: Address,
        order_id: u64,
        owner: Address,
        side: OrderSide,
        price: u64,
        size: u64,
        /// Units moved into escrow
        deposit: u64,
    },

    /// A taker filled (part of) an order
    OrderFilled {
        market: Address,
        order_id: u64,
        taker: Address,
        fill_size: u64,
        quote_amount: u64,
        remaining: u64,
    },

    /// The owner cancelled an order
    OrderCancelled {
        market: Address,
        order_id: u64,
        /// Units returned from escrow
        refunded: u64,
    },
}

impl MatchingEvent {
    /// Market the event belongs to
    pub fn market(&self) -> Address {
        match self {
            MatchingEvent::MarketCreated { market, .. }
            | MatchingEvent::OrderPlaced { market, .. }
            | MatchingEvent::OrderFilled { market, .. }
            | MatchingEvent::OrderCancelled { market, .. } => *market,
        }
    }
}
