//! Domain types for the Matching Engine

use std::collections::BTreeMap;

use common::{derive, tags, Address};
use serde::{Deserialize, Serialize};

// ============================================================================
// Order Side
// ============================================================================

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Pays quote, receives base
    Buy,
    /// Pays base, receives quote
    Sell,
}

impl OrderSide {
    /// Returns true if this is a buy order
    pub fn is_buy(&self) -> bool {
        matches!(self, OrderSide::Buy)
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

// ============================================================================
// Order Status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Resting, partially filled or not
    Open,
    /// `filled == size`
    Filled,
    /// Withdrawn by its owner
    Cancelled,
}

// ============================================================================
// Market
// ============================================================================

/// One market per ordered (base, quote) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub address: Address,
    pub base_asset: Address,
    pub quote_asset: Address,
    /// Id the next placed order receives
    pub next_order_id: u64,
    pub total_orders_placed: u64,
    pub total_orders_filled: u64,
    /// Base units exchanged across all fills
    pub total_base_volume: u64,
    /// Quote units exchanged across all fills
    pub total_quote_volume: u64,
    pub created_at: i64,
}

impl Market {
    pub(crate) fn new(base_asset: Address, quote_asset: Address, created_at: i64) -> Self {
        Self {
            address: Self::address_for(&base_asset, &quote_asset),
            base_asset,
            quote_asset,
            next_order_id: 0,
            total_orders_placed: 0,
            total_orders_filled: 0,
            total_base_volume: 0,
            total_quote_volume: 0,
            created_at,
        }
    }

    /// Canonical market address for a pair
    pub fn address_for(base_asset: &Address, quote_asset: &Address) -> Address {
        derive(tags::MARKET, base_asset, &[quote_asset.as_bytes()])
    }

    /// Asset a maker on `side` deposits into escrow
    pub fn deposit_asset(&self, side: OrderSide) -> Address {
        match side {
            OrderSide::Sell => self.base_asset,
            OrderSide::Buy => self.quote_asset,
        }
    }
}

// ============================================================================
// Order
// ============================================================================

/// A resting limit order and its escrow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub address: Address,
    pub market: Address,
    pub order_id: u64,
    pub owner: Address,
    pub side: OrderSide,
    /// Quote units per base unit
    pub price: u64,
    /// Base units
    pub size: u64,
    /// Base units filled so far
    pub filled: u64,
    pub status: OrderStatus,
    pub created_at: i64,
    pub escrow_vault: Address,
}

impl Order {
    /// Canonical order address
    pub fn address_for(market: &Address, order_id: u64) -> Address {
        derive(tags::ORDER, market, &[&order_id.to_le_bytes()])
    }

    /// Canonical escrow address of an order
    pub fn escrow_for(order: &Address) -> Address {
        derive(tags::ESCROW, order, &[])
    }

    pub fn remaining(&self) -> u64 {
        self.size.saturating_sub(self.filled)
    }

    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }
}

/// Quote units owed for `size` base units at `price`
pub fn notional(size: u64, price: u64) -> Option<u64> {
    size.checked_mul(price)
}

// ============================================================================
// Book Snapshot
// ============================================================================

/// Aggregated open size at one price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: u64,
    /// Remaining base units across all orders at this price
    pub size: u64,
    pub order_count: usize,
}

/// Depth view of a market's open orders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub market: Address,
    /// Bid levels, best (highest) first
    pub bids: Vec<PriceLevel>,
    /// Ask levels, best (lowest) first
    pub asks: Vec<PriceLevel>,
    pub timestamp: i64,
}

impl BookSnapshot {
    /// Build a snapshot from a market's open orders
    pub fn from_orders<'a>(
        market: Address,
        orders: impl IntoIterator<Item = &'a Order>,
        depth: usize,
        timestamp: i64,
    ) -> Self {
        let mut bids: BTreeMap<u64, PriceLevel> = BTreeMap::new();
        let mut asks: BTreeMap<u64, PriceLevel> = BTreeMap::new();

        for order in orders.into_iter().filter(|o| o.is_open()) {
            let book = if order.side.is_buy() { &mut bids } else { &mut asks };
            let level = book.entry(order.price).or_insert(PriceLevel {
                price: order.price,
                size: 0,
                order_count: 0,
            });
            level.size = level.size.saturating_add(order.remaining());
            level.order_count += 1;
        }

        Self {
            market,
            bids: bids.into_values().rev().take(depth).collect(),
            asks: asks.into_values().take(depth).collect(),
            timestamp,
        }
    }

    pub fn best_bid(&self) -> Option<u64> {
        self.bids.first().map(|l| l.price)
    }

    pub fn best_ask(&self) -> Option<u64> {
        self.asks.first().map(|l| l.price)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn order(order_id: u64, side: OrderSide, price: u64, size: u64, filled: u64) -> Order {
        let market = Address::from_label("market");
        let address = Order::address_for(&market, order_id);
        Order {
            address,
            market,
            order_id,
            owner: Address::from_label("maker"),
            side,
            price,
            size,
            filled,
            status: OrderStatus::Open,
            created_at: 0,
            escrow_vault: Order::escrow_for(&address),
        }
    }

    #[test]
    fn test_order_side_display() {
        assert_eq!(OrderSide::Buy.to_string(), "buy");
        assert_eq!(OrderSide::Sell.to_string(), "sell");
    }

    #[test]
    fn test_market_deposit_asset() {
        let base = Address::from_label("base");
        let quote = Address::from_label("quote");
        let market = Market::new(base, quote, 0);
        assert_eq!(market.deposit_asset(OrderSide::Sell), base);
        assert_eq!(market.deposit_asset(OrderSide::Buy), quote);
        assert_ne!(Market::address_for(&base, &quote), Market::address_for(&quote, &base));
    }

    #[test]
    fn test_order_addresses_are_per_id() {
        let market = Address::from_label("market");
        let a = Order::address_for(&market, 0);
        let b = Order::address_for(&market, 1);
        assert_ne!(a, b);
        assert_ne!(Order::escrow_for(&a), Order::escrow_for(&b));
    }

    #[test]
    fn test_snapshot_aggregates_and_orders_levels() {
        let mut cancelled = order(5, OrderSide::Sell, 9, 100, 0);
        cancelled.status = OrderStatus::Cancelled;
        let orders = vec![
            order(0, OrderSide::Buy, 10, 50, 20),
            order(1, OrderSide::Buy, 10, 5, 0),
            order(2, OrderSide::Buy, 12, 7, 0),
            order(3, OrderSide::Sell, 15, 8, 0),
            order(4, OrderSide::Sell, 13, 3, 1),
            cancelled,
        ];
        let snapshot = BookSnapshot::from_orders(Address::from_label("market"), &orders, 10, 0);

        assert_eq!(snapshot.best_bid(), Some(12));
        assert_eq!(snapshot.best_ask(), Some(13));
        assert_eq!(snapshot.bids[1], PriceLevel { price: 10, size: 35, order_count: 2 });
        assert_eq!(snapshot.asks[0], PriceLevel { price: 13, size: 2, order_count: 1 });
        assert_eq!(snapshot.asks.len(), 2);

        let shallow = BookSnapshot::from_orders(Address::from_label("market"), &orders, 1, 0);
        assert_eq!(shallow.bids.len(), 1);
        assert_eq!(shallow.asks.len(), 1);
    }

    #[test]
    fn test_notional_overflow() {
        assert_eq!(notional(100, 10), Some(1_000));
        assert_eq!(notional(u64::MAX, 2), None);
    }
}
