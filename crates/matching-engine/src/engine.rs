//! Order Matching and Escrow Engine
//!
//! Placement moves the maker's side into a fresh escrow. A fill pays the
//! taker out of escrow and the maker straight from the taker's account in
//! one ledger transaction. Market and order counters are only written after
//! that transaction has committed.

use std::sync::Arc;

use common::{Address, EventLog, Sequenced, SharedClock};
use ledger::{holder_account_address, Authority, LedgerError, SharedLedger, Signer, Transaction};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{notional, BookSnapshot, Market, Order, OrderSide, OrderStatus};
use crate::error::MatchingError;
use crate::event::MatchingEvent;
use crate::registry::{MarketArena, OrderArena, OrderEntry};
use crate::result::{CancelResult, FillResult};
use crate::Result;

/// Order Book Registry and Matching/Escrow Engine
pub struct MatchingEngine {
    ledger: SharedLedger,
    clock: SharedClock,
    markets: MarketArena,
    orders: OrderArena,
    event_log: Mutex<EventLog<MatchingEvent>>,
}

impl MatchingEngine {
    pub fn new(ledger: SharedLedger, clock: SharedClock) -> Self {
        Self {
            ledger,
            clock,
            markets: MarketArena::new(),
            orders: OrderArena::new(),
            event_log: Mutex::new(EventLog::new()),
        }
    }

    /// Open a market for `(base, quote)`
    pub fn create_market(&self, base_asset: &Address, quote_asset: &Address) -> Result<Market> {
        if base_asset == quote_asset {
            return Err(MatchingError::InvalidMint(*quote_asset));
        }
        for asset in [base_asset, quote_asset] {
            match self.ledger.decimals(asset) {
                Ok(_) => {}
                Err(LedgerError::AssetNotFound(_)) => {
                    return Err(MatchingError::InvalidMint(*asset))
                }
                Err(e) => return Err(e.into()),
            }
        }

        let now = self.clock.unix_timestamp();
        let market = Market::new(*base_asset, *quote_asset, now);
        if self.markets.insert(market.address, market.clone()).is_err() {
            return Err(MatchingError::MarketAlreadyExists(market.address));
        }

        self.record(
            now,
            MatchingEvent::MarketCreated {
                market: market.address,
                base_asset: market.base_asset,
                quote_asset: market.quote_asset,
            },
        );
        info!(
            market = %market.address.short(),
            base = %base_asset.short(),
            quote = %quote_asset.short(),
            "Market created"
        );
        Ok(market)
    }

    /// Place a limit order, escrowing its full deposit
    ///
    /// Sell orders deposit `size` base; buy orders deposit `size * price`
    /// quote. `deposit_asset` must be the asset the side deposits.
    pub fn place_order(
        &self,
        market: &Address,
        owner: &Signer,
        side: OrderSide,
        price: u64,
        size: u64,
        deposit_asset: &Address,
    ) -> Result<Order> {
        if price == 0 {
            return Err(MatchingError::InvalidPrice);
        }
        if size == 0 {
            return Err(MatchingError::InvalidAmount);
        }

        let handle = self
            .markets
            .get(market)
            .ok_or(MatchingError::MarketNotFound(*market))?;
        let mut guard = handle.lock();

        let expected = guard.deposit_asset(side);
        if *deposit_asset != expected {
            return Err(MatchingError::InvalidMint(*deposit_asset));
        }
        let deposit = match side {
            OrderSide::Sell => size,
            OrderSide::Buy => {
                notional(size, price).ok_or(MatchingError::MathOverflow("order notional"))?
            }
        };
        let next_order_id = guard
            .next_order_id
            .checked_add(1)
            .ok_or(MatchingError::MathOverflow("next order id"))?;
        let total_orders_placed = guard
            .total_orders_placed
            .checked_add(1)
            .ok_or(MatchingError::MathOverflow("orders placed"))?;

        let maker = owner.address();
        let source = self.require_balance(&maker, deposit_asset, deposit)?;

        let now = self.clock.unix_timestamp();
        let order_id = guard.next_order_id;
        let address = Order::address_for(market, order_id);
        if self.orders.get(&address).is_some() {
            return Err(MatchingError::OrderAlreadyExists(address));
        }
        let escrow = self
            .ledger
            .open_sub_account(Order::escrow_for(&address), deposit_asset)?;

        let tx = Transaction::new().transfer(
            *deposit_asset,
            source,
            escrow.address(),
            deposit,
            Authority::Holder(owner),
        );
        if let Err(e) = self.ledger.commit(tx) {
            if let Err(close) = self.ledger.close_sub_account(&escrow) {
                warn!(escrow = %escrow.address().short(), error = %close, "Failed to close unused escrow");
            }
            return Err(e.into());
        }

        let order = Order {
            address,
            market: *market,
            order_id,
            owner: maker,
            side,
            price,
            size,
            filled: 0,
            status: OrderStatus::Open,
            created_at: now,
            escrow_vault: escrow.address(),
        };
        let entry = OrderEntry {
            order: order.clone(),
            escrow: Some(escrow),
        };
        if let Err(rejected) = self.orders.insert(address, entry) {
            if let Some(escrow) = rejected.escrow {
                self.refund(&escrow, &maker)?;
                self.ledger.close_sub_account(&escrow)?;
            }
            return Err(MatchingError::OrderAlreadyExists(address));
        }
        guard.next_order_id = next_order_id;
        guard.total_orders_placed = total_orders_placed;
        drop(guard);

        self.record(
            now,
            MatchingEvent::OrderPlaced {
                market: *market,
                order_id,
                owner: maker,
                side,
                price,
                size,
                deposit,
            },
        );
        info!(
            market = %market.short(),
            order_id,
            owner = %maker.short(),
            side = %side,
            price,
            size,
            deposit,
            "Order placed"
        );
        Ok(order)
    }

    /// Fill `fill_size` base units of an open order
    pub fn fill_order(
        &self,
        market: &Address,
        order_id: u64,
        taker: &Signer,
        fill_size: u64,
    ) -> Result<FillResult> {
        let market_handle = self
            .markets
            .get(market)
            .ok_or(MatchingError::MarketNotFound(*market))?;
        let mut market_guard = market_handle.lock();
        let order_handle = self.order_handle(market, order_id)?;
        let mut order_guard = order_handle.lock();

        let order = order_guard.order.clone();
        match order.status {
            OrderStatus::Cancelled => return Err(MatchingError::OrderCancelled(order_id)),
            OrderStatus::Filled => return Err(MatchingError::OrderFullyFilled(order_id)),
            OrderStatus::Open => {}
        }
        let remaining = order.remaining();
        if fill_size == 0 || fill_size > remaining {
            return Err(MatchingError::InvalidFillSize {
                requested: fill_size,
                remaining,
            });
        }

        let quote_amount =
            notional(fill_size, order.price).ok_or(MatchingError::MathOverflow("fill notional"))?;
        let filled = order.filled + fill_size;
        let total_base_volume = market_guard
            .total_base_volume
            .checked_add(fill_size)
            .ok_or(MatchingError::MathOverflow("base volume"))?;
        let total_quote_volume = market_guard
            .total_quote_volume
            .checked_add(quote_amount)
            .ok_or(MatchingError::MathOverflow("quote volume"))?;
        let fully_filled = filled == order.size;
        let total_orders_filled = if fully_filled {
            market_guard
                .total_orders_filled
                .checked_add(1)
                .ok_or(MatchingError::MathOverflow("orders filled"))?
        } else {
            market_guard.total_orders_filled
        };

        let base = market_guard.base_asset;
        let quote = market_guard.quote_asset;
        let taker_address = taker.address();
        // (asset, amount) the taker pays to the maker and receives from escrow
        let (pay_asset, pay_amount, receive_asset, receive_amount) = match order.side {
            OrderSide::Sell => (quote, quote_amount, base, fill_size),
            OrderSide::Buy => (base, fill_size, quote, quote_amount),
        };
        let taker_source = self.require_balance(&taker_address, &pay_asset, pay_amount)?;
        let maker_receive = self.ledger.open_holder_account(&order.owner, &pay_asset)?;
        let taker_receive = self
            .ledger
            .open_holder_account(&taker_address, &receive_asset)?;

        let escrow = order_guard
            .escrow
            .as_ref()
            .ok_or(MatchingError::OrderFullyFilled(order_id))?;
        debug!(
            market = %market.short(),
            order_id,
            fill_size,
            quote_amount,
            "Fill computed"
        );
        let tx = Transaction::new()
            .transfer(
                receive_asset,
                escrow.address(),
                taker_receive,
                receive_amount,
                escrow.as_authority(),
            )
            .transfer(
                pay_asset,
                taker_source,
                maker_receive,
                pay_amount,
                Authority::Holder(taker),
            );
        self.ledger.commit(tx)?;

        if fully_filled {
            if let Some(escrow) = order_guard.escrow.take() {
                if let Err(e) = self.ledger.close_sub_account(&escrow) {
                    warn!(order_id, error = %e, "Failed to close filled escrow");
                    order_guard.escrow = Some(escrow);
                }
            }
            order_guard.order.status = OrderStatus::Filled;
        }
        order_guard.order.filled = filled;
        drop(order_guard);

        market_guard.total_base_volume = total_base_volume;
        market_guard.total_quote_volume = total_quote_volume;
        market_guard.total_orders_filled = total_orders_filled;
        drop(market_guard);

        let now = self.clock.unix_timestamp();
        let remaining = order.size - filled;
        self.record(
            now,
            MatchingEvent::OrderFilled {
                market: *market,
                order_id,
                taker: taker_address,
                fill_size,
                quote_amount,
                remaining,
            },
        );
        info!(
            market = %market.short(),
            order_id,
            taker = %taker_address.short(),
            fill_size,
            quote_amount,
            remaining,
            "Order filled"
        );
        Ok(FillResult {
            market: *market,
            order_id,
            maker: order.owner,
            taker: taker_address,
            side: order.side,
            price: order.price,
            fill_size,
            quote_amount,
            remaining,
        })
    }

    /// Cancel an open order and refund its escrow to the owner
    pub fn cancel_order(
        &self,
        market: &Address,
        order_id: u64,
        owner: &Signer,
    ) -> Result<CancelResult> {
        let order_handle = self.order_handle(market, order_id)?;
        let mut guard = order_handle.lock();

        match guard.order.status {
            OrderStatus::Cancelled => return Err(MatchingError::OrderCancelled(order_id)),
            OrderStatus::Filled => return Err(MatchingError::OrderFullyFilled(order_id)),
            OrderStatus::Open => {}
        }
        let caller = owner.address();
        if guard.order.owner != caller {
            warn!(
                market = %market.short(),
                order_id,
                caller = %caller.short(),
                "Unauthorized cancel rejected"
            );
            return Err(MatchingError::UnauthorizedAccess { order_id, caller });
        }

        let escrow = guard
            .escrow
            .take()
            .ok_or(MatchingError::OrderFullyFilled(order_id))?;
        let asset = escrow.asset();
        let refunded = match self.refund(&escrow, &caller) {
            Ok(refunded) => refunded,
            Err(e) => {
                guard.escrow = Some(escrow);
                return Err(e);
            }
        };
        if let Err(e) = self.ledger.close_sub_account(&escrow) {
            warn!(order_id, error = %e, "Failed to close cancelled escrow");
            guard.escrow = Some(escrow);
        }
        guard.order.status = OrderStatus::Cancelled;
        drop(guard);

        let now = self.clock.unix_timestamp();
        self.record(
            now,
            MatchingEvent::OrderCancelled {
                market: *market,
                order_id,
                refunded,
            },
        );
        info!(market = %market.short(), order_id, refunded, "Order cancelled");
        Ok(CancelResult {
            market: *market,
            order_id,
            owner: caller,
            asset,
            refunded,
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn market(&self, address: &Address) -> Result<Market> {
        let handle = self
            .markets
            .get(address)
            .ok_or(MatchingError::MarketNotFound(*address))?;
        let market = handle.lock().clone();
        Ok(market)
    }

    /// Look a market up by its pair
    pub fn find_market(&self, base_asset: &Address, quote_asset: &Address) -> Option<Market> {
        self.market(&Market::address_for(base_asset, quote_asset)).ok()
    }

    /// All markets, ordered by address
    pub fn markets(&self) -> Vec<Market> {
        let mut markets: Vec<Market> = self
            .markets
            .handles()
            .iter()
            .map(|h| h.lock().clone())
            .collect();
        markets.sort_by_key(|m| m.address);
        markets
    }

    pub fn order(&self, market: &Address, order_id: u64) -> Result<Order> {
        let handle = self.order_handle(market, order_id)?;
        let order = handle.lock().order.clone();
        Ok(order)
    }

    /// Open orders of a market, by ascending id
    pub fn open_orders(&self, market: &Address) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .handles()
            .iter()
            .map(|h| h.lock().order.clone())
            .filter(|o| o.market == *market && o.is_open())
            .collect();
        orders.sort_by_key(|o| o.order_id);
        orders
    }

    /// Aggregated depth of a market's open orders
    pub fn book_snapshot(&self, market: &Address, depth: usize) -> Result<BookSnapshot> {
        self.market(market)?;
        let orders = self.open_orders(market);
        Ok(BookSnapshot::from_orders(
            *market,
            &orders,
            depth,
            self.clock.unix_timestamp(),
        ))
    }

    pub fn events_since(&self, sequence: u64) -> Vec<Sequenced<MatchingEvent>> {
        self.event_log.lock().get_from(sequence)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn order_handle(&self, market: &Address, order_id: u64) -> Result<Arc<Mutex<OrderEntry>>> {
        self.orders
            .get(&Order::address_for(market, order_id))
            .ok_or(MatchingError::OrderNotFound {
                market: *market,
                order_id,
            })
    }

    fn require_balance(&self, owner: &Address, asset: &Address, required: u64) -> Result<Address> {
        let account = holder_account_address(owner, asset);
        let available = match self.ledger.balance_of(&account) {
            Ok(balance) => balance,
            Err(LedgerError::AccountNotFound(_)) => 0,
            Err(e) => return Err(e.into()),
        };
        if available < required {
            return Err(MatchingError::InsufficientBalance {
                account,
                available,
                required,
            });
        }
        Ok(account)
    }

    /// Return the whole escrow balance to `owner`
    fn refund(&self, escrow: &ledger::SubAccount, owner: &Address) -> Result<u64> {
        let balance = self.ledger.balance_of(&escrow.address())?;
        if balance > 0 {
            let to = self.ledger.open_holder_account(owner, &escrow.asset())?;
            let tx = Transaction::new().transfer(
                escrow.asset(),
                escrow.address(),
                to,
                balance,
                escrow.as_authority(),
            );
            self.ledger.commit(tx)?;
        }
        Ok(balance)
    }

    fn record(&self, timestamp: i64, event: MatchingEvent) {
        self.event_log.lock().append(timestamp, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use common::ManualClock;
    use ledger::{AssetLedger, InMemoryLedger};

    struct Fixture {
        ledger: Arc<InMemoryLedger>,
        engine: MatchingEngine,
        base: Address,
        quote: Address,
        base_mint: ledger::MintAuthority,
    }

    impl Fixture {
        fn new() -> Self {
            let ledger = Arc::new(InMemoryLedger::new());
            let base = Address::from_label("base");
            let quote = Address::from_label("quote");
            let base_mint = ledger.create_asset(base, 0).unwrap();
            ledger.create_asset(quote, 0).unwrap();
            let engine = MatchingEngine::new(ledger.clone(), Arc::new(ManualClock::new(1_000)));
            Self {
                ledger,
                engine,
                base,
                quote,
                base_mint,
            }
        }
    }

    #[test]
    fn test_create_market_validation() {
        let fx = Fixture::new();
        assert_matches!(
            fx.engine.create_market(&fx.base, &fx.base),
            Err(MatchingError::InvalidMint(_))
        );
        let unknown = Address::from_label("unknown");
        assert_matches!(
            fx.engine.create_market(&fx.base, &unknown),
            Err(MatchingError::InvalidMint(a)) if a == unknown
        );

        let market = fx.engine.create_market(&fx.base, &fx.quote).unwrap();
        assert_eq!(market.next_order_id, 0);
        assert_matches!(
            fx.engine.create_market(&fx.base, &fx.quote),
            Err(MatchingError::MarketAlreadyExists(_))
        );
        // The reversed pair is a different market
        fx.engine.create_market(&fx.quote, &fx.base).unwrap();
        assert_eq!(fx.engine.markets().len(), 2);
        assert_eq!(fx.engine.find_market(&fx.base, &fx.quote), Some(market));
    }

    #[test]
    fn test_place_order_rejects_bad_input_without_side_effects() {
        let fx = Fixture::new();
        let market = fx.engine.create_market(&fx.base, &fx.quote).unwrap();
        let maker = Signer::new(Address::from_label("maker"));

        assert_matches!(
            fx.engine.place_order(&market.address, &maker, OrderSide::Sell, 0, 1, &fx.base),
            Err(MatchingError::InvalidPrice)
        );
        assert_matches!(
            fx.engine.place_order(&market.address, &maker, OrderSide::Sell, 1, 0, &fx.base),
            Err(MatchingError::InvalidAmount)
        );
        assert_matches!(
            fx.engine.place_order(&market.address, &maker, OrderSide::Sell, 1, 1, &fx.quote),
            Err(MatchingError::InvalidMint(_))
        );
        assert_matches!(
            fx.engine.place_order(&market.address, &maker, OrderSide::Sell, 1, 1, &fx.base),
            Err(MatchingError::InsufficientBalance { available: 0, required: 1, .. })
        );

        let market = fx.engine.market(&market.address).unwrap();
        assert_eq!(market.next_order_id, 0);
        assert_eq!(market.total_orders_placed, 0);
        let escrow = Order::escrow_for(&Order::address_for(&market.address, 0));
        assert_matches!(fx.ledger.balance_of(&escrow), Err(LedgerError::AccountNotFound(_)));
    }

    #[test]
    fn test_taken_order_address_is_rejected_before_escrow() {
        let fx = Fixture::new();
        let market = fx.engine.create_market(&fx.base, &fx.quote).unwrap();
        let maker = Signer::new(Address::from_label("maker"));
        let source = fx.ledger.open_holder_account(&maker.address(), &fx.base).unwrap();
        fx.ledger.mint(&fx.base_mint, &source, 50).unwrap();

        let first = fx
            .engine
            .place_order(&market.address, &maker, OrderSide::Sell, 2, 20, &fx.base)
            .unwrap();
        // Rewind the id counter so the next placement derives a taken address
        fx.engine.markets.get(&market.address).unwrap().lock().next_order_id = 0;

        assert_matches!(
            fx.engine.place_order(&market.address, &maker, OrderSide::Sell, 3, 10, &fx.base),
            Err(MatchingError::OrderAlreadyExists(a)) if a == first.address
        );
        assert_eq!(fx.ledger.balance_of(&source).unwrap(), 30);
        assert_eq!(fx.ledger.balance_of(&first.escrow_vault).unwrap(), 20);
        assert_eq!(fx.engine.order(&market.address, 0).unwrap(), first);
        assert_eq!(fx.engine.market(&market.address).unwrap().total_orders_placed, 1);
        assert_eq!(fx.engine.events_since(0).len(), 2);
    }

    #[test]
    fn test_unknown_records() {
        let fx = Fixture::new();
        let missing = Address::from_label("missing");
        let taker = Signer::new(Address::from_label("taker"));
        assert_matches!(
            fx.engine.fill_order(&missing, 0, &taker, 1),
            Err(MatchingError::MarketNotFound(_))
        );
        let market = fx.engine.create_market(&fx.base, &fx.quote).unwrap();
        assert_matches!(
            fx.engine.fill_order(&market.address, 7, &taker, 1),
            Err(MatchingError::OrderNotFound { order_id: 7, .. })
        );
        assert_matches!(
            fx.engine.cancel_order(&market.address, 7, &taker),
            Err(MatchingError::OrderNotFound { .. })
        );
    }
}
