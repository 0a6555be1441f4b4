//! Order Matching Engine for optx
//!
//! A permissionless limit order book where every resting order is backed by
//! its own escrow account.
//!
//! - **Makers** place orders. The full notional of the side they give up is
//!   moved into a per-order escrow at placement.
//! - **Takers** fill any open order for any size up to its remainder. They
//!   receive from escrow and pay the counter-asset straight to the maker's
//!   holder account, so a fill can never leave the maker unpaid.
//! - **Owners** can cancel an open order at any time and get back whatever
//!   the escrow still holds.
//!
//! Orders are not matched against each other; the taker picks the order.

pub mod domain;
pub mod engine;
pub mod error;
pub mod event;
pub mod registry;
pub mod result;

pub use domain::{BookSnapshot, Market, Order, OrderSide, OrderStatus, PriceLevel};
pub use engine::MatchingEngine;
pub use error::MatchingError;
pub use event::MatchingEvent;
pub use result::{CancelResult, FillResult};

/// Result type for matching operations
pub type Result<T> = std::result::Result<T, MatchingError>;
