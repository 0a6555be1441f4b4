//! Option Engine for optx
//!
//! Fully collateralized American-style options on arbitrary fungible assets.
//!
//! A [`Series`] is created once per (underlying, consideration, strike,
//! expiry, kind) tuple. It owns two custody vaults and two derived asset
//! classes:
//!
//! - the **option asset**, exercisable before expiry for one unit of
//!   underlying at the strike price;
//! - the **redemption asset**, a pro-rata claim on whatever the two vaults
//!   hold, withdrawable incrementally before expiry (consideration only) and
//!   in full after expiry.
//!
//! # Operations
//!
//! | operation | window | effect |
//! |---|---|---|
//! | [`OptionEngine::mint`] | pre-expiry | lock underlying, issue both assets |
//! | [`OptionEngine::exercise`] | pre-expiry | burn option, pay strike, take underlying |
//! | [`OptionEngine::redeem`] | post-expiry | burn redemption, take pro-rata of both vaults |
//! | [`OptionEngine::redeem_consideration`] | pre-expiry | take unclaimed pro-rata consideration |
//! | [`OptionEngine::burn`] | any time | burn one of each, take underlying 1:1 |

pub mod engine;
pub mod error;
pub mod event;
pub mod math;
pub mod receipt;
pub mod registry;
pub mod series;
pub mod validation;

pub use engine::OptionEngine;
pub use error::OptionError;
pub use event::OptionEvent;
pub use receipt::{BurnReceipt, ClaimReceipt, ExerciseReceipt, MintReceipt, RedeemReceipt};
pub use series::{ConsiderationClaim, Series, SeriesParams};

/// Result type for option engine operations
pub type Result<T> = std::result::Result<T, OptionError>;
