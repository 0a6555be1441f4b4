//! Common types and utilities for optx
//!
//! This crate provides the pieces shared by the option lifecycle engine and
//! the order matching engine.
//!
//! # Modules
//!
//! - [`address`] - Deterministic 32-byte identifiers and the sub-account deriver
//! - [`clock`] - Platform clock used for every expiry comparison
//! - [`log`] - Sequenced in-memory event log
//! - [`error`] - Common error types

pub mod address;
pub mod clock;
pub mod error;
pub mod log;

pub use address::{derive, tags, Address};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use error::{Error, Result};
pub use log::{EventLog, Sequenced};
