//! Operation receipts
//!
//! Returned to the caller on success; they repeat the amounts that moved so
//! callers do not need to re-read balances.

use common::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub series: Address,
    pub writer: Address,
    pub amount: u64,
    pub total_supply: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseReceipt {
    pub series: Address,
    pub holder: Address,
    pub amount: u64,
    /// Consideration paid into the consideration vault
    pub strike_payment: u64,
    pub exercised_amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemReceipt {
    pub series: Address,
    pub holder: Address,
    pub amount: u64,
    pub underlying_payout: u64,
    pub consideration_payout: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub series: Address,
    pub holder: Address,
    /// Paid out by this call
    pub claimed: u64,
    /// Holder's cumulative withdrawals after this call
    pub total_withdrawn: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnReceipt {
    pub series: Address,
    pub holder: Address,
    pub amount: u64,
    pub total_supply: u64,
}
