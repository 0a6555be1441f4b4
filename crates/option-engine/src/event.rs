//! Option engine events
//!
//! One event is appended per successful operation.

use common::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptionEvent {
    SeriesCreated {
        series: Address,
        underlying_asset: Address,
        consideration_asset: Address,
        strike_price: u64,
        expiry: i64,
        is_put: bool,
    },
    OptionsMinted {
        series: Address,
        writer: Address,
        amount: u64,
        total_supply: u64,
    },
    OptionsExercised {
        series: Address,
        holder: Address,
        amount: u64,
        strike_payment: u64,
    },
    RedemptionSettled {
        series: Address,
        holder: Address,
        amount: u64,
        underlying_payout: u64,
        consideration_payout: u64,
    },
    ConsiderationClaimed {
        series: Address,
        holder: Address,
        amount: u64,
        total_withdrawn: u64,
    },
    PairBurned {
        series: Address,
        holder: Address,
        amount: u64,
        total_supply: u64,
    },
}

impl OptionEvent {
    /// Series the event belongs to
    pub fn series(&self) -> Address {
        match self {
            OptionEvent::SeriesCreated { series, .. }
            | OptionEvent::OptionsMinted { series, .. }
            | OptionEvent::OptionsExercised { series, .. }
            | OptionEvent::RedemptionSettled { series, .. }
            | OptionEvent::ConsiderationClaimed { series, .. }
            | OptionEvent::PairBurned { series, .. } => *series,
        }
    }
}
