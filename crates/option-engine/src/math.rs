//! Checked settlement arithmetic
//!
//! All results truncate toward zero. Intermediates are `u128`, so the only
//! failure is a result that does not fit back into `u64`.

use crate::error::OptionError;
use crate::Result;

/// Consideration owed for exercising `amount` units
///
/// `floor(amount * strike_price / 10^underlying_decimals)`
pub fn strike_payment(amount: u64, strike_price: u64, underlying_decimals: u8) -> Result<u64> {
    let scale = 10u128
        .checked_pow(u32::from(underlying_decimals))
        .ok_or(OptionError::MathOverflow("strike scale"))?;
    let payment = u128::from(amount)
        .checked_mul(u128::from(strike_price))
        .ok_or(OptionError::MathOverflow("strike payment"))?
        / scale;
    u64::try_from(payment).map_err(|_| OptionError::MathOverflow("strike payment"))
}

/// `floor(balance * share / outstanding)`
///
/// Callers guard `outstanding == 0` with `NoTokensIssued` before calling.
pub fn pro_rata(balance: u64, share: u64, outstanding: u64) -> Result<u64> {
    if outstanding == 0 {
        return Err(OptionError::MathOverflow("pro-rata denominator"));
    }
    let payout = u128::from(balance)
        .checked_mul(u128::from(share))
        .ok_or(OptionError::MathOverflow("pro-rata payout"))?
        / u128::from(outstanding);
    u64::try_from(payout).map_err(|_| OptionError::MathOverflow("pro-rata payout"))
}
