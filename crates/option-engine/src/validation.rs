//! Precondition checks shared by the lifecycle operations

use crate::error::OptionError;
use crate::series::{Series, SeriesParams};
use crate::Result;

pub fn validate_params(params: &SeriesParams, now: i64) -> Result<()> {
    if params.strike_price == 0 {
        return Err(OptionError::InvalidStrikePrice);
    }
    if params.expiry <= now {
        return Err(OptionError::ExpirationInPast {
            expiry: params.expiry,
            now,
        });
    }
    Ok(())
}

pub fn require_amount(amount: u64) -> Result<()> {
    if amount == 0 {
        return Err(OptionError::InvalidAmount);
    }
    Ok(())
}

pub fn require_active(series: &Series, now: i64) -> Result<()> {
    if series.is_expired(now) {
        return Err(OptionError::OptionExpired {
            expiry: series.expiry,
            now,
        });
    }
    Ok(())
}

pub fn require_expired(series: &Series, now: i64) -> Result<()> {
    if !series.is_expired(now) {
        return Err(OptionError::OptionNotExpired {
            expiry: series.expiry,
            now,
        });
    }
    Ok(())
}

/// Redemption units outstanding, or `NoTokensIssued` when there are none
pub fn require_outstanding(series: &Series) -> Result<u64> {
    match series.outstanding() {
        Some(0) => Err(OptionError::NoTokensIssued(series.address)),
        Some(outstanding) => Ok(outstanding),
        None => Err(OptionError::MathOverflow("outstanding supply")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use common::Address;

    fn params(expiry: i64) -> SeriesParams {
        SeriesParams {
            underlying_asset: Address::from_label("sol"),
            consideration_asset: Address::from_label("usdc"),
            strike_price: 10,
            expiry,
            is_put: false,
        }
    }

    #[test]
    fn test_validate_params() {
        assert!(validate_params(&params(101), 100).is_ok());
        assert_matches!(
            validate_params(&params(100), 100),
            Err(OptionError::ExpirationInPast { expiry: 100, now: 100 })
        );
        let mut zero_strike = params(101);
        zero_strike.strike_price = 0;
        assert_matches!(
            validate_params(&zero_strike, 100),
            Err(OptionError::InvalidStrikePrice)
        );
    }

    #[test]
    fn test_expiry_windows_are_exclusive() {
        let series = Series::new(&params(100), 0);
        assert!(require_active(&series, 99).is_ok());
        assert_matches!(require_active(&series, 100), Err(OptionError::OptionExpired { .. }));
        assert!(require_expired(&series, 100).is_ok());
        assert_matches!(
            require_expired(&series, 99),
            Err(OptionError::OptionNotExpired { .. })
        );
    }

    #[test]
    fn test_require_outstanding() {
        let mut series = Series::new(&params(100), 0);
        assert_matches!(require_outstanding(&series), Err(OptionError::NoTokensIssued(_)));
        series.total_supply = 10;
        series.redeemed_amount = 4;
        assert_eq!(require_outstanding(&series).unwrap(), 6);
    }
}
