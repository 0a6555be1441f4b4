//! Domain types for the Option Engine

use common::{derive, tags, Address};
use serde::{Deserialize, Serialize};

// ============================================================================
// Series Params
// ============================================================================

/// The distinguishing tuple of a series
///
/// Two series with equal params are the same series: they derive the same
/// address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesParams {
    /// Asset locked as collateral and delivered on exercise
    pub underlying_asset: Address,
    /// Asset paid by the exerciser
    pub consideration_asset: Address,
    /// Consideration per whole unit of underlying, in consideration base units
    pub strike_price: u64,
    /// Unix timestamp at which the series expires
    pub expiry: i64,
    /// Descriptive flag; puts are written by choosing the underlying accordingly
    pub is_put: bool,
}

impl SeriesParams {
    /// Canonical series address for these params
    pub fn address(&self) -> Address {
        derive(
            tags::OPTION_SERIES,
            &self.underlying_asset,
            &[
                self.consideration_asset.as_bytes(),
                &self.strike_price.to_le_bytes(),
                &self.expiry.to_le_bytes(),
                &[u8::from(self.is_put)],
            ],
        )
    }
}

// ============================================================================
// Series
// ============================================================================

/// One option contract specification plus its live counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    /// Derived series address
    pub address: Address,
    pub underlying_asset: Address,
    pub consideration_asset: Address,
    pub strike_price: u64,
    pub expiry: i64,
    pub is_put: bool,
    /// Option asset class (mint address)
    pub option_asset: Address,
    /// Redemption asset class (mint address)
    pub redemption_asset: Address,
    /// Custody account holding underlying
    pub collateral_vault: Address,
    /// Custody account holding consideration paid by exercisers
    pub consideration_vault: Address,
    /// Units minted minus units burned in pairs
    pub total_supply: u64,
    /// Option units exercised
    pub exercised_amount: u64,
    /// Redemption units settled after expiry
    pub redeemed_amount: u64,
    /// Consideration withdrawn early through claims; never decreases
    pub total_consideration_withdrawn: u64,
    /// Part of the early withdrawals already netted out of redemptions
    pub consideration_settled: u64,
    /// Unix timestamp of creation
    pub created_at: i64,
}

impl Series {
    pub(crate) fn new(params: &SeriesParams, created_at: i64) -> Self {
        let address = params.address();
        Self {
            address,
            underlying_asset: params.underlying_asset,
            consideration_asset: params.consideration_asset,
            strike_price: params.strike_price,
            expiry: params.expiry,
            is_put: params.is_put,
            option_asset: derive(tags::OPTION_MINT, &address, &[]),
            redemption_asset: derive(tags::REDEMPTION_MINT, &address, &[]),
            collateral_vault: derive(tags::COLLATERAL_VAULT, &address, &[]),
            consideration_vault: derive(tags::CONSIDERATION_VAULT, &address, &[]),
            total_supply: 0,
            exercised_amount: 0,
            redeemed_amount: 0,
            total_consideration_withdrawn: 0,
            consideration_settled: 0,
            created_at,
        }
    }

    pub fn params(&self) -> SeriesParams {
        SeriesParams {
            underlying_asset: self.underlying_asset,
            consideration_asset: self.consideration_asset,
            strike_price: self.strike_price,
            expiry: self.expiry,
            is_put: self.is_put,
        }
    }

    /// Whether `now` is at or past expiry
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expiry
    }

    /// Redemption units still outstanding: the pro-rata denominator
    pub fn outstanding(&self) -> Option<u64> {
        self.total_supply.checked_sub(self.redeemed_amount)
    }

    /// Consideration owed to the outstanding redemption units
    ///
    /// The vault balance plus early withdrawals not yet netted out of a
    /// redemption. Pro-rata shares are taken of this pool, so a claim by one
    /// holder never shrinks another holder's entitlement.
    pub fn consideration_pool(&self, vault_balance: u64) -> Option<u64> {
        self.total_consideration_withdrawn
            .checked_sub(self.consideration_settled)?
            .checked_add(vault_balance)
    }
}

// ============================================================================
// Consideration Claim
// ============================================================================

/// Consideration a holder has already withdrawn before expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsiderationClaim {
    /// Derived claim address
    pub address: Address,
    pub series: Address,
    pub holder: Address,
    /// Cumulative amount withdrawn; never decreases
    pub amount_withdrawn: u64,
    /// Part of `amount_withdrawn` already deducted from redemption payouts
    pub amount_settled: u64,
}

impl ConsiderationClaim {
    pub(crate) fn new(series: Address, holder: Address) -> Self {
        Self {
            address: derive(tags::CONSIDERATION_CLAIM, &series, &[holder.as_bytes()]),
            series,
            holder,
            amount_withdrawn: 0,
            amount_settled: 0,
        }
    }

    /// Withdrawals not yet deducted from a redemption
    pub fn unsettled(&self) -> u64 {
        self.amount_withdrawn.saturating_sub(self.amount_settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SeriesParams {
        SeriesParams {
            underlying_asset: Address::from_label("sol"),
            consideration_asset: Address::from_label("usdc"),
            strike_price: 4_000_000,
            expiry: 10_000,
            is_put: false,
        }
    }

    #[test]
    fn test_every_param_distinguishes_the_address() {
        let base = params();
        let mut other = base;
        other.strike_price += 1;
        assert_ne!(base.address(), other.address());

        let mut other = base;
        other.expiry += 1;
        assert_ne!(base.address(), other.address());

        let mut other = base;
        other.is_put = true;
        assert_ne!(base.address(), other.address());

        let mut other = base;
        other.consideration_asset = Address::from_label("usdt");
        assert_ne!(base.address(), other.address());
    }

    #[test]
    fn test_new_series_derives_distinct_children() {
        let series = Series::new(&params(), 1);
        let children = [
            series.option_asset,
            series.redemption_asset,
            series.collateral_vault,
            series.consideration_vault,
        ];
        for (i, a) in children.iter().enumerate() {
            assert_ne!(*a, series.address);
            for b in &children[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(series.params(), params());
        assert_eq!(series.outstanding(), Some(0));
    }

    #[test]
    fn test_consideration_pool_counts_unsettled_withdrawals() {
        let mut series = Series::new(&params(), 1);
        assert_eq!(series.consideration_pool(40), Some(40));
        series.total_consideration_withdrawn = 60;
        assert_eq!(series.consideration_pool(40), Some(100));
        series.consideration_settled = 25;
        assert_eq!(series.consideration_pool(40), Some(75));
        series.consideration_settled = 61;
        assert_eq!(series.consideration_pool(40), None);

        let mut claim = ConsiderationClaim::new(series.address, Address::from_label("alice"));
        claim.amount_withdrawn = 30;
        claim.amount_settled = 10;
        assert_eq!(claim.unsettled(), 20);
    }

    #[test]
    fn test_expiry_boundary() {
        let series = Series::new(&params(), 1);
        assert!(!series.is_expired(9_999));
        assert!(series.is_expired(10_000));
    }
}
