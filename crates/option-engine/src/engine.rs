//! Option Lifecycle Engine
//!
//! Every operation follows the same shape:
//!
//! 1. look up the series entry and lock it;
//! 2. check preconditions and snapshot the balances the payouts depend on;
//! 3. compute payouts and new counters with checked arithmetic;
//! 4. commit one ledger transaction;
//! 5. write the counters back and append an event.
//!
//! Nothing is written before step 4, so any error leaves the series and
//! the ledger exactly as they were.

use std::collections::HashMap;
use std::sync::Arc;

use common::{Address, EventLog, Sequenced, SharedClock};
use ledger::{holder_account_address, Authority, LedgerError, SharedLedger, Signer, Transaction};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::OptionError;
use crate::event::OptionEvent;
use crate::math::{pro_rata, strike_payment};
use crate::receipt::{BurnReceipt, ClaimReceipt, ExerciseReceipt, MintReceipt, RedeemReceipt};
use crate::registry::{SeriesEntry, SeriesRegistry};
use crate::series::{ConsiderationClaim, Series, SeriesParams};
use crate::validation::{
    require_active, require_amount, require_expired, require_outstanding, validate_params,
};
use crate::Result;

/// Option Series Registry and Lifecycle Engine
pub struct OptionEngine {
    ledger: SharedLedger,
    clock: SharedClock,
    registry: SeriesRegistry,
    event_log: Mutex<EventLog<OptionEvent>>,
}

impl OptionEngine {
    pub fn new(ledger: SharedLedger, clock: SharedClock) -> Self {
        Self {
            ledger,
            clock,
            registry: SeriesRegistry::new(),
            event_log: Mutex::new(EventLog::new()),
        }
    }

    // ========================================================================
    // Series creation
    // ========================================================================

    /// Create a series, its two vaults and its two asset classes
    pub fn create_series(&self, params: SeriesParams) -> Result<Series> {
        let now = self.clock.unix_timestamp();
        validate_params(&params, now)?;

        let address = params.address();
        // Held for the whole creation so two racing creates cannot both
        // open vaults for the same series.
        let mut entries = self.registry.write();
        if entries.contains_key(&address) {
            return Err(OptionError::SeriesAlreadyExists(address));
        }

        let decimals = self.ledger.decimals(&params.underlying_asset)?;
        self.ledger.decimals(&params.consideration_asset)?;

        let series = Series::new(&params, now);
        let option_mint = self.ledger.create_asset(series.option_asset, decimals)?;
        let redemption_mint = self
            .ledger
            .create_asset(series.redemption_asset, decimals)?;
        let collateral_vault = self
            .ledger
            .open_sub_account(series.collateral_vault, &series.underlying_asset)?;
        let consideration_vault = self
            .ledger
            .open_sub_account(series.consideration_vault, &series.consideration_asset)?;

        entries.insert(
            address,
            Arc::new(Mutex::new(SeriesEntry {
                series: series.clone(),
                option_mint,
                redemption_mint,
                collateral_vault,
                consideration_vault,
                claims: HashMap::new(),
            })),
        );
        drop(entries);

        self.record(
            now,
            OptionEvent::SeriesCreated {
                series: address,
                underlying_asset: series.underlying_asset,
                consideration_asset: series.consideration_asset,
                strike_price: series.strike_price,
                expiry: series.expiry,
                is_put: series.is_put,
            },
        );
        info!(
            series = %address.short(),
            strike_price = series.strike_price,
            expiry = series.expiry,
            is_put = series.is_put,
            "Series created"
        );
        Ok(series)
    }

    // ========================================================================
    // Lifecycle operations
    // ========================================================================

    /// Lock `amount` underlying and issue `amount` of both derived assets
    pub fn mint(&self, series: &Address, writer: &Signer, amount: u64) -> Result<MintReceipt> {
        require_amount(amount)?;
        let entry = self.registry.get(series)?;
        let mut guard = entry.lock();
        let now = self.clock.unix_timestamp();
        let snapshot = guard.series.clone();
        require_active(&snapshot, now)?;

        let owner = writer.address();
        let underlying_account = self.require_balance(&owner, &snapshot.underlying_asset, amount)?;
        let total_supply = snapshot
            .total_supply
            .checked_add(amount)
            .ok_or(OptionError::MathOverflow("total supply"))?;
        let option_account = self
            .ledger
            .open_holder_account(&owner, &snapshot.option_asset)?;
        let redemption_account = self
            .ledger
            .open_holder_account(&owner, &snapshot.redemption_asset)?;

        let tx = Transaction::new()
            .transfer(
                snapshot.underlying_asset,
                underlying_account,
                snapshot.collateral_vault,
                amount,
                Authority::Holder(writer),
            )
            .mint(&guard.option_mint, option_account, amount)
            .mint(&guard.redemption_mint, redemption_account, amount);
        self.ledger.commit(tx)?;

        guard.series.total_supply = total_supply;
        drop(guard);

        self.record(
            now,
            OptionEvent::OptionsMinted {
                series: *series,
                writer: owner,
                amount,
                total_supply,
            },
        );
        info!(series = %series.short(), writer = %owner.short(), amount, total_supply, "Options minted");
        Ok(MintReceipt {
            series: *series,
            writer: owner,
            amount,
            total_supply,
        })
    }

    /// Burn `amount` option units, pay the strike and take the underlying
    pub fn exercise(
        &self,
        series: &Address,
        holder: &Signer,
        amount: u64,
    ) -> Result<ExerciseReceipt> {
        require_amount(amount)?;
        let entry = self.registry.get(series)?;
        let mut guard = entry.lock();
        let now = self.clock.unix_timestamp();
        let snapshot = guard.series.clone();
        require_active(&snapshot, now)?;

        let owner = holder.address();
        let option_account = self.require_balance(&owner, &snapshot.option_asset, amount)?;

        let collateral = self.ledger.balance_of(&snapshot.collateral_vault)?;
        if collateral < amount {
            return Err(OptionError::InsufficientCollateral {
                available: collateral,
                required: amount,
            });
        }

        let decimals = self.ledger.decimals(&snapshot.underlying_asset)?;
        let payment = strike_payment(amount, snapshot.strike_price, decimals)?;
        if payment == 0 {
            return Err(OptionError::StrikePaymentTooSmall { amount });
        }
        let consideration_account =
            self.require_balance(&owner, &snapshot.consideration_asset, payment)?;
        let exercised_amount = snapshot
            .exercised_amount
            .checked_add(amount)
            .ok_or(OptionError::MathOverflow("exercised amount"))?;
        debug!(series = %series.short(), amount, payment, collateral, "Exercise computed");

        let underlying_account = self
            .ledger
            .open_holder_account(&owner, &snapshot.underlying_asset)?;
        let tx = Transaction::new()
            .burn(
                snapshot.option_asset,
                option_account,
                amount,
                Authority::Holder(holder),
            )
            .transfer(
                snapshot.consideration_asset,
                consideration_account,
                snapshot.consideration_vault,
                payment,
                Authority::Holder(holder),
            )
            .transfer(
                snapshot.underlying_asset,
                snapshot.collateral_vault,
                underlying_account,
                amount,
                guard.collateral_vault.as_authority(),
            );
        self.ledger.commit(tx)?;

        guard.series.exercised_amount = exercised_amount;
        drop(guard);

        self.record(
            now,
            OptionEvent::OptionsExercised {
                series: *series,
                holder: owner,
                amount,
                strike_payment: payment,
            },
        );
        info!(series = %series.short(), holder = %owner.short(), amount, strike_payment = payment, "Options exercised");
        Ok(ExerciseReceipt {
            series: *series,
            holder: owner,
            amount,
            strike_payment: payment,
            exercised_amount,
        })
    }

    /// After expiry, burn `amount` redemption units for a pro-rata share of
    /// both vaults
    pub fn redeem(&self, series: &Address, holder: &Signer, amount: u64) -> Result<RedeemReceipt> {
        require_amount(amount)?;
        let entry = self.registry.get(series)?;
        let mut guard = entry.lock();
        let now = self.clock.unix_timestamp();
        let snapshot = guard.series.clone();
        require_expired(&snapshot, now)?;
        let outstanding = require_outstanding(&snapshot)?;

        let owner = holder.address();
        let redemption_account = self.require_balance(&owner, &snapshot.redemption_asset, amount)?;
        let shorts = self.ledger.balance_of(&redemption_account)?;

        let collateral = self.ledger.balance_of(&snapshot.collateral_vault)?;
        let consideration = self.ledger.balance_of(&snapshot.consideration_vault)?;
        let pool = snapshot
            .consideration_pool(consideration)
            .ok_or(OptionError::MathOverflow("consideration pool"))?;
        let underlying_payout = pro_rata(collateral, amount, outstanding)?;

        // Early claims are an advance on this holder's share: the part of
        // them carried by the redeemed units is deducted from the payout.
        let unsettled = guard.claims.get(&owner).map_or(0, |c| c.unsettled());
        let settled = pro_rata(unsettled, amount, shorts)?;
        let consideration_payout = pro_rata(pool, amount, outstanding)?
            .saturating_sub(settled)
            .min(consideration);

        let redeemed_amount = snapshot
            .redeemed_amount
            .checked_add(amount)
            .ok_or(OptionError::MathOverflow("redeemed amount"))?;
        let consideration_settled = snapshot
            .consideration_settled
            .checked_add(settled)
            .ok_or(OptionError::MathOverflow("consideration settled"))?;
        debug!(
            series = %series.short(),
            collateral,
            consideration,
            pool,
            outstanding,
            settled,
            underlying_payout,
            consideration_payout,
            "Redemption computed"
        );

        let mut tx = Transaction::new().burn(
            snapshot.redemption_asset,
            redemption_account,
            amount,
            Authority::Holder(holder),
        );
        if underlying_payout > 0 {
            let to = self
                .ledger
                .open_holder_account(&owner, &snapshot.underlying_asset)?;
            tx = tx.transfer(
                snapshot.underlying_asset,
                snapshot.collateral_vault,
                to,
                underlying_payout,
                guard.collateral_vault.as_authority(),
            );
        }
        if consideration_payout > 0 {
            let to = self
                .ledger
                .open_holder_account(&owner, &snapshot.consideration_asset)?;
            tx = tx.transfer(
                snapshot.consideration_asset,
                snapshot.consideration_vault,
                to,
                consideration_payout,
                guard.consideration_vault.as_authority(),
            );
        }
        self.ledger.commit(tx)?;

        if settled > 0 {
            if let Some(claim) = guard.claims.get_mut(&owner) {
                claim.amount_settled += settled;
            }
        }
        guard.series.redeemed_amount = redeemed_amount;
        guard.series.consideration_settled = consideration_settled;
        drop(guard);

        self.record(
            now,
            OptionEvent::RedemptionSettled {
                series: *series,
                holder: owner,
                amount,
                underlying_payout,
                consideration_payout,
            },
        );
        info!(
            series = %series.short(),
            holder = %owner.short(),
            amount,
            underlying_payout,
            consideration_payout,
            "Redemption settled"
        );
        Ok(RedeemReceipt {
            series: *series,
            holder: owner,
            amount,
            underlying_payout,
            consideration_payout,
        })
    }

    /// Before expiry, withdraw the holder's unclaimed share of consideration
    ///
    /// The entitlement is the holder's pro-rata share of everything paid in
    /// so far (vault balance plus earlier withdrawals), recomputed on every
    /// call. What was already withdrawn is subtracted, never re-granted, and
    /// other holders' claims do not change it.
    pub fn redeem_consideration(&self, series: &Address, holder: &Signer) -> Result<ClaimReceipt> {
        let entry = self.registry.get(series)?;
        let mut guard = entry.lock();
        let now = self.clock.unix_timestamp();
        let snapshot = guard.series.clone();
        require_active(&snapshot, now)?;

        let owner = holder.address();
        let (_, shorts) = self.holder_balance(&owner, &snapshot.redemption_asset)?;
        if shorts == 0 {
            return Err(OptionError::NoShortTokens(owner));
        }
        let outstanding = require_outstanding(&snapshot)?;

        let consideration = self.ledger.balance_of(&snapshot.consideration_vault)?;
        let pool = snapshot
            .consideration_pool(consideration)
            .ok_or(OptionError::MathOverflow("consideration pool"))?;
        let entitlement = pro_rata(pool, shorts, outstanding)?;
        let withdrawn = guard
            .claims
            .get(&owner)
            .map(|c| c.amount_withdrawn)
            .unwrap_or(0);
        let claimable = entitlement.saturating_sub(withdrawn).min(consideration);
        debug!(
            series = %series.short(),
            holder = %owner.short(),
            consideration,
            pool,
            shorts,
            entitlement,
            withdrawn,
            "Consideration entitlement computed"
        );
        if claimable == 0 {
            return Err(OptionError::NoClaimableConsideration(owner));
        }

        let total_withdrawn = withdrawn
            .checked_add(claimable)
            .ok_or(OptionError::MathOverflow("claim withdrawn"))?;
        let series_withdrawn = snapshot
            .total_consideration_withdrawn
            .checked_add(claimable)
            .ok_or(OptionError::MathOverflow("total consideration withdrawn"))?;

        let to = self
            .ledger
            .open_holder_account(&owner, &snapshot.consideration_asset)?;
        let tx = Transaction::new().transfer(
            snapshot.consideration_asset,
            snapshot.consideration_vault,
            to,
            claimable,
            guard.consideration_vault.as_authority(),
        );
        self.ledger.commit(tx)?;

        guard
            .claims
            .entry(owner)
            .or_insert_with(|| ConsiderationClaim::new(*series, owner))
            .amount_withdrawn = total_withdrawn;
        guard.series.total_consideration_withdrawn = series_withdrawn;
        drop(guard);

        self.record(
            now,
            OptionEvent::ConsiderationClaimed {
                series: *series,
                holder: owner,
                amount: claimable,
                total_withdrawn,
            },
        );
        info!(
            series = %series.short(),
            holder = %owner.short(),
            claimed = claimable,
            total_withdrawn,
            "Consideration claimed"
        );
        Ok(ClaimReceipt {
            series: *series,
            holder: owner,
            claimed: claimable,
            total_withdrawn,
        })
    }

    /// Burn `amount` of both derived assets and take back `amount` underlying
    pub fn burn(&self, series: &Address, holder: &Signer, amount: u64) -> Result<BurnReceipt> {
        require_amount(amount)?;
        let entry = self.registry.get(series)?;
        let mut guard = entry.lock();
        let now = self.clock.unix_timestamp();
        let snapshot = guard.series.clone();

        let owner = holder.address();
        let option_account = self.require_balance(&owner, &snapshot.option_asset, amount)?;
        let redemption_account = self.require_balance(&owner, &snapshot.redemption_asset, amount)?;

        let collateral = self.ledger.balance_of(&snapshot.collateral_vault)?;
        if collateral < amount {
            return Err(OptionError::InsufficientCollateral {
                available: collateral,
                required: amount,
            });
        }
        let total_supply = snapshot
            .total_supply
            .checked_sub(amount)
            .ok_or(OptionError::MathOverflow("total supply"))?;

        let underlying_account = self
            .ledger
            .open_holder_account(&owner, &snapshot.underlying_asset)?;
        let tx = Transaction::new()
            .burn(
                snapshot.option_asset,
                option_account,
                amount,
                Authority::Holder(holder),
            )
            .burn(
                snapshot.redemption_asset,
                redemption_account,
                amount,
                Authority::Holder(holder),
            )
            .transfer(
                snapshot.underlying_asset,
                snapshot.collateral_vault,
                underlying_account,
                amount,
                guard.collateral_vault.as_authority(),
            );
        self.ledger.commit(tx)?;

        guard.series.total_supply = total_supply;
        drop(guard);

        self.record(
            now,
            OptionEvent::PairBurned {
                series: *series,
                holder: owner,
                amount,
                total_supply,
            },
        );
        info!(series = %series.short(), holder = %owner.short(), amount, total_supply, "Option pair burned");
        Ok(BurnReceipt {
            series: *series,
            holder: owner,
            amount,
            total_supply,
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn series(&self, address: &Address) -> Result<Series> {
        let entry = self.registry.get(address)?;
        let series = entry.lock().series.clone();
        Ok(series)
    }

    /// Look a series up by its distinguishing params
    pub fn find_series(&self, params: &SeriesParams) -> Option<Series> {
        self.series(&params.address()).ok()
    }

    pub fn series_addresses(&self) -> Vec<Address> {
        self.registry.addresses()
    }

    pub fn series_count(&self) -> usize {
        self.registry.len()
    }

    /// Claim record of `holder`, if they have ever withdrawn
    pub fn claim(&self, series: &Address, holder: &Address) -> Result<Option<ConsiderationClaim>> {
        let entry = self.registry.get(series)?;
        let claim = entry.lock().claims.get(holder).cloned();
        Ok(claim)
    }

    pub fn events_since(&self, sequence: u64) -> Vec<Sequenced<OptionEvent>> {
        self.event_log.lock().get_from(sequence)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Holder account and balance; a missing account reads as zero
    fn holder_balance(&self, owner: &Address, asset: &Address) -> Result<(Address, u64)> {
        let account = holder_account_address(owner, asset);
        match self.ledger.balance_of(&account) {
            Ok(balance) => Ok((account, balance)),
            Err(LedgerError::AccountNotFound(_)) => Ok((account, 0)),
            Err(e) => Err(e.into()),
        }
    }

    fn require_balance(&self, owner: &Address, asset: &Address, required: u64) -> Result<Address> {
        let (account, available) = self.holder_balance(owner, asset)?;
        if available < required {
            return Err(OptionError::InsufficientBalance {
                account,
                available,
                required,
            });
        }
        Ok(account)
    }

    fn record(&self, timestamp: i64, event: OptionEvent) {
        self.event_log.lock().append(timestamp, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use common::ManualClock;
    use ledger::{AssetLedger, InMemoryLedger, MintAuthority};

    const NOW: i64 = 1_700_000_000;

    struct Fixture {
        ledger: Arc<InMemoryLedger>,
        clock: Arc<ManualClock>,
        engine: OptionEngine,
        underlying: Address,
        consideration: Address,
        underlying_mint: MintAuthority,
        consideration_mint: MintAuthority,
    }

    impl Fixture {
        fn new() -> Self {
            let ledger = Arc::new(InMemoryLedger::new());
            let clock = Arc::new(ManualClock::new(NOW));
            let underlying = Address::from_label("sol");
            let consideration = Address::from_label("usdc");
            let underlying_mint = ledger.create_asset(underlying, 5).unwrap();
            let consideration_mint = ledger.create_asset(consideration, 6).unwrap();
            let engine = OptionEngine::new(ledger.clone(), clock.clone());
            Self {
                ledger,
                clock,
                engine,
                underlying,
                consideration,
                underlying_mint,
                consideration_mint,
            }
        }

        fn params(&self) -> SeriesParams {
            SeriesParams {
                underlying_asset: self.underlying,
                consideration_asset: self.consideration,
                strike_price: 4_000_000,
                expiry: NOW + 3_600,
                is_put: false,
            }
        }

        fn fund(&self, owner: &str, underlying: u64, consideration: u64) -> Signer {
            let address = Address::from_label(owner);
            let u = self.ledger.open_holder_account(&address, &self.underlying).unwrap();
            let c = self.ledger.open_holder_account(&address, &self.consideration).unwrap();
            self.ledger.mint(&self.underlying_mint, &u, underlying).unwrap();
            self.ledger.mint(&self.consideration_mint, &c, consideration).unwrap();
            Signer::new(address)
        }

        fn balance(&self, owner: &Signer, asset: &Address) -> u64 {
            self.ledger
                .balance_of(&holder_account_address(&owner.address(), asset))
                .unwrap_or(0)
        }
    }

    #[test]
    fn test_create_series_rejects_bad_params_and_duplicates() {
        let fx = Fixture::new();
        let mut params = fx.params();
        params.expiry = NOW;
        assert_matches!(
            fx.engine.create_series(params),
            Err(OptionError::ExpirationInPast { .. })
        );

        let series = fx.engine.create_series(fx.params()).unwrap();
        assert_eq!(fx.ledger.decimals(&series.option_asset).unwrap(), 5);
        assert_eq!(fx.ledger.balance_of(&series.collateral_vault).unwrap(), 0);
        assert_matches!(
            fx.engine.create_series(fx.params()),
            Err(OptionError::SeriesAlreadyExists(_))
        );
        assert_eq!(fx.engine.series_count(), 1);
        assert_eq!(fx.engine.find_series(&fx.params()), Some(series));
    }

    #[test]
    fn test_create_series_requires_known_assets() {
        let fx = Fixture::new();
        let mut params = fx.params();
        params.consideration_asset = Address::from_label("unknown");
        assert_matches!(
            fx.engine.create_series(params),
            Err(OptionError::Ledger(LedgerError::AssetNotFound(_)))
        );
        assert_eq!(fx.engine.series_count(), 0);
    }

    #[test]
    fn test_mint_requires_underlying_balance() {
        let fx = Fixture::new();
        let series = fx.engine.create_series(fx.params()).unwrap();
        let writer = fx.fund("writer", 50, 0);

        assert_matches!(
            fx.engine.mint(&series.address, &writer, 0),
            Err(OptionError::InvalidAmount)
        );
        assert_matches!(
            fx.engine.mint(&series.address, &writer, 51),
            Err(OptionError::InsufficientBalance { available: 50, required: 51, .. })
        );
        assert_eq!(fx.engine.series(&series.address).unwrap().total_supply, 0);
        assert!(fx.engine.events_since(2).is_empty());
    }

    #[test]
    fn test_exercise_rejects_zero_strike_payment() {
        let fx = Fixture::new();
        let mut params = fx.params();
        params.strike_price = 1;
        let series = fx.engine.create_series(params).unwrap();
        let writer = fx.fund("writer", 1_000, 1_000);
        fx.engine.mint(&series.address, &writer, 1_000).unwrap();

        assert_matches!(
            fx.engine.exercise(&series.address, &writer, 10),
            Err(OptionError::StrikePaymentTooSmall { amount: 10 })
        );
        assert_eq!(fx.engine.series(&series.address).unwrap().exercised_amount, 0);
    }

    #[test]
    fn test_operations_respect_expiry_windows() {
        let fx = Fixture::new();
        let series = fx.engine.create_series(fx.params()).unwrap();
        let writer = fx.fund("writer", 100, 0);
        fx.engine.mint(&series.address, &writer, 100).unwrap();

        assert_matches!(
            fx.engine.redeem(&series.address, &writer, 10),
            Err(OptionError::OptionNotExpired { .. })
        );

        fx.clock.set(series.expiry);
        assert_matches!(
            fx.engine.mint(&series.address, &writer, 1),
            Err(OptionError::OptionExpired { .. })
        );
        assert_matches!(
            fx.engine.exercise(&series.address, &writer, 1),
            Err(OptionError::OptionExpired { .. })
        );
        assert_matches!(
            fx.engine.redeem_consideration(&series.address, &writer),
            Err(OptionError::OptionExpired { .. })
        );
        // Burn has no window
        fx.engine.burn(&series.address, &writer, 10).unwrap();
        assert_eq!(fx.balance(&writer, &fx.underlying), 10);
    }

    #[test]
    fn test_redeem_consideration_requires_shorts() {
        let fx = Fixture::new();
        let series = fx.engine.create_series(fx.params()).unwrap();
        let stranger = Signer::new(Address::from_label("stranger"));
        assert_matches!(
            fx.engine.redeem_consideration(&series.address, &stranger),
            Err(OptionError::NoShortTokens(_))
        );
    }

    #[test]
    fn test_unknown_series() {
        let fx = Fixture::new();
        let missing = Address::from_label("missing");
        let signer = fx.fund("writer", 1, 0);
        assert_matches!(
            fx.engine.mint(&missing, &signer, 1),
            Err(OptionError::SeriesNotFound(_))
        );
        assert_matches!(fx.engine.series(&missing), Err(OptionError::SeriesNotFound(_)));
    }

    #[test]
    fn test_events_are_sequenced() {
        let fx = Fixture::new();
        let series = fx.engine.create_series(fx.params()).unwrap();
        let writer = fx.fund("writer", 100, 0);
        fx.engine.mint(&series.address, &writer, 100).unwrap();

        let events = fx.engine.events_since(1);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].sequence, 2);
        assert_eq!(events[1].timestamp, NOW);
        assert_matches!(
            events[1].event,
            OptionEvent::OptionsMinted { amount: 100, total_supply: 100, .. }
        );
        assert_eq!(events[0].event.series(), series.address);

        let json = serde_json::to_value(&events[1]).unwrap();
        assert_eq!(json["type"], "options_minted");
        assert_eq!(json["sequence"], 2);
        assert_eq!(json["series"], series.address.to_string());
        assert_eq!(json["writer"], writer.address().to_string());
        let back: common::Sequenced<OptionEvent> = serde_json::from_value(json).unwrap();
        assert_eq!(back, events[1]);
    }
}
