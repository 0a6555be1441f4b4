//! Scripted session runner
//!
//! A [`Session`] builds an in-memory ledger from a [`MasterConfig`], wires
//! both engines to it and a manual clock, then executes the script one step
//! at a time. Labels in the script (series, markets, orders, accounts) are
//! resolved to the addresses the engines derived for them.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use common::{Address, Clock, ManualClock, SystemClock};
use config::{Action, AssetRef, MasterConfig, ScriptStep, Side};
use ledger::{holder_account_address, AssetLedger, InMemoryLedger, LedgerError, MintAuthority, Signer};
use matching_engine::{MatchingEngine, OrderSide};
use option_engine::{OptionEngine, Series, SeriesParams};
use serde::Serialize;
use tracing::{debug, info, warn};

// ============================================================================
// Outcomes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Ok,
    /// The step failed the way the script said it would
    ExpectedFailure,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    /// 1-based position in the script
    pub step: usize,
    pub action: &'static str,
    pub status: StepStatus,
    pub detail: String,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<StepOutcome>,
    /// Unexpected failures, only collected when running with keep-going
    pub failures: Vec<String>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

// ============================================================================
// Session
// ============================================================================

pub struct Session {
    ledger: Arc<InMemoryLedger>,
    clock: Arc<ManualClock>,
    options: OptionEngine,
    matching: MatchingEngine,
    /// Configured asset symbol -> asset id
    assets: BTreeMap<String, Address>,
    signers: BTreeMap<String, Signer>,
    series: BTreeMap<String, Series>,
    markets: BTreeMap<String, Address>,
    /// Order label -> (market, order id)
    orders: BTreeMap<String, (Address, u64)>,
}

impl Session {
    /// Create the configured assets, fund the configured accounts and start
    /// both engines
    pub fn new(config: &MasterConfig) -> Result<Self> {
        let start = config
            .clock
            .start_timestamp()
            .context("Invalid clock.start")?
            .unwrap_or_else(|| SystemClock.unix_timestamp());
        let ledger = Arc::new(InMemoryLedger::new());
        let clock = Arc::new(ManualClock::new(start));

        let mut assets = BTreeMap::new();
        let mut mints: BTreeMap<&str, MintAuthority> = BTreeMap::new();
        for asset in &config.assets {
            let id = Address::from_label(&asset.symbol);
            let mint = ledger
                .create_asset(id, asset.decimals)
                .with_context(|| format!("Failed to create asset {}", asset.symbol))?;
            debug!(symbol = %asset.symbol, asset = %id.short(), decimals = asset.decimals, "Asset created");
            assets.insert(asset.symbol.clone(), id);
            mints.insert(asset.symbol.as_str(), mint);
        }

        let mut signers = BTreeMap::new();
        for account in &config.accounts {
            let signer = Signer::new(Address::from_label(&account.name));
            for (symbol, amount) in &account.balances {
                let mint = mints.get(symbol.as_str()).ok_or_else(|| {
                    anyhow!("Account {} is funded with unknown asset {}", account.name, symbol)
                })?;
                let holder = ledger.open_holder_account(&signer.address(), &mint.asset())?;
                if *amount > 0 {
                    ledger
                        .mint(mint, &holder, *amount)
                        .with_context(|| format!("Failed to fund {} with {}", account.name, symbol))?;
                }
            }
            debug!(account = %account.name, owner = %signer.address().short(), "Account funded");
            signers.insert(account.name.clone(), signer);
        }

        let options = OptionEngine::new(ledger.clone(), clock.clone());
        let matching = MatchingEngine::new(ledger.clone(), clock.clone());

        info!(
            start,
            assets = assets.len(),
            accounts = signers.len(),
            "Session initialized"
        );

        Ok(Self {
            ledger,
            clock,
            options,
            matching,
            assets,
            signers,
            series: BTreeMap::new(),
            markets: BTreeMap::new(),
            orders: BTreeMap::new(),
        })
    }

    /// Execute every step in order
    ///
    /// Stops at the first unexpected failure unless `keep_going` is set, in
    /// which case failures are collected in the report.
    pub fn run(&mut self, steps: &[ScriptStep], keep_going: bool) -> Result<RunReport> {
        let mut report = RunReport::default();
        for (index, step) in steps.iter().enumerate() {
            match self.execute(index + 1, step) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) if keep_going => {
                    warn!(step = index + 1, error = %format!("{:#}", e), "Step failed, continuing");
                    report.failures.push(format!("{:#}", e));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    /// Execute one step and check it against its expected error, if any
    pub fn execute(&mut self, step: usize, script_step: &ScriptStep) -> Result<StepOutcome> {
        let action = script_step.action.name();
        let result = self.apply(&script_step.action);

        match (&script_step.expect_error, result) {
            (None, Ok(detail)) => {
                info!(step, action, %detail, "Step completed");
                Ok(StepOutcome {
                    step,
                    action,
                    status: StepStatus::Ok,
                    detail,
                })
            }
            (None, Err(e)) => Err(e.context(format!("Step {} ({}) failed", step, action))),
            (Some(expected), Ok(detail)) => bail!(
                "Step {} ({}) succeeded with '{}' but was expected to fail with '{}'",
                step,
                action,
                detail,
                expected
            ),
            (Some(expected), Err(e)) => {
                let message = format!("{:#}", e);
                if message.contains(expected.as_str()) {
                    info!(step, action, error = %message, "Step failed as expected");
                    Ok(StepOutcome {
                        step,
                        action,
                        status: StepStatus::ExpectedFailure,
                        detail: message,
                    })
                } else {
                    Err(e.context(format!(
                        "Step {} ({}) was expected to fail with '{}'",
                        step, action, expected
                    )))
                }
            }
        }
    }

    fn apply(&mut self, action: &Action) -> Result<String> {
        match action {
            Action::CreateSeries {
                label,
                underlying,
                consideration,
                strike_price,
                expires_in,
                is_put,
            } => {
                if self.series.contains_key(label) {
                    bail!("Series label '{}' is already in use", label);
                }
                let now = self.clock.unix_timestamp();
                let expiry = now
                    .checked_add(*expires_in)
                    .ok_or_else(|| anyhow!("Expiry of series '{}' overflows", label))?;
                let series = self.options.create_series(SeriesParams {
                    underlying_asset: self.asset(underlying)?,
                    consideration_asset: self.asset(consideration)?,
                    strike_price: *strike_price,
                    expiry,
                    is_put: *is_put,
                })?;
                let detail = format!(
                    "series {} expires at {} (option {}, redemption {})",
                    series.address.short(),
                    series.expiry,
                    series.option_asset.short(),
                    series.redemption_asset.short()
                );
                self.series.insert(label.clone(), series);
                Ok(detail)
            }
            Action::Mint {
                series,
                account,
                amount,
            } => {
                let receipt = self
                    .options
                    .mint(&self.series(series)?.address, self.signer(account)?, *amount)?;
                Ok(format!(
                    "minted {}, total supply {}",
                    receipt.amount, receipt.total_supply
                ))
            }
            Action::Exercise {
                series,
                account,
                amount,
            } => {
                let receipt = self
                    .options
                    .exercise(&self.series(series)?.address, self.signer(account)?, *amount)?;
                Ok(format!(
                    "exercised {} for a strike payment of {}",
                    receipt.amount, receipt.strike_payment
                ))
            }
            Action::Redeem {
                series,
                account,
                amount,
            } => {
                let receipt = self
                    .options
                    .redeem(&self.series(series)?.address, self.signer(account)?, *amount)?;
                Ok(format!(
                    "redeemed {} for {} underlying and {} consideration",
                    receipt.amount, receipt.underlying_payout, receipt.consideration_payout
                ))
            }
            Action::RedeemConsideration { series, account } => {
                let receipt = self
                    .options
                    .redeem_consideration(&self.series(series)?.address, self.signer(account)?)?;
                Ok(format!(
                    "claimed {}, {} withdrawn in total",
                    receipt.claimed, receipt.total_withdrawn
                ))
            }
            Action::Burn {
                series,
                account,
                amount,
            } => {
                let receipt = self
                    .options
                    .burn(&self.series(series)?.address, self.signer(account)?, *amount)?;
                Ok(format!(
                    "burned {} pairs, total supply {}",
                    receipt.amount, receipt.total_supply
                ))
            }
            Action::CreateMarket { label, base, quote } => {
                if self.markets.contains_key(label) {
                    bail!("Market label '{}' is already in use", label);
                }
                let market = self
                    .matching
                    .create_market(&self.asset(base)?, &self.asset(quote)?)?;
                self.markets.insert(label.clone(), market.address);
                Ok(format!("market {}", market.address.short()))
            }
            Action::PlaceOrder {
                label,
                market,
                account,
                side,
                price,
                size,
            } => {
                if self.orders.contains_key(label) {
                    bail!("Order label '{}' is already in use", label);
                }
                let market_address = self.market(market)?;
                let side = match side {
                    Side::Buy => OrderSide::Buy,
                    Side::Sell => OrderSide::Sell,
                };
                let deposit_asset = self.matching.market(&market_address)?.deposit_asset(side);
                let order = self.matching.place_order(
                    &market_address,
                    self.signer(account)?,
                    side,
                    *price,
                    *size,
                    &deposit_asset,
                )?;
                let detail = format!("order {} {} {} @ {}", order.order_id, side, order.size, order.price);
                self.orders
                    .insert(label.clone(), (market_address, order.order_id));
                Ok(detail)
            }
            Action::FillOrder {
                order,
                account,
                size,
            } => {
                let (market, order_id) = self.order(order)?;
                let fill = self
                    .matching
                    .fill_order(&market, order_id, self.signer(account)?, *size)?;
                Ok(format!(
                    "filled {} for {} quote, {} remaining",
                    fill.fill_size, fill.quote_amount, fill.remaining
                ))
            }
            Action::CancelOrder { order, account } => {
                let (market, order_id) = self.order(order)?;
                let cancel = self
                    .matching
                    .cancel_order(&market, order_id, self.signer(account)?)?;
                Ok(format!("cancelled, {} refunded", cancel.refunded))
            }
            Action::AdvanceClock { seconds } => {
                if *seconds < 0 {
                    bail!("The clock cannot move backwards ({} seconds)", seconds);
                }
                let now = self.clock.advance(*seconds);
                Ok(format!("clock at {}", now))
            }
        }
    }

    // ========================================================================
    // Label resolution
    // ========================================================================

    fn asset(&self, reference: &str) -> Result<Address> {
        match AssetRef::parse(reference) {
            Some(AssetRef::Symbol(symbol)) => self
                .assets
                .get(symbol)
                .copied()
                .ok_or_else(|| anyhow!("Unknown asset '{}'", symbol)),
            Some(AssetRef::Option(label)) => Ok(self.series(label)?.option_asset),
            Some(AssetRef::Redemption(label)) => Ok(self.series(label)?.redemption_asset),
            None => bail!("Invalid asset reference '{}'", reference),
        }
    }

    fn series(&self, label: &str) -> Result<&Series> {
        self.series
            .get(label)
            .ok_or_else(|| anyhow!("Unknown series '{}'", label))
    }

    fn signer(&self, name: &str) -> Result<&Signer> {
        self.signers
            .get(name)
            .ok_or_else(|| anyhow!("Unknown account '{}'", name))
    }

    fn market(&self, label: &str) -> Result<Address> {
        self.markets
            .get(label)
            .copied()
            .ok_or_else(|| anyhow!("Unknown market '{}'", label))
    }

    fn order(&self, label: &str) -> Result<(Address, u64)> {
        self.orders
            .get(label)
            .copied()
            .ok_or_else(|| anyhow!("Unknown order '{}'", label))
    }

    // ========================================================================
    // Reporting
    // ========================================================================

    /// Non-zero balances per account, keyed by asset reference
    pub fn balances(&self) -> Result<BTreeMap<String, BTreeMap<String, u64>>> {
        let mut tracked: Vec<(String, Address)> = self
            .assets
            .iter()
            .map(|(symbol, id)| (symbol.clone(), *id))
            .collect();
        for (label, series) in &self.series {
            tracked.push((AssetRef::Option(label).to_string(), series.option_asset));
            tracked.push((AssetRef::Redemption(label).to_string(), series.redemption_asset));
        }

        let mut balances = BTreeMap::new();
        for (name, signer) in &self.signers {
            let mut held = BTreeMap::new();
            for (reference, asset) in &tracked {
                let account = holder_account_address(&signer.address(), asset);
                match self.ledger.balance_of(&account) {
                    Ok(0) | Err(LedgerError::AccountNotFound(_)) => {}
                    Ok(balance) => {
                        held.insert(reference.clone(), balance);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            balances.insert(name.clone(), held);
        }
        Ok(balances)
    }

    /// Every recorded event as a JSON line, tagged with its engine
    pub fn event_lines(&self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for event in self.options.events_since(1) {
            lines.push(format!("options  {}", serde_json::to_string(&event)?));
        }
        for event in self.matching.events_since(1) {
            lines.push(format!("matching {}", serde_json::to_string(&event)?));
        }
        Ok(lines)
    }

    pub fn now(&self) -> i64 {
        self.clock.unix_timestamp()
    }
}
