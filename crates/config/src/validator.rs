use crate::*;
use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Protocol name is required")]
    MissingProtocolName,

    #[error("Invalid version format: {0}. Must be in format X.Y.Z (e.g., 1.0.0)")]
    InvalidVersionFormat(String),

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("Invalid clock start '{value}': {message}")]
    InvalidClockStart { value: String, message: String },

    #[error("No assets defined")]
    NoAssets,

    #[error("Asset {symbol}: {message}")]
    InvalidAsset { symbol: String, message: String },

    #[error("Duplicate asset symbol '{0}'")]
    DuplicateAsset(String),

    #[error("Account {name}: {message}")]
    InvalidAccount { name: String, message: String },

    #[error("Duplicate account name '{0}'")]
    DuplicateAccount(String),

    #[error("Script step {step} ({action}): {message}")]
    InvalidStep {
        step: usize,
        action: &'static str,
        message: String,
    },

    #[error("Environment variable '{var}' is not set")]
    UnresolvedEnvVar { var: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(config: &MasterConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_protocol(&config.protocol, &mut report);
    validate_clock(&config.clock, &mut report);
    let symbols = validate_assets(&config.assets, &mut report);
    let accounts = validate_accounts(&config.accounts, &symbols, &mut report);
    validate_script(&config.script, &symbols, &accounts, &mut report);

    report
}

fn validate_protocol(protocol: &ProtocolConfig, report: &mut ValidationReport) {
    if protocol.name.trim().is_empty() {
        report.add_error(ValidationError::MissingProtocolName);
    }
    for var in unresolved_env_vars(&protocol.name) {
        report.add_error(ValidationError::UnresolvedEnvVar { var });
    }

    let version_ok = Regex::new(r"^\d+\.\d+\.\d+$")
        .map(|re| re.is_match(&protocol.version))
        .unwrap_or(false);
    if !version_ok {
        report.add_error(ValidationError::InvalidVersionFormat(protocol.version.clone()));
    }

    match &protocol.log_format {
        Some(format) if !LOG_FORMATS.contains(&format.to_lowercase().as_str()) => {
            report.add_error(ValidationError::InvalidLogFormat(format.clone()));
        }
        Some(_) => {}
        None => report.add_default("protocol.log_format", DEFAULT_LOG_FORMAT),
    }
}

fn validate_clock(clock: &ClockConfig, report: &mut ValidationReport) {
    match (&clock.start, clock.start_timestamp()) {
        (None, _) => report.add_default("clock.start", "system time"),
        (Some(value), Err(e)) => report.add_error(ValidationError::InvalidClockStart {
            value: value.clone(),
            message: e.to_string(),
        }),
        (Some(_), Ok(_)) => {}
    }
}

fn validate_assets<'a>(assets: &'a [AssetConfig], report: &mut ValidationReport) -> HashSet<&'a str> {
    let mut symbols = HashSet::new();
    if assets.is_empty() {
        report.add_error(ValidationError::NoAssets);
    }

    for asset in assets {
        if asset.symbol.is_empty() || asset.symbol.contains('.') {
            report.add_error(ValidationError::InvalidAsset {
                symbol: asset.symbol.clone(),
                message: "symbol must be non-empty and must not contain '.'".to_string(),
            });
            continue;
        }
        if asset.decimals > MAX_DECIMALS {
            report.add_error(ValidationError::InvalidAsset {
                symbol: asset.symbol.clone(),
                message: format!("decimals must be at most {}, got {}", MAX_DECIMALS, asset.decimals),
            });
        }
        if !symbols.insert(asset.symbol.as_str()) {
            report.add_error(ValidationError::DuplicateAsset(asset.symbol.clone()));
        }
    }
    symbols
}

fn validate_accounts<'a>(
    accounts: &'a [AccountConfig],
    symbols: &HashSet<&str>,
    report: &mut ValidationReport,
) -> HashSet<&'a str> {
    let mut names = HashSet::new();
    for account in accounts {
        if account.name.trim().is_empty() {
            report.add_error(ValidationError::InvalidAccount {
                name: account.name.clone(),
                message: "name is required".to_string(),
            });
            continue;
        }
        if !names.insert(account.name.as_str()) {
            report.add_error(ValidationError::DuplicateAccount(account.name.clone()));
        }
        for (symbol, amount) in &account.balances {
            if !symbols.contains(symbol.as_str()) {
                report.add_error(ValidationError::InvalidAccount {
                    name: account.name.clone(),
                    message: format!("balance in unknown asset '{}'", symbol),
                });
            } else if *amount == 0 {
                report.add_warning(
                    &format!("accounts.{}.balances.{}", account.name, symbol),
                    "Zero balance has no effect",
                );
            }
        }
    }
    names
}

/// Labels defined so far while walking the script
struct ScriptScope<'a> {
    symbols: &'a HashSet<&'a str>,
    accounts: &'a HashSet<&'a str>,
    series: HashSet<&'a str>,
    markets: HashSet<&'a str>,
    orders: HashSet<&'a str>,
}

impl<'a> ScriptScope<'a> {
    fn check_asset(&self, reference: &str) -> Result<(), String> {
        match AssetRef::parse(reference) {
            Some(AssetRef::Symbol(symbol)) if self.symbols.contains(symbol) => Ok(()),
            Some(AssetRef::Option(series)) | Some(AssetRef::Redemption(series))
                if self.series.contains(series) =>
            {
                Ok(())
            }
            Some(_) => Err(format!("unknown asset '{}'", reference)),
            None => Err(format!("malformed asset reference '{}'", reference)),
        }
    }

    fn check(set: &HashSet<&str>, kind: &str, name: &str) -> Result<(), String> {
        if set.contains(name) {
            Ok(())
        } else {
            Err(format!("unknown {} '{}'", kind, name))
        }
    }

    fn define(set: &mut HashSet<&'a str>, kind: &str, name: &'a str) -> Result<(), String> {
        if name.is_empty() || name.contains('.') {
            return Err(format!("{} label must be non-empty and must not contain '.'", kind));
        }
        if !set.insert(name) {
            return Err(format!("duplicate {} label '{}'", kind, name));
        }
        Ok(())
    }

    fn step(&mut self, action: &'a Action) -> Vec<String> {
        let mut problems = Vec::new();
        let mut push = |r: Result<(), String>| {
            if let Err(e) = r {
                problems.push(e);
            }
        };

        if let Some(account) = action.account() {
            push(Self::check(self.accounts, "account", account));
        }

        match action {
            Action::CreateSeries {
                label,
                underlying,
                consideration,
                ..
            } => {
                push(self.check_asset(underlying));
                push(self.check_asset(consideration));
                push(Self::define(&mut self.series, "series", label));
            }
            Action::Mint { series, .. }
            | Action::Exercise { series, .. }
            | Action::Redeem { series, .. }
            | Action::RedeemConsideration { series, .. }
            | Action::Burn { series, .. } => {
                push(Self::check(&self.series, "series", series));
            }
            Action::CreateMarket { label, base, quote } => {
                push(self.check_asset(base));
                push(self.check_asset(quote));
                push(Self::define(&mut self.markets, "market", label));
            }
            Action::PlaceOrder { label, market, .. } => {
                push(Self::check(&self.markets, "market", market));
                push(Self::define(&mut self.orders, "order", label));
            }
            Action::FillOrder { order, .. } | Action::CancelOrder { order, .. } => {
                push(Self::check(&self.orders, "order", order));
            }
            Action::AdvanceClock { seconds } => {
                if *seconds < 0 {
                    push(Err("clock cannot move backwards".to_string()));
                }
            }
        }
        problems
    }
}

fn validate_script(
    script: &[ScriptStep],
    symbols: &HashSet<&str>,
    accounts: &HashSet<&str>,
    report: &mut ValidationReport,
) {
    if script.is_empty() {
        report.add_warning("script", "No script steps defined; 'run' will only set up balances");
        return;
    }

    let mut scope = ScriptScope {
        symbols,
        accounts,
        series: HashSet::new(),
        markets: HashSet::new(),
        orders: HashSet::new(),
    };

    for (index, step) in script.iter().enumerate() {
        let step_number = index + 1;
        for message in scope.step(&step.action) {
            report.add_error(ValidationError::InvalidStep {
                step: step_number,
                action: step.action.name(),
                message,
            });
        }
        if step.expect_error.is_none() && has_zero_amount(&step.action) {
            report.add_warning(
                &format!("script[{}]", step_number),
                "Zero amount will be rejected; set expect_error if this is intended",
            );
        }
    }
}

fn has_zero_amount(action: &Action) -> bool {
    match action {
        Action::CreateSeries { strike_price, .. } => *strike_price == 0,
        Action::Mint { amount, .. }
        | Action::Exercise { amount, .. }
        | Action::Redeem { amount, .. }
        | Action::Burn { amount, .. } => *amount == 0,
        Action::PlaceOrder { price, size, .. } => *price == 0 || *size == 0,
        Action::FillOrder { size, .. } => *size == 0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> MasterConfig {
        generate_default_config()
    }

    #[test]
    fn test_default_config_is_valid() {
        let report = validate_config(&base_config());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report
            .defaults_applied
            .iter()
            .any(|d| d.field == "clock.start"));
    }

    #[test]
    fn test_protocol_errors() {
        let mut config = base_config();
        config.protocol.name = String::new();
        config.protocol.version = "1.0".to_string();
        config.protocol.log_format = Some("xml".to_string());
        let report = validate_config(&config);
        assert!(report.errors.contains(&ValidationError::MissingProtocolName));
        assert!(report
            .errors
            .contains(&ValidationError::InvalidVersionFormat("1.0".to_string())));
        assert!(report
            .errors
            .contains(&ValidationError::InvalidLogFormat("xml".to_string())));
    }

    #[test]
    fn test_asset_and_account_errors() {
        let mut config = base_config();
        config.assets.push(AssetConfig {
            symbol: "USDC".to_string(),
            decimals: 19,
        });
        config.accounts.push(AccountConfig {
            name: "ghost".to_string(),
            balances: [("DOGE".to_string(), 1)].into_iter().collect(),
        });
        let report = validate_config(&config);
        assert!(report
            .errors
            .contains(&ValidationError::DuplicateAsset("USDC".to_string())));
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidAsset { message, .. } if message.contains("at most 18"))));
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidAccount { name, .. } if name == "ghost")));
    }

    #[test]
    fn test_script_references_must_resolve_in_order() {
        let mut config = base_config();
        config.script.insert(
            0,
            ScriptStep::new(Action::Mint {
                series: "later".to_string(),
                account: "nobody".to_string(),
                amount: 1,
            }),
        );
        config.script.push(ScriptStep::new(Action::CreateMarket {
            label: "bad".to_string(),
            base: "missing.option".to_string(),
            quote: "USDC".to_string(),
        }));
        let report = validate_config(&config);

        let step_errors: Vec<_> = report
            .errors
            .iter()
            .filter_map(|e| match e {
                ValidationError::InvalidStep { step, message, .. } => Some((*step, message.clone())),
                _ => None,
            })
            .collect();
        assert!(step_errors.contains(&(1, "unknown account 'nobody'".to_string())));
        assert!(step_errors.contains(&(1, "unknown series 'later'".to_string())));
        assert!(step_errors
            .iter()
            .any(|(_, m)| m == "unknown asset 'missing.option'"));
    }

    #[test]
    fn test_zero_amount_warns_unless_expected() {
        let mut config = base_config();
        config.script.push(ScriptStep::new(Action::AdvanceClock { seconds: 1 }));
        config.script.push(ScriptStep::expecting(
            Action::Burn {
                series: "sol-call".to_string(),
                account: "writer".to_string(),
                amount: 0,
            },
            "Invalid amount",
        ));
        let report = validate_config(&config);
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report.warnings.iter().all(|w| !w.field.starts_with("script[")));

        config.script.last_mut().unwrap().expect_error = None;
        let report = validate_config(&config);
        assert!(report.warnings.iter().any(|w| w.field.starts_with("script[")));
    }
}
