use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

/// Suffix selecting a series' option asset in an asset reference
pub const OPTION_SUFFIX: &str = "option";
/// Suffix selecting a series' redemption asset in an asset reference
pub const REDEMPTION_SUFFIX: &str = "redemption";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MasterConfig {
    pub protocol: ProtocolConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub assets: Vec<AssetConfig>,
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
    #[serde(default)]
    pub script: Vec<ScriptStep>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProtocolConfig {
    pub name: String,
    pub version: String,
    /// pretty, json or compact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_format: Option<String>,
}

impl ProtocolConfig {
    pub fn log_format(&self) -> &str {
        self.log_format.as_deref().unwrap_or(DEFAULT_LOG_FORMAT)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClockConfig {
    /// RFC 3339 start time of a scripted session; system time when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
}

impl ClockConfig {
    /// Start time as a unix timestamp, if one is configured
    pub fn start_timestamp(&self) -> Result<Option<i64>, chrono::ParseError> {
        self.start
            .as_deref()
            .map(|s| chrono::DateTime::parse_from_rfc3339(s).map(|t| t.timestamp()))
            .transpose()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetConfig {
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
    pub name: String,
    /// Initial balance per asset symbol
    #[serde(default)]
    pub balances: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

/// One step of a scripted session
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScriptStep {
    #[serde(flatten)]
    pub action: Action,
    /// Step must fail, with an error message containing this text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect_error: Option<String>,
}

impl ScriptStep {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            expect_error: None,
        }
    }

    pub fn expecting(action: Action, error: &str) -> Self {
        Self {
            action,
            expect_error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    CreateSeries {
        label: String,
        underlying: String,
        consideration: String,
        strike_price: u64,
        /// Seconds from the session clock at creation
        expires_in: i64,
        #[serde(default)]
        is_put: bool,
    },
    Mint {
        series: String,
        account: String,
        amount: u64,
    },
    Exercise {
        series: String,
        account: String,
        amount: u64,
    },
    Redeem {
        series: String,
        account: String,
        amount: u64,
    },
    RedeemConsideration {
        series: String,
        account: String,
    },
    Burn {
        series: String,
        account: String,
        amount: u64,
    },
    CreateMarket {
        label: String,
        base: String,
        quote: String,
    },
    PlaceOrder {
        label: String,
        market: String,
        account: String,
        side: Side,
        price: u64,
        size: u64,
    },
    FillOrder {
        order: String,
        account: String,
        size: u64,
    },
    CancelOrder {
        order: String,
        account: String,
    },
    AdvanceClock {
        seconds: i64,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::CreateSeries { .. } => "create_series",
            Action::Mint { .. } => "mint",
            Action::Exercise { .. } => "exercise",
            Action::Redeem { .. } => "redeem",
            Action::RedeemConsideration { .. } => "redeem_consideration",
            Action::Burn { .. } => "burn",
            Action::CreateMarket { .. } => "create_market",
            Action::PlaceOrder { .. } => "place_order",
            Action::FillOrder { .. } => "fill_order",
            Action::CancelOrder { .. } => "cancel_order",
            Action::AdvanceClock { .. } => "advance_clock",
        }
    }

    /// Account acting in this step, if any
    pub fn account(&self) -> Option<&str> {
        match self {
            Action::Mint { account, .. }
            | Action::Exercise { account, .. }
            | Action::Redeem { account, .. }
            | Action::RedeemConsideration { account, .. }
            | Action::Burn { account, .. }
            | Action::PlaceOrder { account, .. }
            | Action::FillOrder { account, .. }
            | Action::CancelOrder { account, .. } => Some(account),
            Action::CreateSeries { .. } | Action::CreateMarket { .. } | Action::AdvanceClock { .. } => {
                None
            }
        }
    }
}

/// A parsed asset reference: a symbol, or one of a series' derived assets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRef<'a> {
    Symbol(&'a str),
    Option(&'a str),
    Redemption(&'a str),
}

impl<'a> AssetRef<'a> {
    /// Parse `SYMBOL`, `<series>.option` or `<series>.redemption`
    pub fn parse(reference: &'a str) -> Option<Self> {
        match reference.rsplit_once('.') {
            None if !reference.is_empty() => Some(AssetRef::Symbol(reference)),
            Some((series, OPTION_SUFFIX)) if !series.is_empty() => Some(AssetRef::Option(series)),
            Some((series, REDEMPTION_SUFFIX)) if !series.is_empty() => {
                Some(AssetRef::Redemption(series))
            }
            _ => None,
        }
    }
}

impl fmt::Display for AssetRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetRef::Symbol(s) => write!(f, "{}", s),
            AssetRef::Option(s) => write!(f, "{}.{}", s, OPTION_SUFFIX),
            AssetRef::Redemption(s) => write!(f, "{}.{}", s, REDEMPTION_SUFFIX),
        }
    }
}
