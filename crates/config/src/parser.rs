use crate::*;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MasterConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());

    let config = parse_config(&content)?;
    info!("Configuration loaded successfully");
    Ok(config)
}

/// Substitute environment variables, then parse YAML
pub fn parse_config(content: &str) -> Result<MasterConfig> {
    let substituted = substitution::substitute_env_vars(content)?;
    debug!("Environment variable substitution completed");

    serde_yaml::from_str(&substituted).with_context(|| "Failed to parse YAML configuration")
}

/// A sandbox session: write a call, list it, sell it, exercise it, settle it
#[instrument]
pub fn generate_default_config() -> MasterConfig {
    let account = |name: &str, balances: &[(&str, u64)]| AccountConfig {
        name: name.to_string(),
        balances: balances
            .iter()
            .map(|(symbol, amount)| (symbol.to_string(), *amount))
            .collect::<BTreeMap<_, _>>(),
    };
    let s = |v: &str| v.to_string();

    MasterConfig {
        protocol: ProtocolConfig {
            name: s("optx sandbox"),
            version: s("0.1.0"),
            log_format: None,
        },
        clock: ClockConfig::default(),
        assets: vec![
            AssetConfig {
                symbol: s("SOL"),
                decimals: 5,
            },
            AssetConfig {
                symbol: s("USDC"),
                decimals: 6,
            },
        ],
        accounts: vec![
            account("writer", &[("SOL", 100_000)]),
            account("buyer", &[("USDC", 10_000_000)]),
        ],
        script: vec![
            ScriptStep::new(Action::CreateSeries {
                label: s("sol-call"),
                underlying: s("SOL"),
                consideration: s("USDC"),
                strike_price: 4_000_000,
                expires_in: 3_600,
                is_put: false,
            }),
            ScriptStep::new(Action::Mint {
                series: s("sol-call"),
                account: s("writer"),
                amount: 100_000,
            }),
            ScriptStep::new(Action::CreateMarket {
                label: s("sol-call/usdc"),
                base: s("sol-call.option"),
                quote: s("USDC"),
            }),
            ScriptStep::new(Action::PlaceOrder {
                label: s("ask"),
                market: s("sol-call/usdc"),
                account: s("writer"),
                side: Side::Sell,
                price: 10,
                size: 50_000,
            }),
            ScriptStep::new(Action::FillOrder {
                order: s("ask"),
                account: s("buyer"),
                size: 50_000,
            }),
            ScriptStep::expecting(
                Action::FillOrder {
                    order: s("ask"),
                    account: s("buyer"),
                    size: 1,
                },
                "fully filled",
            ),
            ScriptStep::new(Action::Exercise {
                series: s("sol-call"),
                account: s("buyer"),
                amount: 50_000,
            }),
            ScriptStep::new(Action::RedeemConsideration {
                series: s("sol-call"),
                account: s("writer"),
            }),
            ScriptStep::new(Action::AdvanceClock { seconds: 3_600 }),
            ScriptStep::new(Action::Redeem {
                series: s("sol-call"),
                account: s("writer"),
                amount: 100_000,
            }),
        ],
    }
}

#[instrument]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &MasterConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_survives_yaml() {
        let config = generate_default_config();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = parse_config(&yaml).unwrap();
        assert_eq!(parsed.script.len(), config.script.len());
        assert_eq!(parsed.script[5].expect_error.as_deref(), Some("fully filled"));
        assert!(validate_config(&parsed).is_valid());
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("optx-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("optx.yaml");

        save_config(&generate_default_config(), &path).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.protocol.name, "optx sandbox");
        assert_eq!(loaded.assets.len(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = load_config("/nonexistent/optx.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
