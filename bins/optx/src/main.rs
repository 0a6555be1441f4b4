//! optx CLI Binary
//!
//! Entry point for the optx sandbox. It writes a sample configuration,
//! validates configurations, and runs their scripts against in-memory
//! option and matching engines.

mod session;

use anyhow::{Context, Result};
use cli::{Cli, Commands};
use config::{generate_default_config, load_config, save_config, validate_config, MasterConfig};
use observability::{init_logging, LogFormat};
use session::{Session, StepStatus};
use std::path::Path;
use tracing::{debug, error, info, warn};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // The run command may take its format from the config file
    let configured_format = match &cli.command {
        Commands::Run { config, .. } => load_config(config)
            .ok()
            .and_then(|c| c.protocol.log_format.clone()),
        _ => None,
    };
    let format = match (cli.log_format, configured_format) {
        (Some(arg), _) => LogFormat::parse(arg.as_str()),
        (None, Some(configured)) => LogFormat::parse(&configured),
        (None, None) => Some(LogFormat::default()),
    }
    .context("Unknown log format")?;
    init_logging("optx", format)?;
    debug!(?cli, "CLI arguments parsed");

    match cli.command {
        Commands::Run {
            config,
            events,
            keep_going,
        } => {
            info!("Executing 'run' command");
            run_command(config, events, keep_going)
        }
        Commands::Validate { config } => {
            info!("Executing 'validate' command");
            validate_command(config)
        }
        Commands::Init { output, force } => {
            info!("Executing 'init' command");
            init_command(output, force)
        }
    }
}

fn load_valid_config(config_path: &Path) -> Result<MasterConfig> {
    let config = load_config(config_path)?;
    let report = validate_config(&config);

    if !report.warnings.is_empty() {
        warn!("Configuration warnings:");
        for warning in &report.warnings {
            warn!(field = %warning.field, message = %warning.message);
        }
    }

    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot run session due to configuration errors");
    }

    Ok(config)
}

fn run_command<P: AsRef<Path>>(config_path: P, events: bool, keep_going: bool) -> Result<()> {
    let config_path = config_path.as_ref();
    let config = load_valid_config(config_path)?;
    info!(
        protocol = %config.protocol.name,
        steps = config.script.len(),
        "Starting session"
    );

    let mut session = Session::new(&config)?;
    let report = session.run(&config.script, keep_going)?;

    println!("\n=== Session Report ===\n");
    for outcome in &report.outcomes {
        let marker = match outcome.status {
            StepStatus::Ok => "[ok]",
            StepStatus::ExpectedFailure => "[expected error]",
        };
        println!(
            "  {:>3}. {} {}: {}",
            outcome.step, marker, outcome.action, outcome.detail
        );
    }
    println!();

    if events {
        println!("Events:");
        for line in session.event_lines()? {
            println!("  {}", line);
        }
        println!();
    }

    println!("Balances:");
    for (account, held) in session.balances()? {
        println!("  {}", account);
        if held.is_empty() {
            println!("    (empty)");
        }
        for (asset, balance) in held {
            println!("    {:<24} {}", asset, balance);
        }
    }
    println!();

    if !report.is_success() {
        println!("Failures ({}):", report.failures.len());
        for failure in &report.failures {
            println!("  [error] {}", failure);
        }
        println!();
        anyhow::bail!("{} step(s) failed", report.failures.len());
    }

    println!("[ok] Session completed at {}", session.now());
    Ok(())
}

fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Protocol: {}", config.protocol.name);
    println!("Version: {}", config.protocol.version);
    println!("Assets: {}", config.assets.len());
    println!("Accounts: {}", config.accounts.len());
    println!("Script Steps: {}", config.script.len());

    Ok(())
}

fn init_command<P: AsRef<Path>>(output_path: P, force: bool) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    if output_path.exists() && !force {
        anyhow::bail!(
            "{:?} already exists, pass --force to overwrite it",
            output_path
        );
    }

    let config = generate_default_config();

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("This configuration includes:");
    println!(
        "  - {} assets ({})",
        config.assets.len(),
        config
            .assets
            .iter()
            .map(|a| a.symbol.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  - {} funded accounts", config.accounts.len());
    println!(
        "  - a {}-step script that writes, trades, exercises and settles a call",
        config.script.len()
    );
    println!();
    println!("Next steps:");
    println!("  1. Edit the configuration file to customize the session");
    println!(
        "  2. Run 'optx validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  3. Run 'optx run --config {:?} --events' to execute the script",
        output_path
    );

    Ok(())
}
