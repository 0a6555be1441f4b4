use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "optx")]
#[command(about = "optx - collateralized options and an escrowed order book")]
#[command(version)]
pub struct Cli {
    /// Log output format (overrides protocol.log_format)
    #[arg(long, global = true, value_enum, env = "OPTX_LOG_FORMAT")]
    pub log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the configured session script against in-memory engines
    Run {
        /// Path to the configuration file
        #[arg(short, long, default_value = "optx.yaml")]
        config: PathBuf,

        /// Print every event as a JSON line
        #[arg(long)]
        events: bool,

        /// Keep going after a step fails unexpectedly
        #[arg(long)]
        keep_going: bool,
    },

    /// Validate configuration without running it
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "optx.yaml")]
        config: PathBuf,
    },

    /// Write a sample configuration file
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "optx.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormatArg {
    Pretty,
    Json,
    Compact,
}

impl LogFormatArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormatArg::Pretty => "pretty",
            LogFormatArg::Json => "json",
            LogFormatArg::Compact => "compact",
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_flags() {
        let cli = Cli::try_parse_from([
            "optx",
            "--log-format",
            "json",
            "run",
            "--config",
            "demo.yaml",
            "--events",
        ])
        .unwrap();
        assert_eq!(cli.log_format, Some(LogFormatArg::Json));
        match cli.command {
            Commands::Run {
                config,
                events,
                keep_going,
            } => {
                assert_eq!(config, PathBuf::from("demo.yaml"));
                assert!(events);
                assert!(!keep_going);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_init_defaults() {
        let cli = Cli::try_parse_from(["optx", "init"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Init { ref output, force: false } if output == &PathBuf::from("optx.yaml")
        ));
    }
}
