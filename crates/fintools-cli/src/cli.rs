//! CLI argument definitions for fintools.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tools` | List available tools |
//! | `call` | Invoke one tool and print its text result |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--log-level` | `LOG_LEVEL` or `info` | Log filter for stderr output |
//! | `--log-format` | `LOG_FORMAT` or `text` | `text` or `json` log lines |
//!
//! # Examples
//!
//! ```bash
//! fintools tools --domain forex
//! fintools call get_forex_snapshot --arg ticker=EURUSD
//! fintools call get_top_cryptos --args-json '{"limit": 5}'
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

use fintools_agent::Domain;
use fintools_core::LogFormat;

/// Market data tools for AI agents, callable from the shell.
#[derive(Debug, Parser)]
#[command(
    name = "fintools",
    author,
    version,
    about = "Cryptocurrency and forex market data tools"
)]
pub struct Cli {
    /// Log filter (e.g. `debug`, `fintools_core=trace`). Overrides LOG_LEVEL.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log line format. Overrides LOG_FORMAT.
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DomainArg {
    Crypto,
    Forex,
}

impl From<DomainArg> for Domain {
    fn from(value: DomainArg) -> Self {
        match value {
            DomainArg::Crypto => Domain::Crypto,
            DomainArg::Forex => Domain::Forex,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List tool names and descriptions.
    ///
    /// # Examples
    ///
    ///   fintools tools
    ///   fintools tools --domain crypto --json
    Tools(ToolsArgs),

    /// Invoke one tool and print its result to stdout.
    ///
    /// Exits with 3 when the tool reports an error.
    ///
    /// # Examples
    ///
    ///   fintools call get_forex_conversion --arg from_currency=USD --arg to_currency=EUR
    ///   fintools call get_crypto_prices --args-json '{"symbols": "BTC,ETH"}'
    Call(CallArgs),
}

#[derive(Debug, Args)]
pub struct ToolsArgs {
    /// Only list tools of this domain.
    #[arg(long, value_enum)]
    pub domain: Option<DomainArg>,

    /// Print the catalogue (with parameters) as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CallArgs {
    /// Tool name, e.g. `get_forex_snapshot`.
    pub tool: String,

    /// Named argument as `key=value`; repeatable.
    #[arg(long = "arg", value_name = "KEY=VALUE")]
    pub args: Vec<String>,

    /// Arguments as one JSON object. `--arg` values override its keys.
    #[arg(long, value_name = "JSON")]
    pub args_json: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn call_collects_repeated_args() {
        let cli = Cli::parse_from([
            "fintools",
            "--log-format",
            "json",
            "call",
            "get_forex_history",
            "--arg",
            "ticker=EURUSD",
            "--arg",
            "timespan=hour",
        ]);
        assert_eq!(cli.log_format, Some(LogFormatArg::Json));
        let Command::Call(call) = cli.command else {
            panic!("expected call command");
        };
        assert_eq!(call.tool, "get_forex_history");
        assert_eq!(call.args, ["ticker=EURUSD", "timespan=hour"]);
    }
}
