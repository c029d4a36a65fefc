//! # Tool Registry
//!
//! Static catalogue of every tool with its parameters, plus dispatch by name.
//!
//! | Domain | Tools |
//! |--------|-------|
//! | `crypto` | 17 CoinMarketCap tools |
//! | `forex` | 13 Massive tools |
//!
//! Dispatch always yields a `String`: either the formatted result or an
//! `Error: ...` message.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use fintools_core::{ToolFailure, ERROR_PREFIX};

use crate::args::ToolArgs;
use crate::context::ToolContext;
use crate::{crypto_tools, forex_tools, monitor};

/// Upstream family a tool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Crypto,
    Forex,
}

impl Domain {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crypto => "crypto",
            Self::Forex => "forex",
        }
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "crypto" => Ok(Self::Crypto),
            "forex" => Ok(Self::Forex),
            other => Err(format!("unknown domain '{other}', expected crypto or forex")),
        }
    }
}

/// JSON type a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        required: true,
        description,
    }
}

const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        required: false,
        description,
    }
}

const SYMBOLS: ParamSpec = required(
    "symbols",
    ParamKind::String,
    "Comma-separated symbols (e.g. BTC,ETH)",
);
const FOREX_TICKER: ParamSpec = required("ticker", ParamKind::String, "Forex pair (e.g. EURUSD)");

/// Every tool the agent can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    CryptoPrices,
    TopCryptos,
    CryptoMetadata,
    HistoricalPrices,
    TrendingCryptos,
    GlobalCryptoMetrics,
    MarketPairs,
    LatestOhlcv,
    TopExchanges,
    CryptoMap,
    CryptoCategories,
    FearAndGreedIndex,
    HistoricalTopCryptos,
    LatestCryptoNews,
    BlockchainStatistics,
    Cmc20Index,
    PricePerformance,
    ForexTickers,
    ForexConversion,
    ForexLastQuote,
    ForexMarketStatus,
    ForexSnapshot,
    ForexMovers,
    ForexHistory,
    ForexHistoricalQuotes,
    ForexIndicator,
    ForexExchanges,
    ForexMarketSnapshot,
    ForexPrevClose,
    ForexMarketHolidays,
}

impl Tool {
    pub const ALL: [Self; 30] = [
        Self::CryptoPrices,
        Self::TopCryptos,
        Self::CryptoMetadata,
        Self::HistoricalPrices,
        Self::TrendingCryptos,
        Self::GlobalCryptoMetrics,
        Self::MarketPairs,
        Self::LatestOhlcv,
        Self::TopExchanges,
        Self::CryptoMap,
        Self::CryptoCategories,
        Self::FearAndGreedIndex,
        Self::HistoricalTopCryptos,
        Self::LatestCryptoNews,
        Self::BlockchainStatistics,
        Self::Cmc20Index,
        Self::PricePerformance,
        Self::ForexTickers,
        Self::ForexConversion,
        Self::ForexLastQuote,
        Self::ForexMarketStatus,
        Self::ForexSnapshot,
        Self::ForexMovers,
        Self::ForexHistory,
        Self::ForexHistoricalQuotes,
        Self::ForexIndicator,
        Self::ForexExchanges,
        Self::ForexMarketSnapshot,
        Self::ForexPrevClose,
        Self::ForexMarketHolidays,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::CryptoPrices => "get_crypto_prices",
            Self::TopCryptos => "get_top_cryptos",
            Self::CryptoMetadata => "get_crypto_metadata",
            Self::HistoricalPrices => "get_historical_prices",
            Self::TrendingCryptos => "get_trending_cryptos",
            Self::GlobalCryptoMetrics => "get_global_crypto_metrics",
            Self::MarketPairs => "get_market_pairs",
            Self::LatestOhlcv => "get_latest_ohlcv",
            Self::TopExchanges => "get_top_exchanges",
            Self::CryptoMap => "get_crypto_map",
            Self::CryptoCategories => "get_crypto_categories",
            Self::FearAndGreedIndex => "get_fear_and_greed_index",
            Self::HistoricalTopCryptos => "get_historical_top_cryptos",
            Self::LatestCryptoNews => "get_latest_crypto_news",
            Self::BlockchainStatistics => "get_blockchain_statistics",
            Self::Cmc20Index => "get_cmc20_index",
            Self::PricePerformance => "get_price_performance",
            Self::ForexTickers => "get_forex_tickers",
            Self::ForexConversion => "get_forex_conversion",
            Self::ForexLastQuote => "get_forex_last_quote",
            Self::ForexMarketStatus => "get_forex_market_status",
            Self::ForexSnapshot => "get_forex_snapshot",
            Self::ForexMovers => "get_forex_movers",
            Self::ForexHistory => "get_forex_history",
            Self::ForexHistoricalQuotes => "get_forex_historical_quotes",
            Self::ForexIndicator => "get_forex_indicator",
            Self::ForexExchanges => "get_forex_exchanges",
            Self::ForexMarketSnapshot => "get_forex_market_snapshot",
            Self::ForexPrevClose => "get_forex_prev_close",
            Self::ForexMarketHolidays => "get_forex_market_holidays",
        }
    }

    pub const fn domain(self) -> Domain {
        match self {
            Self::ForexTickers
            | Self::ForexConversion
            | Self::ForexLastQuote
            | Self::ForexMarketStatus
            | Self::ForexSnapshot
            | Self::ForexMovers
            | Self::ForexHistory
            | Self::ForexHistoricalQuotes
            | Self::ForexIndicator
            | Self::ForexExchanges
            | Self::ForexMarketSnapshot
            | Self::ForexPrevClose
            | Self::ForexMarketHolidays => Domain::Forex,
            _ => Domain::Crypto,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::CryptoPrices => "Get current price for one or more cryptocurrencies.",
            Self::TopCryptos => "Get top cryptocurrencies by market cap.",
            Self::CryptoMetadata => {
                "Get static metadata (logo, description, website) for cryptocurrencies."
            }
            Self::HistoricalPrices => "Get historical market quotes for cryptocurrencies.",
            Self::TrendingCryptos => "Get trending cryptocurrencies based on search volume.",
            Self::GlobalCryptoMetrics => "Get latest global cryptocurrency market metrics.",
            Self::MarketPairs => "Get active market pairs for a cryptocurrency.",
            Self::LatestOhlcv => "Get latest OHLCV data for cryptocurrencies.",
            Self::TopExchanges => "Get top exchanges by trading volume.",
            Self::CryptoMap => "Get mapping of all supported cryptocurrencies.",
            Self::CryptoCategories => "Get list of cryptocurrency categories.",
            Self::FearAndGreedIndex => "Get the latest Crypto Fear and Greed Index.",
            Self::HistoricalTopCryptos => {
                "Get historical top cryptocurrencies by market cap on a specific date."
            }
            Self::LatestCryptoNews => "Get latest cryptocurrency news and articles.",
            Self::BlockchainStatistics => "Get latest blockchain network statistics.",
            Self::Cmc20Index => "Get the latest CMC 20 Index value and constituents.",
            Self::PricePerformance => "Get price performance stats for cryptocurrencies.",
            Self::ForexTickers => "Retrieve a list of supported forex currency pairs.",
            Self::ForexConversion => "Real-time conversion between two currencies.",
            Self::ForexLastQuote => "Get the most recent bid/ask quote for a currency pair.",
            Self::ForexMarketStatus => "Get current trading status for forex markets.",
            Self::ForexSnapshot => "Get a market data snapshot for a single ticker.",
            Self::ForexMovers => "Get top market movers (gainers/losers).",
            Self::ForexHistory => "Get historical OHLC bars for a custom range.",
            Self::ForexHistoricalQuotes => "Retrieve historical bid/ask (BBO) quotes.",
            Self::ForexIndicator => {
                "Calculate technical indicators (SMA, EMA, RSI, MACD, Bollinger)."
            }
            Self::ForexExchanges => "Retrieve a list of known forex exchanges.",
            Self::ForexMarketSnapshot => "Retrieve a snapshot of the entire forex market.",
            Self::ForexPrevClose => {
                "Retrieve the previous trading day's OHLC data for a currency pair."
            }
            Self::ForexMarketHolidays => "Get upcoming market holidays and early closes.",
        }
    }

    pub fn params(self) -> &'static [ParamSpec] {
        use ParamKind::{Integer, Number, String as Text};

        match self {
            Self::CryptoPrices
            | Self::CryptoMetadata
            | Self::LatestOhlcv
            | Self::PricePerformance => &[SYMBOLS],
            Self::TopCryptos | Self::TopExchanges => {
                const { &[optional("limit", Integer, "Number of results (1-100, default 10)")] }
            }
            Self::HistoricalPrices => const {
                &[
                    SYMBOLS,
                    optional("time_start", Text, "Start time (ISO 8601 or Unix timestamp)"),
                    optional("time_end", Text, "End time (ISO 8601 or Unix timestamp)"),
                    optional("interval", Text, "Data interval (e.g. 5m, hourly, daily)"),
                ]
            },
            Self::TrendingCryptos => const {
                &[
                    optional("limit", Integer, "Number of trending cryptos (1-100, default 10)"),
                    optional("time_period", Text, "Time period (1h, 24h, 7d, 30d)"),
                ]
            },
            Self::GlobalCryptoMetrics
            | Self::FearAndGreedIndex
            | Self::Cmc20Index
            | Self::ForexMarketStatus
            | Self::ForexMarketHolidays => &[],
            Self::MarketPairs => const {
                &[
                    required("symbol", Text, "Single symbol (e.g. BTC)"),
                    optional("limit", Integer, "Number of market pairs (1-100, default 10)"),
                ]
            },
            Self::CryptoMap => const {
                &[
                    optional("limit", Integer, "Number of cryptos (1-5000, default 100)"),
                    optional("listing_status", Text, "active, inactive or untracked"),
                ]
            },
            Self::CryptoCategories => {
                const { &[optional("limit", Integer, "Number of categories (1-500, default 100)")] }
            }
            Self::HistoricalTopCryptos => const {
                &[
                    required("date", Text, "Historical date (YYYY-MM-DD)"),
                    optional("limit", Integer, "Number of cryptocurrencies (1-100, default 10)"),
                ]
            },
            Self::LatestCryptoNews => const {
                &[
                    optional("symbol", Text, "Comma-separated symbols (e.g. BTC,ETH)"),
                    optional("limit", Integer, "Number of news items (1-100, default 10)"),
                ]
            },
            Self::BlockchainStatistics => {
                const { &[required("slug", Text, "Blockchain slug (e.g. bitcoin, ethereum)")] }
            }
            Self::ForexTickers => {
                const { &[optional("limit", Integer, "Number of tickers (1-1000, default 100)")] }
            }
            Self::ForexConversion => const {
                &[
                    required("from_currency", Text, "Source currency (e.g. USD)"),
                    required("to_currency", Text, "Target currency (e.g. EUR)"),
                    optional("amount", Number, "Amount to convert (default 1)"),
                ]
            },
            Self::ForexLastQuote | Self::ForexSnapshot | Self::ForexPrevClose => &[FOREX_TICKER],
            Self::ForexMovers => const { &[required("direction", Text, "gainers or losers")] },
            Self::ForexHistory => const {
                &[
                    FOREX_TICKER,
                    optional("multiplier", Integer, "Bar size multiplier (default 1)"),
                    optional("timespan", Text, "minute, hour, day, week, month, quarter or year"),
                    optional("from_date", Text, "Start date (YYYY-MM-DD)"),
                    optional("to_date", Text, "End date (YYYY-MM-DD)"),
                ]
            },
            Self::ForexHistoricalQuotes => const {
                &[
                    FOREX_TICKER,
                    optional("timestamp", Text, "Date (YYYY-MM-DD), defaults to today"),
                    optional("limit", Integer, "Max results (default 100)"),
                ]
            },
            Self::ForexIndicator => const {
                &[
                    required("indicator", Text, "sma, ema, macd, rsi or bollinger"),
                    FOREX_TICKER,
                    optional("timespan", Text, "Aggregate window (default day)"),
                    optional("window", Integer, "Window size (default 14)"),
                    optional("series_type", Text, "open, high, low or close"),
                    optional("limit", Integer, "Number of values (default 10)"),
                ]
            },
            Self::ForexExchanges => const {
                &[
                    optional("asset_class", Text, "Asset class (default fx)"),
                    optional("locale", Text, "Locale (default global)"),
                ]
            },
            Self::ForexMarketSnapshot => const {
                &[
                    optional("tickers", Text, "Comma-separated pairs to include"),
                    optional("limit", Integer, "Rows to show (1-1000, default 100)"),
                ]
            },
        }
    }
}

impl Display for Tool {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let name = value.trim();
        Self::ALL
            .into_iter()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| format!("{ERROR_PREFIX} Unknown tool '{name}'."))
    }
}

/// Runs `tool` and renders its outcome through the domain's translator.
pub async fn dispatch(ctx: &ToolContext, tool: Tool, args: &ToolArgs) -> String {
    let result: Result<String, ToolFailure> = match tool {
        Tool::CryptoPrices => crypto_tools::prices(ctx, args).await,
        Tool::TopCryptos => crypto_tools::top(ctx, args).await,
        Tool::CryptoMetadata => crypto_tools::metadata(ctx, args).await,
        Tool::HistoricalPrices => crypto_tools::historical_prices(ctx, args).await,
        Tool::TrendingCryptos => crypto_tools::trending(ctx, args).await,
        Tool::GlobalCryptoMetrics => crypto_tools::global_metrics(ctx, args).await,
        Tool::MarketPairs => crypto_tools::market_pairs(ctx, args).await,
        Tool::LatestOhlcv => crypto_tools::latest_ohlcv(ctx, args).await,
        Tool::TopExchanges => crypto_tools::top_exchanges(ctx, args).await,
        Tool::CryptoMap => crypto_tools::map(ctx, args).await,
        Tool::CryptoCategories => crypto_tools::categories(ctx, args).await,
        Tool::FearAndGreedIndex => crypto_tools::fear_and_greed(ctx, args).await,
        Tool::HistoricalTopCryptos => crypto_tools::historical_top(ctx, args).await,
        Tool::LatestCryptoNews => crypto_tools::latest_news(ctx, args).await,
        Tool::BlockchainStatistics => crypto_tools::blockchain_statistics(ctx, args).await,
        Tool::Cmc20Index => crypto_tools::cmc20_index(ctx, args).await,
        Tool::PricePerformance => crypto_tools::price_performance(ctx, args).await,
        Tool::ForexTickers => forex_tools::tickers(ctx, args).await,
        Tool::ForexConversion => forex_tools::conversion(ctx, args).await,
        Tool::ForexLastQuote => forex_tools::last_quote(ctx, args).await,
        Tool::ForexMarketStatus => forex_tools::market_status(ctx, args).await,
        Tool::ForexSnapshot => forex_tools::snapshot(ctx, args).await,
        Tool::ForexMovers => forex_tools::movers(ctx, args).await,
        Tool::ForexHistory => forex_tools::history(ctx, args).await,
        Tool::ForexHistoricalQuotes => forex_tools::historical_quotes(ctx, args).await,
        Tool::ForexIndicator => forex_tools::indicator(ctx, args).await,
        Tool::ForexExchanges => forex_tools::exchanges(ctx, args).await,
        Tool::ForexMarketSnapshot => forex_tools::market_snapshot(ctx, args).await,
        Tool::ForexPrevClose => forex_tools::prev_close(ctx, args).await,
        Tool::ForexMarketHolidays => forex_tools::market_holidays(ctx, args).await,
    };

    ctx.render(tool.domain(), result)
}

/// Entry point agents and the CLI call tools through.
#[derive(Clone)]
pub struct ToolRegistry {
    ctx: Arc<ToolContext>,
}

impl ToolRegistry {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &ToolContext {
        &self.ctx
    }

    /// Tools of `domain`, or all of them, in catalogue order.
    pub fn list(domain: Option<Domain>) -> Vec<Tool> {
        Tool::ALL
            .into_iter()
            .filter(|tool| domain.map_or(true, |domain| tool.domain() == domain))
            .collect()
    }

    /// Calls `name` with a JSON object of arguments. Never fails: problems
    /// come back as `Error: ...` text.
    pub async fn call(&self, name: &str, arguments: Value) -> String {
        let tool = match name.parse::<Tool>() {
            Ok(tool) => tool,
            Err(message) => {
                tracing::warn!(tool = name, "unknown tool requested");
                return message;
            }
        };

        let args = match ToolArgs::from_value(arguments) {
            Ok(args) => args,
            Err(error) => return self.ctx.translator(tool.domain()).translate(&error.into()),
        };

        monitor::run(Arc::clone(&self.ctx), tool, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalogue_has_unique_names_per_domain() {
        let names: HashSet<_> = Tool::ALL.iter().map(|tool| tool.name()).collect();
        assert_eq!(names.len(), 30);
        assert_eq!(ToolRegistry::list(Some(Domain::Crypto)).len(), 17);
        assert_eq!(ToolRegistry::list(Some(Domain::Forex)).len(), 13);
    }

    #[test]
    fn names_parse_back() {
        for tool in Tool::ALL {
            assert_eq!(tool.name().parse::<Tool>(), Ok(tool));
        }
    }

    #[test]
    fn unknown_tool_is_an_error_string() {
        let err = "get_weather".parse::<Tool>().expect_err("not a tool");
        assert_eq!(err, "Error: Unknown tool 'get_weather'.");
    }

    #[test]
    fn required_params_are_listed() {
        let params = Tool::ForexConversion.params();
        let required: Vec<_> = params.iter().filter(|p| p.required).map(|p| p.name).collect();
        assert_eq!(required, ["from_currency", "to_currency"]);
        assert!(Tool::GlobalCryptoMetrics.params().is_empty());
    }

    #[test]
    fn domain_parses_case_insensitively() {
        assert_eq!("FOREX".parse::<Domain>(), Ok(Domain::Forex));
        assert!("stocks".parse::<Domain>().is_err());
    }
}
