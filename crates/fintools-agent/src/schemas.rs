//! Validated inputs, one per tool.
//!
//! Each `from_args` normalizes case and whitespace, applies defaults and
//! enforces the ranges the upstream APIs accept. Failures are
//! [`ValidationError`]s, rendered as `Error: Invalid input: ...`.

use std::sync::LazyLock;

use regex::Regex;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use fintools_core::{MoverDirection, Timespan, ValidationError};

use crate::args::ToolArgs;

static FOREX_TICKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]{1,2}:)?[A-Z0-9]{3,10}$").expect("forex ticker pattern is valid")
});
static CURRENCY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("currency pattern is valid"));
static CRYPTO_SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{1,10}$").expect("crypto symbol pattern is valid"));
static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]{1,50}$").expect("slug pattern is valid"));

const SERIES_TYPES: [&str; 4] = ["open", "high", "low", "close"];
const TRENDING_PERIODS: [&str; 4] = ["1h", "24h", "7d", "30d"];
const LISTING_STATUSES: [&str; 3] = ["active", "inactive", "untracked"];

// ============================================================================
// Shared field validators
// ============================================================================

pub fn forex_ticker(raw: &str) -> Result<String, ValidationError> {
    let ticker = raw.trim().to_ascii_uppercase();
    if FOREX_TICKER.is_match(&ticker) {
        Ok(ticker)
    } else {
        Err(ValidationError::InvalidForexTicker { value: ticker })
    }
}

pub fn currency(raw: &str) -> Result<String, ValidationError> {
    let code = raw.trim().to_ascii_uppercase();
    if CURRENCY.is_match(&code) {
        Ok(code)
    } else {
        Err(ValidationError::InvalidCurrency { value: code })
    }
}

/// Comma-separated crypto symbols, upper-cased; blanks between commas are dropped.
pub fn crypto_symbols(field: &'static str, raw: &str) -> Result<Vec<String>, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    let symbols: Vec<String> = raw
        .split(',')
        .map(|symbol| symbol.trim().to_ascii_uppercase())
        .filter(|symbol| !symbol.is_empty())
        .collect();
    if symbols.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if let Some(bad) = symbols.iter().find(|symbol| !CRYPTO_SYMBOL.is_match(symbol)) {
        return Err(ValidationError::InvalidCryptoSymbol { value: bad.clone() });
    }
    Ok(symbols)
}

pub fn crypto_symbol(raw: &str) -> Result<String, ValidationError> {
    let symbol = raw.trim().to_ascii_uppercase();
    if CRYPTO_SYMBOL.is_match(&symbol) {
        Ok(symbol)
    } else {
        Err(ValidationError::InvalidCryptoSymbol { value: symbol })
    }
}

pub fn slug(raw: &str) -> Result<String, ValidationError> {
    let slug = raw.trim().to_ascii_lowercase();
    if SLUG.is_match(&slug) {
        Ok(slug)
    } else {
        Err(ValidationError::InvalidSlug { value: slug })
    }
}

pub fn date(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .map(|_| trimmed.to_owned())
        .map_err(|_| ValidationError::InvalidDate {
            field,
            value: trimmed.to_owned(),
        })
}

/// Today's UTC date as `YYYY-MM-DD`.
pub fn today() -> String {
    OffsetDateTime::now_utc()
        .date()
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| String::from("1970-01-01"))
}

fn one_of(field: &'static str, raw: &str, allowed: &[&str]) -> Result<String, ValidationError> {
    let lowered = raw.trim().to_ascii_lowercase();
    if allowed.contains(&lowered.as_str()) {
        Ok(lowered)
    } else {
        Err(ValidationError::NotAllowed {
            field,
            value: raw.to_owned(),
            allowed: allowed.join(", "),
        })
    }
}

// ============================================================================
// Forex inputs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForexTickerInput {
    pub ticker: String,
}

impl ForexTickerInput {
    pub fn from_args(args: &ToolArgs) -> Result<Self, ValidationError> {
        Ok(Self {
            ticker: forex_ticker(&args.req_str("ticker")?)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickersListInput {
    pub limit: u32,
}

impl TickersListInput {
    pub fn from_args(args: &ToolArgs) -> Result<Self, ValidationError> {
        Ok(Self {
            limit: args.int_in("limit", 100, 1, 1000)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionInput {
    pub from_currency: String,
    pub to_currency: String,
    pub amount: f64,
}

impl ConversionInput {
    pub fn from_args(args: &ToolArgs) -> Result<Self, ValidationError> {
        let amount = args.opt_f64("amount")?.unwrap_or(1.0);
        if !(amount > 0.0) || !amount.is_finite() {
            return Err(ValidationError::NotPositive { field: "amount" });
        }
        Ok(Self {
            from_currency: currency(&args.req_str("from_currency")?)?,
            to_currency: currency(&args.req_str("to_currency")?)?,
            amount,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalQuotesInput {
    pub ticker: String,
    /// `YYYY-MM-DD` or Unix milliseconds; today when omitted.
    pub timestamp: String,
    pub limit: u32,
}

impl HistoricalQuotesInput {
    pub fn from_args(args: &ToolArgs) -> Result<Self, ValidationError> {
        let timestamp = match args.opt_str("timestamp")? {
            None => today(),
            Some(raw) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => raw,
            Some(raw) => date("timestamp", &raw)?,
        };
        Ok(Self {
            ticker: forex_ticker(&args.req_str("ticker")?)?,
            timestamp,
            limit: args.int_in("limit", 100, 1, 50_000)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketMoversInput {
    pub direction: MoverDirection,
}

impl MarketMoversInput {
    pub fn from_args(args: &ToolArgs) -> Result<Self, ValidationError> {
        Ok(Self {
            direction: args.req_str("direction")?.parse()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomBarsInput {
    pub ticker: String,
    pub multiplier: u32,
    pub timespan: Timespan,
    pub from_date: String,
    pub to_date: String,
}

impl CustomBarsInput {
    pub fn from_args(args: &ToolArgs) -> Result<Self, ValidationError> {
        Ok(Self {
            ticker: forex_ticker(&args.req_str("ticker")?)?,
            multiplier: args.int_in("multiplier", 1, 1, i64::from(u32::MAX))?,
            timespan: args.str_or("timespan", "day")?.parse()?,
            from_date: date("from_date", &args.str_or("from_date", "2024-01-01")?)?,
            to_date: date("to_date", &args.str_or("to_date", "2024-01-07")?)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorInput {
    pub indicator: String,
    pub ticker: String,
    pub timespan: Timespan,
    pub window: u32,
    pub series_type: String,
    pub limit: u32,
}

impl IndicatorInput {
    /// The indicator name is kept as given; the provider rejects unknown kinds.
    pub fn from_args(args: &ToolArgs) -> Result<Self, ValidationError> {
        Ok(Self {
            indicator: args.req_str("indicator")?,
            ticker: forex_ticker(&args.req_str("ticker")?)?,
            timespan: args.str_or("timespan", "day")?.parse()?,
            window: args.int_in("window", 14, 1, i64::from(u32::MAX))?,
            series_type: one_of(
                "series_type",
                &args.str_or("series_type", "close")?,
                &SERIES_TYPES,
            )?,
            limit: args.int_in("limit", 10, 1, 5_000)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangesInput {
    pub asset_class: String,
    pub locale: String,
}

impl ExchangesInput {
    pub fn from_args(args: &ToolArgs) -> Result<Self, ValidationError> {
        Ok(Self {
            asset_class: args.str_or("asset_class", "fx")?.to_ascii_lowercase(),
            locale: args.str_or("locale", "global")?.to_ascii_lowercase(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketSnapshotInput {
    /// Normalized comma-separated filter.
    pub tickers: Option<String>,
    pub limit: u32,
}

impl MarketSnapshotInput {
    pub fn from_args(args: &ToolArgs) -> Result<Self, ValidationError> {
        let tickers = args.opt_str("tickers")?.map(|raw| {
            raw.split(',')
                .map(|ticker| ticker.trim().to_ascii_uppercase())
                .filter(|ticker| !ticker.is_empty())
                .collect::<Vec<_>>()
                .join(",")
        });
        Ok(Self {
            tickers: tickers.filter(|joined| !joined.is_empty()),
            limit: args.int_in("limit", 100, 1, 1000)?,
        })
    }
}

// ============================================================================
// Crypto inputs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolsInput {
    pub symbols: Vec<String>,
}

impl SymbolsInput {
    pub fn from_args(args: &ToolArgs) -> Result<Self, ValidationError> {
        let raw = args.opt_str("symbols")?.unwrap_or_default();
        Ok(Self {
            symbols: crypto_symbols("symbols", &raw)?,
        })
    }

    pub fn joined(&self) -> String {
        self.symbols.join(",")
    }
}

/// Input of tools that only take a bounded `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitInput {
    pub limit: u32,
}

impl LimitInput {
    pub fn from_args(args: &ToolArgs, default: i64, max: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            limit: args.int_in("limit", default, 1, max)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalPricesInput {
    pub symbols: Vec<String>,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
    pub interval: String,
}

impl HistoricalPricesInput {
    pub fn from_args(args: &ToolArgs) -> Result<Self, ValidationError> {
        Ok(Self {
            symbols: SymbolsInput::from_args(args)?.symbols,
            time_start: args.opt_str("time_start")?,
            time_end: args.opt_str("time_end")?,
            interval: args.str_or("interval", "daily")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendingInput {
    pub limit: u32,
    pub time_period: String,
}

impl TrendingInput {
    pub fn from_args(args: &ToolArgs) -> Result<Self, ValidationError> {
        Ok(Self {
            limit: args.int_in("limit", 10, 1, 100)?,
            time_period: one_of(
                "time_period",
                &args.str_or("time_period", "24h")?,
                &TRENDING_PERIODS,
            )?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketPairsInput {
    pub symbol: String,
    pub limit: u32,
}

impl MarketPairsInput {
    pub fn from_args(args: &ToolArgs) -> Result<Self, ValidationError> {
        Ok(Self {
            symbol: crypto_symbol(&args.req_str("symbol")?)?,
            limit: args.int_in("limit", 10, 1, 100)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoMapInput {
    pub limit: u32,
    pub listing_status: String,
}

impl CryptoMapInput {
    pub fn from_args(args: &ToolArgs) -> Result<Self, ValidationError> {
        Ok(Self {
            limit: args.int_in("limit", 100, 1, 5_000)?,
            listing_status: one_of(
                "listing_status",
                &args.str_or("listing_status", "active")?,
                &LISTING_STATUSES,
            )?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalListingsInput {
    pub date: String,
    pub limit: u32,
}

impl HistoricalListingsInput {
    pub fn from_args(args: &ToolArgs) -> Result<Self, ValidationError> {
        Ok(Self {
            date: date("date", &args.req_str("date")?)?,
            limit: args.int_in("limit", 10, 1, 100)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestContentInput {
    pub symbols: Option<Vec<String>>,
    pub limit: u32,
}

impl LatestContentInput {
    pub fn from_args(args: &ToolArgs) -> Result<Self, ValidationError> {
        let symbols = args
            .opt_str("symbol")?
            .map(|raw| crypto_symbols("symbol", &raw))
            .transpose()?;
        Ok(Self {
            symbols,
            limit: args.int_in("limit", 10, 1, 100)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockchainStatsInput {
    pub slug: String,
}

impl BlockchainStatsInput {
    pub fn from_args(args: &ToolArgs) -> Result<Self, ValidationError> {
        Ok(Self {
            slug: slug(&args.req_str("slug")?)?,
        })
    }
}
