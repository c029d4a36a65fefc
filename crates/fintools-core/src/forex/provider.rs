use std::sync::Arc;

use serde_json::Value;

use crate::error::DomainError;
use crate::executor::BoundedExecutor;
use crate::ticker::{forex_symbol, TickerPair};

use super::types::{Bar, IndicatorKind, IndicatorSeries, MoverDirection, SortOrder, Timespan};
use super::upstream::{AggregatesQuery, ForexUpstream, IndicatorQuery, QuotesQuery};

/// Conversion results are always requested with two decimals.
pub const CONVERSION_PRECISION: u8 = 2;
/// Upper bound the quotes listing is clamped to.
pub const MAX_QUOTES_LIMIT: u32 = 1_000;
/// Page size requested for aggregates.
pub const BARS_LIMIT: u32 = 50_000;
pub const DEFAULT_INDICATOR_LIMIT: u32 = 10;

/// Parameters of [`ForexProvider::historical_quotes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotesParams {
    pub timestamp: Option<String>,
    pub limit: Option<u32>,
    pub order: Option<SortOrder>,
    pub sort: Option<String>,
}

/// Parameters of [`ForexProvider::historical_bars`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarsRequest {
    pub ticker: String,
    pub multiplier: u32,
    pub timespan: Timespan,
    pub from: String,
    pub to: String,
    pub sort: SortOrder,
}

/// Parameters of [`ForexProvider::indicator`]. Unset fields take the
/// provider defaults (adjusted, newest first, ten points).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorParams {
    pub timespan: Timespan,
    pub window: u32,
    pub series_type: String,
    pub adjusted: Option<bool>,
    pub order: Option<SortOrder>,
    pub limit: Option<u32>,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            timespan: Timespan::Day,
            window: 14,
            series_type: String::from("close"),
            adjusted: None,
            order: None,
            limit: None,
        }
    }
}

/// Forex market data behind the bounded executor.
///
/// Methods only normalize their input; every failure comes from the
/// executor's classification.
#[derive(Clone)]
pub struct ForexProvider {
    upstream: Arc<dyn ForexUpstream>,
    executor: BoundedExecutor,
}

impl ForexProvider {
    pub fn new(upstream: Arc<dyn ForexUpstream>, executor: BoundedExecutor) -> Self {
        Self { upstream, executor }
    }

    pub async fn tickers(&self, limit: u32) -> Result<Value, DomainError> {
        let upstream = Arc::clone(&self.upstream);
        self.executor.run(move || upstream.list_tickers(limit)).await
    }

    pub async fn exchanges(&self, asset_class: &str, locale: &str) -> Result<Value, DomainError> {
        let upstream = Arc::clone(&self.upstream);
        let (asset_class, locale) = (asset_class.to_owned(), locale.to_owned());
        self.executor
            .run(move || upstream.list_exchanges(&asset_class, &locale))
            .await
    }

    pub async fn market_status(&self) -> Result<Value, DomainError> {
        let upstream = Arc::clone(&self.upstream);
        self.executor.run(move || upstream.market_status()).await
    }

    pub async fn conversion(
        &self,
        from: &str,
        to: &str,
        amount: f64,
    ) -> Result<Value, DomainError> {
        let upstream = Arc::clone(&self.upstream);
        let (from, to) = (from.trim().to_ascii_uppercase(), to.trim().to_ascii_uppercase());
        self.executor
            .run(move || upstream.currency_conversion(&from, &to, amount, CONVERSION_PRECISION))
            .await
    }

    /// Fails with `InvalidInput` before any upstream call when `ticker` is
    /// not a 6-char or hyphenated pair.
    pub async fn last_quote(&self, ticker: &str) -> Result<Value, DomainError> {
        let pair = TickerPair::parse(ticker)?;
        let upstream = Arc::clone(&self.upstream);
        self.executor
            .run(move || upstream.last_quote(pair.base(), pair.quote()))
            .await
    }

    /// Raw `results` of the quotes listing, oldest first unless overridden.
    pub async fn historical_quotes(
        &self,
        ticker: &str,
        params: QuotesParams,
    ) -> Result<Value, DomainError> {
        let symbol = forex_symbol(ticker);
        let query = QuotesQuery {
            timestamp: params.timestamp,
            order: params.order.unwrap_or(SortOrder::Asc),
            sort: params.sort.unwrap_or_else(|| String::from("timestamp")),
            limit: params.limit.unwrap_or(100).min(MAX_QUOTES_LIMIT),
        };
        let upstream = Arc::clone(&self.upstream);
        self.executor
            .run(move || upstream.list_quotes(&symbol, &query))
            .await
    }

    pub async fn snapshot(&self, ticker: &str) -> Result<Value, DomainError> {
        let symbol = forex_symbol(ticker);
        let upstream = Arc::clone(&self.upstream);
        self.executor
            .run(move || upstream.snapshot_ticker(&symbol))
            .await
    }

    pub async fn snapshot_all(&self, tickers: Option<String>) -> Result<Value, DomainError> {
        let upstream = Arc::clone(&self.upstream);
        self.executor
            .run(move || upstream.snapshot_all(tickers.as_deref()))
            .await
    }

    pub async fn market_movers(&self, direction: MoverDirection) -> Result<Value, DomainError> {
        let upstream = Arc::clone(&self.upstream);
        self.executor
            .run(move || upstream.snapshot_direction(direction))
            .await
    }

    pub async fn prev_close(&self, ticker: &str) -> Result<Value, DomainError> {
        let symbol = forex_symbol(ticker);
        let upstream = Arc::clone(&self.upstream);
        self.executor
            .run(move || upstream.previous_close(&symbol))
            .await
    }

    pub async fn historical_bars(&self, request: BarsRequest) -> Result<Vec<Bar>, DomainError> {
        let query = AggregatesQuery {
            ticker: forex_symbol(&request.ticker),
            multiplier: request.multiplier,
            timespan: request.timespan,
            from: request.from,
            to: request.to,
            adjusted: true,
            sort: request.sort,
            limit: BARS_LIMIT,
        };
        let upstream = Arc::clone(&self.upstream);
        self.executor
            .run(move || {
                let payload = upstream.aggregates(&query)?;
                Bar::list_from(&payload)
            })
            .await
    }

    pub async fn indicator(
        &self,
        kind: IndicatorKind,
        ticker: &str,
        params: IndicatorParams,
    ) -> Result<IndicatorSeries, DomainError> {
        let symbol = forex_symbol(ticker);
        let query = IndicatorQuery {
            timespan: params.timespan,
            window: params.window,
            series_type: params.series_type,
            adjusted: params.adjusted.unwrap_or(true),
            order: params.order.unwrap_or(SortOrder::Desc),
            limit: params.limit.unwrap_or(DEFAULT_INDICATOR_LIMIT),
        };
        let upstream = Arc::clone(&self.upstream);
        self.executor
            .run(move || {
                let payload = upstream.indicator(kind, &symbol, &query)?;
                IndicatorSeries::from_value(kind, &symbol, &payload)
            })
            .await
    }

    /// Same as [`Self::indicator`] with the kind given by name; an unknown
    /// name is `InvalidInput`.
    pub async fn indicator_by_name(
        &self,
        kind: &str,
        ticker: &str,
        params: IndicatorParams,
    ) -> Result<IndicatorSeries, DomainError> {
        let kind: IndicatorKind = kind.parse()?;
        self.indicator(kind, ticker, params).await
    }

    pub async fn market_holidays(&self) -> Result<Value, DomainError> {
        let upstream = Arc::clone(&self.upstream);
        self.executor.run(move || upstream.market_holidays()).await
    }
}
