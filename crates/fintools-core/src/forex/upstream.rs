use serde_json::Value;

use crate::error::UpstreamError;

use super::types::{IndicatorKind, MoverDirection, SortOrder, Timespan};

pub type UpstreamResult = Result<Value, UpstreamError>;

/// Query for the historical quotes (BBO) listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotesQuery {
    /// `YYYY-MM-DD` or Unix milliseconds.
    pub timestamp: Option<String>,
    pub order: SortOrder,
    pub sort: String,
    pub limit: u32,
}

/// Query for OHLC aggregates over a date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatesQuery {
    pub ticker: String,
    pub multiplier: u32,
    pub timespan: Timespan,
    pub from: String,
    pub to: String,
    pub adjusted: bool,
    pub sort: SortOrder,
    pub limit: u32,
}

/// Query shared by every technical indicator endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorQuery {
    pub timespan: Timespan,
    pub window: u32,
    pub series_type: String,
    pub adjusted: bool,
    pub order: SortOrder,
    pub limit: u32,
}

/// Blocking forex market-data surface.
///
/// Each method performs one upstream round trip and returns the payload
/// with its response envelope removed. Implementations may block the
/// calling thread; they are only ever called from executor workers.
pub trait ForexUpstream: Send + Sync {
    fn list_tickers(&self, limit: u32) -> UpstreamResult;

    fn list_exchanges(&self, asset_class: &str, locale: &str) -> UpstreamResult;

    fn market_status(&self) -> UpstreamResult;

    fn currency_conversion(
        &self,
        from: &str,
        to: &str,
        amount: f64,
        precision: u8,
    ) -> UpstreamResult;

    /// Last bid/ask for a (base, quote) pair; payload carries a `last` object.
    fn last_quote(&self, base: &str, quote: &str) -> UpstreamResult;

    /// Raw `results` array of the quotes listing.
    fn list_quotes(&self, ticker: &str, query: &QuotesQuery) -> UpstreamResult;

    fn snapshot_ticker(&self, ticker: &str) -> UpstreamResult;

    /// `tickers` is a comma-separated filter.
    fn snapshot_all(&self, tickers: Option<&str>) -> UpstreamResult;

    fn snapshot_direction(&self, direction: MoverDirection) -> UpstreamResult;

    fn previous_close(&self, ticker: &str) -> UpstreamResult;

    fn aggregates(&self, query: &AggregatesQuery) -> UpstreamResult;

    fn indicator(
        &self,
        kind: IndicatorKind,
        ticker: &str,
        query: &IndicatorQuery,
    ) -> UpstreamResult;

    fn market_holidays(&self) -> UpstreamResult;
}
