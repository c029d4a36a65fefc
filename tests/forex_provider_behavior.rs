//! Behavior-driven tests for the forex provider adapter
//!
//! A scripted upstream records every call so these tests can verify WHAT the
//! adapter asks for (normalized tickers, defaults, caps) and HOW it shapes
//! the answer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use fintools_core::forex::{
    AggregatesQuery, IndicatorQuery, QuotesQuery, UpstreamResult, BARS_LIMIT, MAX_QUOTES_LIMIT,
};
use fintools_core::{
    BarsRequest, BoundedExecutor, DomainErrorKind, ForexProvider, ForexUpstream, IndicatorKind,
    IndicatorParams, MoverDirection, QuotesParams, SortOrder, TickerPair, Timespan, UpstreamError,
};

#[derive(Default)]
struct ScriptedUpstream {
    responses: Mutex<HashMap<&'static str, Value>>,
    failure_status: Option<u16>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedUpstream {
    fn with(self, method: &'static str, payload: Value) -> Self {
        self.responses
            .lock()
            .expect("responses lock")
            .insert(method, payload);
        self
    }

    fn failing(status: u16) -> Self {
        Self {
            failure_status: Some(status),
            ..Self::default()
        }
    }

    fn answer(&self, method: &'static str, call: String) -> UpstreamResult {
        self.calls.lock().expect("calls lock").push(call);
        if let Some(status) = self.failure_status {
            return Err(UpstreamError::status(status, "scripted failure"));
        }
        Ok(self
            .responses
            .lock()
            .expect("responses lock")
            .get(method)
            .cloned()
            .unwrap_or_else(|| json!({})))
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl ForexUpstream for ScriptedUpstream {
    fn list_tickers(&self, limit: u32) -> UpstreamResult {
        self.answer("list_tickers", format!("list_tickers {limit}"))
    }

    fn list_exchanges(&self, asset_class: &str, locale: &str) -> UpstreamResult {
        self.answer("list_exchanges", format!("list_exchanges {asset_class} {locale}"))
    }

    fn market_status(&self) -> UpstreamResult {
        self.answer("market_status", String::from("market_status"))
    }

    fn currency_conversion(
        &self,
        from: &str,
        to: &str,
        amount: f64,
        precision: u8,
    ) -> UpstreamResult {
        self.answer(
            "currency_conversion",
            format!("currency_conversion {from} {to} {amount} {precision}"),
        )
    }

    fn last_quote(&self, base: &str, quote: &str) -> UpstreamResult {
        self.answer("last_quote", format!("last_quote {base} {quote}"))
    }

    fn list_quotes(&self, ticker: &str, query: &QuotesQuery) -> UpstreamResult {
        self.answer(
            "list_quotes",
            format!(
                "list_quotes {ticker} {:?} {} {} {}",
                query.timestamp,
                query.order.as_str(),
                query.sort,
                query.limit
            ),
        )
    }

    fn snapshot_ticker(&self, ticker: &str) -> UpstreamResult {
        self.answer("snapshot_ticker", format!("snapshot_ticker {ticker}"))
    }

    fn snapshot_all(&self, tickers: Option<&str>) -> UpstreamResult {
        self.answer("snapshot_all", format!("snapshot_all {tickers:?}"))
    }

    fn snapshot_direction(&self, direction: MoverDirection) -> UpstreamResult {
        self.answer(
            "snapshot_direction",
            format!("snapshot_direction {}", direction.as_str()),
        )
    }

    fn previous_close(&self, ticker: &str) -> UpstreamResult {
        self.answer("previous_close", format!("previous_close {ticker}"))
    }

    fn aggregates(&self, query: &AggregatesQuery) -> UpstreamResult {
        self.answer(
            "aggregates",
            format!(
                "aggregates {} {} {} {} {} adjusted={} {} {}",
                query.ticker,
                query.multiplier,
                query.timespan,
                query.from,
                query.to,
                query.adjusted,
                query.sort.as_str(),
                query.limit
            ),
        )
    }

    fn indicator(
        &self,
        kind: IndicatorKind,
        ticker: &str,
        query: &IndicatorQuery,
    ) -> UpstreamResult {
        self.answer(
            "indicator",
            format!(
                "indicator {} {ticker} {} {} {} adjusted={} {} {}",
                kind.as_str(),
                query.timespan,
                query.window,
                query.series_type,
                query.adjusted,
                query.order.as_str(),
                query.limit
            ),
        )
    }

    fn market_holidays(&self) -> UpstreamResult {
        self.answer("market_holidays", String::from("market_holidays"))
    }
}

fn provider(upstream: &Arc<ScriptedUpstream>) -> ForexProvider {
    let upstream: Arc<dyn ForexUpstream> = Arc::clone(upstream) as Arc<dyn ForexUpstream>;
    ForexProvider::new(upstream, BoundedExecutor::default())
}

// =============================================================================
// Ticker normalization
// =============================================================================

#[test]
fn plain_and_hyphenated_pairs_parse_to_the_same_pair() {
    // Given / When: The two accepted spellings of one pair
    let plain = TickerPair::parse("EURUSD").expect("plain pair");
    let hyphenated = TickerPair::parse("EUR-USD").expect("hyphenated pair");

    // Then: They are equal
    assert_eq!(plain, hyphenated);
    assert_eq!(plain.base(), "EUR");
    assert_eq!(plain.quote(), "USD");
}

#[test]
fn malformed_pairs_are_invalid_input() {
    for raw in ["EU", "EURUSDX", "EUR-US", "E-U", "EURO-USDT", "EUR-USD-GBP", ""] {
        let error = TickerPair::parse(raw).expect_err(raw);
        assert_eq!(error.kind(), DomainErrorKind::InvalidInput, "{raw}");
    }
}

#[tokio::test]
async fn when_last_quote_is_requested_with_either_spelling_upstream_gets_base_and_quote() {
    // Given: A scripted upstream
    let upstream = Arc::new(ScriptedUpstream::default().with(
        "last_quote",
        json!({ "last": { "ask": 1.0852, "bid": 1.085 }, "symbol": "EUR/USD" }),
    ));
    let forex = provider(&upstream);

    // When: The same pair is requested both ways
    let first = forex.last_quote("EURUSD").await.expect("plain pair");
    let second = forex.last_quote("c:eur-usd").await.expect("hyphenated pair");

    // Then: Both reach upstream as EUR/USD and the payload is unchanged
    assert_eq!(upstream.calls(), ["last_quote EUR USD", "last_quote EUR USD"]);
    assert_eq!(first, second);
    assert_eq!(first["last"]["bid"], json!(1.085));
}

#[tokio::test]
async fn when_last_quote_ticker_is_malformed_upstream_is_never_called() {
    // Given: A scripted upstream
    let upstream = Arc::new(ScriptedUpstream::default());
    let forex = provider(&upstream);

    // When: A malformed ticker is requested
    let error = forex.last_quote("EU").await.expect_err("malformed");

    // Then: Input is rejected locally
    assert_eq!(error.kind(), DomainErrorKind::InvalidInput);
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn when_a_snapshot_is_requested_ticker_gets_the_provider_prefix() {
    let upstream = Arc::new(ScriptedUpstream::default());
    let forex = provider(&upstream);

    forex.snapshot("eurusd").await.expect("snapshot");
    forex.snapshot("C:GBPUSD").await.expect("snapshot");
    forex.prev_close("usdjpy").await.expect("prev close");

    assert_eq!(
        upstream.calls(),
        [
            "snapshot_ticker C:EURUSD",
            "snapshot_ticker C:GBPUSD",
            "previous_close C:USDJPY"
        ]
    );
}

// =============================================================================
// Defaults and caps
// =============================================================================

#[tokio::test]
async fn when_historical_quotes_exceed_the_cap_limit_is_clamped() {
    // Given: A request for far more quotes than allowed
    let upstream = Arc::new(
        ScriptedUpstream::default().with("list_quotes", json!([{ "bid_price": 1.1 }])),
    );
    let forex = provider(&upstream);

    // When: It is sent
    let quotes = forex
        .historical_quotes(
            "EURUSD",
            QuotesParams {
                timestamp: Some(String::from("2024-01-02")),
                limit: Some(50_000),
                ..QuotesParams::default()
            },
        )
        .await
        .expect("quotes");

    // Then: Upstream sees the cap and the ascending timestamp order
    assert_eq!(
        upstream.calls(),
        [format!(
            "list_quotes C:EURUSD Some(\"2024-01-02\") asc timestamp {MAX_QUOTES_LIMIT}"
        )]
    );
    assert_eq!(quotes, json!([{ "bid_price": 1.1 }]));
}

#[tokio::test]
async fn when_conversion_is_requested_codes_are_upper_cased_with_two_decimals() {
    let upstream = Arc::new(ScriptedUpstream::default());
    let forex = provider(&upstream);

    forex.conversion(" usd", "eur ", 250.5).await.expect("conversion");

    assert_eq!(upstream.calls(), ["currency_conversion USD EUR 250.5 2"]);
}

#[tokio::test]
async fn when_bars_are_requested_payload_aliases_are_normalized() {
    // Given: Aggregates in the short wire form
    let upstream = Arc::new(ScriptedUpstream::default().with(
        "aggregates",
        json!([
            {
                "t": 1704153600000_i64, "o": 1.1, "h": 1.2, "l": 1.0, "c": 1.15,
                "v": 120, "vw": 1.12, "n": 7
            },
            { "timestamp": 1704240000000_i64, "open": 1.15, "high": 1.25, "low": 1.1, "close": 1.2 }
        ]),
    ));
    let forex = provider(&upstream);

    // When: Hourly bars are requested
    let bars = forex
        .historical_bars(BarsRequest {
            ticker: String::from("EURUSD"),
            multiplier: 2,
            timespan: Timespan::Hour,
            from: String::from("2024-01-01"),
            to: String::from("2024-01-07"),
            sort: SortOrder::Asc,
        })
        .await
        .expect("bars");

    // Then: Both spellings decode to the same record shape
    assert_eq!(
        upstream.calls(),
        [format!(
            "aggregates C:EURUSD 2 hour 2024-01-01 2024-01-07 adjusted=true asc {BARS_LIMIT}"
        )]
    );
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].close, 1.15);
    assert_eq!(bars[0].transactions, Some(7));
    assert_eq!(bars[1].timestamp, 1_704_240_000_000);
    assert_eq!(bars[1].volume, None);
}

#[tokio::test]
async fn when_indicator_is_requested_defaults_apply() {
    // Given: An RSI series
    let upstream = Arc::new(ScriptedUpstream::default().with(
        "indicator",
        json!({ "values": [{ "timestamp": 1, "value": 55.2 }, { "timestamp": 2, "value": 61.0 }] }),
    ));
    let forex = provider(&upstream);

    // When: It is requested with default parameters
    let series = forex
        .indicator(IndicatorKind::Rsi, "EURUSD", IndicatorParams::default())
        .await
        .expect("series");

    // Then: Upstream sees day/14/close, adjusted, newest first, ten values
    assert_eq!(
        upstream.calls(),
        ["indicator rsi C:EURUSD day 14 close adjusted=true desc 10"]
    );
    assert_eq!(series.ticker, "C:EURUSD");
    assert_eq!(series.values.len(), 2);
    assert_eq!(series.values[1].value, 61.0);
}

#[tokio::test]
async fn when_indicator_name_is_unknown_input_is_rejected_locally() {
    let upstream = Arc::new(ScriptedUpstream::default());
    let forex = provider(&upstream);

    let error = forex
        .indicator_by_name("vwap", "EURUSD", IndicatorParams::default())
        .await
        .expect_err("unknown indicator");

    assert_eq!(error.kind(), DomainErrorKind::InvalidInput);
    assert!(upstream.calls().is_empty());
}

// =============================================================================
// Failure classification through the adapter
// =============================================================================

#[tokio::test]
async fn when_upstream_answers_404_caller_gets_not_found() {
    let upstream = Arc::new(ScriptedUpstream::failing(404));
    let error = provider(&upstream)
        .snapshot("EURUSD")
        .await
        .expect_err("not found");
    assert_eq!(error.kind(), DomainErrorKind::NotFound);
}

#[tokio::test]
async fn when_upstream_answers_401_caller_gets_a_configuration_failure() {
    let upstream = Arc::new(ScriptedUpstream::failing(401));
    let error = provider(&upstream)
        .market_status()
        .await
        .expect_err("unauthorized");
    assert_eq!(error.kind(), DomainErrorKind::ConnectionFailure);
    assert!(error.to_string().contains("configuration"));
}

#[tokio::test]
async fn when_upstream_answers_500_caller_gets_a_generic_failure() {
    let upstream = Arc::new(ScriptedUpstream::failing(500));
    let error = provider(&upstream)
        .market_movers(MoverDirection::Gainers)
        .await
        .expect_err("server error");
    assert_eq!(error.kind(), DomainErrorKind::Generic);
    assert_eq!(upstream.calls(), ["snapshot_direction gainers"]);
}
