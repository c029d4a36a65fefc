//! Forex tools: validate, call [`ForexProvider`](fintools_core::ForexProvider), format.

use serde_json::Value;

use fintools_core::fields::{items, read_display, read_f64, read_field, read_str};
use fintools_core::{
    BarsRequest, DomainError, IndicatorKind, IndicatorParams, IndicatorSeries, QuotesParams,
    SortOrder, ToolFailure,
};

use crate::args::ToolArgs;
use crate::context::ToolContext;
use crate::format::{grouped, header, push_overflow, raw_or_na, text_or_na, NOT_AVAILABLE};
use crate::schemas::{
    ConversionInput, CustomBarsInput, ExchangesInput, ForexTickerInput, HistoricalQuotesInput,
    IndicatorInput, MarketMoversInput, MarketSnapshotInput, TickersListInput,
};

type ToolResult = Result<String, ToolFailure>;

const RULE: usize = 50;
const MAX_ROWS: usize = 20;
const MAX_MOVERS: usize = 10;
const MAX_INDICATOR_POINTS: usize = 10;

pub async fn tickers(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = TickersListInput::from_args(args)?;
    let payload = ctx.forex.tickers(input.limit).await?;

    let mut lines = header(format!("Forex Tickers (Top {}):", input.limit), '-', RULE);
    for item in items(&payload) {
        lines.push(format!(
            "{} - {} ({})",
            text_or_na(item, &["ticker"]),
            text_or_na(item, &["name"]),
            text_or_na(item, &["locale"])
        ));
    }
    Ok(lines.join("\n"))
}

pub async fn conversion(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = ConversionInput::from_args(args)?;
    let payload = ctx
        .forex
        .conversion(&input.from_currency, &input.to_currency, input.amount)
        .await?;

    let converted = read_f64(&payload, &["converted"]).unwrap_or_default();
    let rate = read_field(&payload, &["last"])
        .and_then(|last| read_f64(last, &["ask", "a"]))
        .unwrap_or_default();

    let mut lines = header("Currency Conversion:", '-', RULE);
    lines.push(format!(
        "{} {} -> {}",
        input.amount, input.from_currency, input.to_currency
    ));
    lines.push(format!("Result: {} {}", grouped(converted, 4), input.to_currency));
    lines.push(format!("Rate: {}", grouped(rate, 4)));
    Ok(lines.join("\n"))
}

pub async fn last_quote(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = ForexTickerInput::from_args(args)?;
    let payload = ctx.forex.last_quote(&input.ticker).await?;

    let Some(last) = read_field(&payload, &["last"]).filter(|last| last.is_object()) else {
        return Ok(format!(
            "Note: Real-time Bid/Ask quotes for {} are unavailable or returned no data. \
             Please use 'get_forex_prev_close' for daily data.",
            input.ticker
        ));
    };

    let bid = read_f64(last, &["bid", "b"]);
    let ask = read_f64(last, &["ask", "a"]);
    if bid.is_none() && ask.is_none() {
        return Ok(format!("No active quote data found for {}.", input.ticker));
    }

    let mut lines = header(format!("Last Quote for {}:", input.ticker), '-', RULE);
    lines.push(format!("Bid: {}", raw_or_na(read_field(last, &["bid", "b"]))));
    lines.push(format!("Ask: {}", raw_or_na(read_field(last, &["ask", "a"]))));
    lines.push(format!("Timestamp: {}", text_or_na(last, &["timestamp", "t"])));
    Ok(lines.join("\n"))
}

pub async fn market_status(ctx: &ToolContext, _args: &ToolArgs) -> ToolResult {
    let payload = ctx.forex.market_status().await?;

    let status = read_display(&payload, &["status"])
        .or_else(|| {
            read_field(&payload, &["currencies"])
                .and_then(|currencies| read_str(currencies, &["fx"]))
                .map(str::to_owned)
        })
        .unwrap_or_else(|| String::from(NOT_AVAILABLE));

    let mut lines = header("Forex Market Status:", '-', RULE);
    lines.push(format!("Market: {}", text_or_na(&payload, &["market"])));
    lines.push(format!("Status: {status}"));
    let exchanges_open = read_field(&payload, &["exchanges"])
        .and_then(|exchanges| read_field(exchanges, &["open"]));
    lines.push(format!("Exchanges Open: {}", raw_or_na(exchanges_open)));
    Ok(lines.join("\n"))
}

pub async fn snapshot(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = ForexTickerInput::from_args(args)?;
    let snap = ctx.forex.snapshot(&input.ticker).await?;

    let name = read_display(&snap, &["ticker"]).unwrap_or_else(|| input.ticker.clone());
    let change = change_percent(&snap);

    let day = read_field(&snap, &["day"]);
    let prev_day = read_field(&snap, &["prev_day", "prevDay"]);
    let volume = day
        .and_then(|bar| read_f64(bar, &["v", "volume"]))
        .or_else(|| prev_day.and_then(|bar| read_f64(bar, &["v", "volume"])))
        .unwrap_or_default();

    let mut lines = header(format!("Snapshot for {name}:"), '-', RULE);
    lines.push(format!("Price: {}", snapshot_price(&snap)));
    lines.push(format!("Change: {change:.2}%"));
    lines.push(format!("Volume: {}", grouped(volume, 0)));
    Ok(lines.join("\n"))
}

pub async fn movers(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = MarketMoversInput::from_args(args)?;
    let payload = ctx.forex.market_movers(input.direction).await?;

    let mut lines = header(format!("Top Forex {}:", input.direction.title()), '=', RULE);
    for item in items(&payload).iter().take(MAX_MOVERS) {
        let mut change = change_percent(item);
        let mut price = read_field(item, &["day"])
            .and_then(|day| read_f64(day, &["c", "close"]))
            .unwrap_or_default();

        // Upstream reports 0% outside trading hours; derive it from the previous session.
        if change == 0.0 {
            if let Some(prev) = read_field(item, &["prev_day", "prevDay"]) {
                let open = read_f64(prev, &["o", "open"]);
                let close = read_f64(prev, &["c", "close"]);
                if let (Some(open), Some(close)) = (open, close) {
                    change = (close - open) / open * 100.0;
                    if price == 0.0 {
                        price = close;
                    }
                }
            }
        }

        lines.push(format!(
            "{} | Change: {change:.2}% | Price: {price}",
            text_or_na(item, &["ticker"])
        ));
    }
    Ok(lines.join("\n"))
}

pub async fn history(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = CustomBarsInput::from_args(args)?;
    let bars = ctx
        .forex
        .historical_bars(BarsRequest {
            ticker: input.ticker.clone(),
            multiplier: input.multiplier,
            timespan: input.timespan,
            from: input.from_date.clone(),
            to: input.to_date.clone(),
            sort: SortOrder::Asc,
        })
        .await?;

    if bars.is_empty() {
        return Ok(String::from("No data found for this range."));
    }

    let mut lines = header(
        format!(
            "Historical Data for {} ({} {}):",
            input.ticker, input.multiplier, input.timespan
        ),
        '-',
        RULE,
    );
    for bar in bars.iter().take(MAX_ROWS) {
        lines.push(format!(
            "TS: {} | O: {} | H: {} | L: {} | C: {}",
            bar.timestamp, bar.open, bar.high, bar.low, bar.close
        ));
    }
    push_overflow(&mut lines, bars.len(), MAX_ROWS);
    Ok(lines.join("\n"))
}

pub async fn historical_quotes(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = HistoricalQuotesInput::from_args(args)?;
    let params = QuotesParams {
        timestamp: Some(input.timestamp.clone()),
        limit: Some(input.limit),
        ..QuotesParams::default()
    };

    let payload = match ctx.forex.historical_quotes(&input.ticker, params).await {
        Ok(payload) => payload,
        Err(DomainError::Timeout { .. }) => {
            tracing::warn!(ticker = %input.ticker, "historical quotes request timed out");
            return Ok(String::from(
                "Error: Request timed out. Try specifying a narrower date range.",
            ));
        }
        Err(error) => return Err(error.into()),
    };

    let quotes = items(&payload);
    if quotes.is_empty() {
        return Ok(format!(
            "No historical quotes found for {} on {}.",
            input.ticker, input.timestamp
        ));
    }

    let mut lines = header(
        format!(
            "Historical Quotes (BBO) for {} on {}:",
            input.ticker, input.timestamp
        ),
        '-',
        RULE,
    );
    for quote in quotes.iter().take(MAX_ROWS) {
        lines.push(format!(
            "Time: {} | Bid: {} | Ask: {}",
            text_or_na(quote, &["participant_timestamp", "sip_timestamp", "timestamp"]),
            text_or_na(quote, &["bid_price", "bid"]),
            text_or_na(quote, &["ask_price", "ask"])
        ));
    }
    push_overflow(&mut lines, quotes.len(), MAX_ROWS);
    Ok(lines.join("\n"))
}

pub async fn indicator(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = IndicatorInput::from_args(args)?;
    let kind: IndicatorKind = input.indicator.parse()?;
    let series = ctx
        .forex
        .indicator(
            kind,
            &input.ticker,
            IndicatorParams {
                timespan: input.timespan,
                window: input.window,
                series_type: input.series_type.clone(),
                limit: Some(input.limit),
                ..IndicatorParams::default()
            },
        )
        .await?;
    Ok(render_indicator(&input.ticker, &series))
}

fn render_indicator(ticker: &str, series: &IndicatorSeries) -> String {
    let title = series.kind.as_str().to_ascii_uppercase();
    let mut lines = header(format!("{title} Indicator for {ticker}:"), '-', RULE);
    for point in series.values.iter().take(MAX_INDICATOR_POINTS) {
        let mut line = format!("Date: {} | Value: {}", point.timestamp, point.value);
        if let (Some(signal), Some(histogram)) = (point.signal, point.histogram) {
            line.push_str(&format!(" | Signal: {signal} | Histogram: {histogram}"));
        }
        if let (Some(upper), Some(lower)) = (point.upper, point.lower) {
            line.push_str(&format!(" | Upper: {upper} | Lower: {lower}"));
        }
        lines.push(line);
    }
    lines.join("\n")
}

pub async fn exchanges(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = ExchangesInput::from_args(args)?;
    let payload = ctx.forex.exchanges(&input.asset_class, &input.locale).await?;

    let exchanges = items(&payload);
    if exchanges.is_empty() {
        return Ok(String::from("No exchanges found."));
    }

    let mut lines = header("Forex Exchanges:", '-', RULE);
    for exchange in exchanges {
        lines.push(format!(
            "ID: {} | Name: {} | Type: {}",
            text_or_na(exchange, &["id"]),
            text_or_na(exchange, &["name"]),
            text_or_na(exchange, &["type"])
        ));
    }
    Ok(lines.join("\n"))
}

pub async fn market_snapshot(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = MarketSnapshotInput::from_args(args)?;
    let payload = ctx.forex.snapshot_all(input.tickers.clone()).await?;

    let tickers = items(&payload);
    if tickers.is_empty() {
        return Ok(String::from("No snapshot data available."));
    }

    let mut lines = header("Market Snapshot:", '-', RULE);
    for item in tickers.iter().take(input.limit as usize) {
        let price = read_field(item, &["last_trade", "lastTrade"])
            .and_then(|trade| read_display(trade, &["p", "price"]))
            .unwrap_or_else(|| snapshot_price(item));
        lines.push(format!(
            "{}: {price} ({:.2}%)",
            text_or_na(item, &["ticker"]),
            change_percent(item)
        ));
    }
    Ok(lines.join("\n"))
}

/// Renders prices and volume only; no session date line.
pub async fn prev_close(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = ForexTickerInput::from_args(args)?;
    let payload = ctx.forex.prev_close(&input.ticker).await?;

    let bar = match &payload {
        Value::Array(bars) => match bars.first() {
            Some(bar) => bar,
            None => return Ok(String::from("No previous day data found.")),
        },
        other => other,
    };

    let mut lines = header(format!("Previous Day Close for {}:", input.ticker), '-', RULE);
    lines.push(format!(
        "Open: {} | High: {} | Low: {} | Close: {}",
        text_or_na(bar, &["open", "o"]),
        text_or_na(bar, &["high", "h"]),
        text_or_na(bar, &["low", "l"]),
        text_or_na(bar, &["close", "c"])
    ));
    lines.push(format!("Volume: {}", text_or_na(bar, &["volume", "v"])));
    Ok(lines.join("\n"))
}

pub async fn market_holidays(ctx: &ToolContext, _args: &ToolArgs) -> ToolResult {
    let payload = ctx.forex.market_holidays().await?;

    let holidays = items(&payload);
    if holidays.is_empty() {
        return Ok(String::from("No upcoming market holidays found."));
    }

    let mut lines = header("Upcoming Market Holidays & Adjustments:", '-', RULE);
    for holiday in holidays {
        let mut line = format!(
            "{}: {} ({}) - Status: {}",
            text_or_na(holiday, &["date"]),
            read_display(holiday, &["name"]).unwrap_or_else(|| String::from("Holiday")),
            text_or_na(holiday, &["exchange"]),
            text_or_na(holiday, &["status"]).to_uppercase()
        );
        if let Some(open) = read_display(holiday, &["open"]) {
            line.push_str(&format!(
                " | Hours: {open} to {}",
                read_display(holiday, &["close"]).unwrap_or_else(|| String::from("?"))
            ));
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

fn change_percent(item: &Value) -> f64 {
    read_field(
        item,
        &["todays_change_perc", "todaysChangePerc", "todays_change_percent"],
    )
    .and_then(Value::as_f64)
    .unwrap_or_default()
}

/// Mid of the last quote, else the freshest close available.
fn snapshot_price(snap: &Value) -> String {
    if let Some(quote) = read_field(snap, &["last_quote", "lastQuote"]) {
        let ask = read_f64(quote, &["ask", "a"]);
        let bid = read_f64(quote, &["bid", "b"]);
        if let (Some(ask), Some(bid)) = (ask, bid) {
            return format!("{:.5} (Mid)", (ask + bid) / 2.0);
        }
    }

    let fallbacks: [(&[&str], &str); 3] = [
        (&["min"], "Last Min"),
        (&["day"], "Day Close"),
        (&["prev_day", "prevDay"], "Prev Close"),
    ];
    fallbacks
        .into_iter()
        .find_map(|(names, label)| {
            read_field(snap, names)
                .and_then(|bar| read_f64(bar, &["close", "c"]))
                .map(|close| format!("{close} ({label})"))
        })
        .unwrap_or_else(|| String::from(NOT_AVAILABLE))
}
