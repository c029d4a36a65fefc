//! Crypto tools over the CoinMarketCap client.
//!
//! Every response carries its payload under `data`; an empty payload is a
//! tool-level message rather than a failure.

use serde_json::Value;

use fintools_core::fields::{items, read_display, read_field, read_i64, read_path, read_str};
use fintools_core::{HistoricalQuotesParams, ToolFailure};

use crate::args::ToolArgs;
use crate::context::ToolContext;
use crate::format::{capitalize, grouped, header, number_or_zero, text_or_na, truncate, usd};
use crate::schemas::{
    BlockchainStatsInput, CryptoMapInput, HistoricalListingsInput, HistoricalPricesInput,
    LatestContentInput, LimitInput, MarketPairsInput, SymbolsInput, TrendingInput,
};

type ToolResult = Result<String, ToolFailure>;

pub const NO_DATA: &str = "Error: No data returned from API.";

const RULE: usize = 50;
const WIDE_RULE: usize = 70;
const MAX_HISTORY_POINTS: usize = 10;
const MAX_CONSTITUENTS: usize = 20;
const SUMMARY_CHARS: usize = 200;

pub async fn prices(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = SymbolsInput::from_args(args)?;
    let response = ctx.crypto.quotes(&input.symbols).await?;
    let Some(data) = payload(&response) else {
        return Ok(String::from(NO_DATA));
    };

    let mut lines = header("Cryptocurrency Prices:", '-', RULE);
    for symbol in &input.symbols {
        if let Some(crypto) = data.get(symbol).map(first_entry) {
            lines.push(format!(
                "{} ({symbol}): {}",
                text_or_na(crypto, &["name"]),
                usd(usd_number(crypto, "price"))
            ));
        }
    }
    Ok(lines.join("\n"))
}

pub async fn top(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = LimitInput::from_args(args, 10, 100)?;
    let response = ctx.crypto.listings(input.limit).await?;

    let mut lines = header(
        format!("Top {} Cryptocurrencies by Market Cap:", input.limit),
        '=',
        WIDE_RULE,
    );
    for coin in payload(&response).map(items).unwrap_or_default() {
        lines.push(ranked_price(coin, "cmc_rank"));
    }
    Ok(lines.join("\n"))
}

pub async fn metadata(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = SymbolsInput::from_args(args)?;
    let response = ctx.crypto.info(&input.joined()).await?;
    let Some(data) = payload(&response) else {
        return Ok(String::from(NO_DATA));
    };

    let mut lines = header("Cryptocurrency Metadata:", '-', RULE);
    for symbol in &input.symbols {
        let Some(info) = data.get(symbol).map(first_entry) else {
            continue;
        };
        let description = read_display(info, &["description"]).unwrap_or_default();
        lines.push(format!("{} ({symbol}):", text_or_na(info, &["name"])));
        lines.push(format!(
            "  Description: {}",
            if description.is_empty() {
                String::from("N/A")
            } else {
                truncate(&description, SUMMARY_CHARS)
            }
        ));
        lines.push(format!("  Website: {}", first_url(info, "website")));
        lines.push(format!("  Logo: {}", text_or_na(info, &["logo"])));
        lines.push(format!("  Technical Doc: {}", first_url(info, "technical_doc")));
        lines.push(String::new());
    }
    Ok(lines.join("\n"))
}

pub async fn historical_prices(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = HistoricalPricesInput::from_args(args)?;
    let params = HistoricalQuotesParams {
        time_start: input.time_start.clone(),
        time_end: input.time_end.clone(),
        interval: input.interval.clone(),
    };
    let response = ctx
        .crypto
        .historical_quotes(&input.symbols.join(","), &params)
        .await?;
    let Some(data) = payload(&response) else {
        return Ok(String::from(NO_DATA));
    };

    let mut lines = header("Historical Cryptocurrency Prices:", '-', RULE);
    for symbol in &input.symbols {
        let Some(entry) = data.get(symbol).map(first_entry) else {
            continue;
        };
        lines.push(format!("{symbol} Historical Data:"));
        let quotes = read_field(entry, &["quotes"]).map(items).unwrap_or_default();
        for quote in quotes.iter().take(MAX_HISTORY_POINTS) {
            lines.push(format!(
                "  {}: {}",
                text_or_na(quote, &["timestamp"]),
                usd(usd_number(quote, "price"))
            ));
        }
        lines.push(String::new());
    }
    Ok(lines.join("\n"))
}

pub async fn trending(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = TrendingInput::from_args(args)?;
    let response = ctx.crypto.trending(input.limit, &input.time_period).await?;
    let Some(data) = payload(&response) else {
        return Ok(String::from(NO_DATA));
    };

    let mut lines = header(
        format!("Top {} Trending Cryptos ({}):", input.limit, input.time_period),
        '=',
        WIDE_RULE,
    );
    for coin in items(data) {
        lines.push(ranked_price(coin, "rank"));
    }
    Ok(lines.join("\n"))
}

pub async fn global_metrics(ctx: &ToolContext, _args: &ToolArgs) -> ToolResult {
    let response = ctx.crypto.global_metrics().await?;
    let Some(data) = payload(&response) else {
        return Ok(String::from(NO_DATA));
    };

    let mut lines = header("Global Crypto Metrics:", '-', RULE);
    lines.push(format!(
        "Total Market Cap: {}",
        usd(usd_number(data, "total_market_cap"))
    ));
    lines.push(format!("24h Volume: {}", usd(usd_number(data, "total_volume_24h"))));
    lines.push(format!(
        "BTC Dominance: {:.2}%",
        number_or_zero(data, &["btc_dominance"])
    ));
    lines.push(format!(
        "Active Cryptocurrencies: {}",
        read_display(data, &["active_cryptocurrencies"]).unwrap_or_else(|| String::from("0"))
    ));
    lines.push(format!(
        "Active Exchanges: {}",
        read_display(data, &["active_exchanges"]).unwrap_or_else(|| String::from("0"))
    ));
    Ok(lines.join("\n"))
}

pub async fn market_pairs(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = MarketPairsInput::from_args(args)?;
    let response = ctx.crypto.market_pairs(&input.symbol, input.limit).await?;

    let data = read_field(&response, &["data"]);
    let pairs = data
        .and_then(|data| read_field(data, &["market_pairs"]))
        .map(items)
        .unwrap_or_default();
    if pairs.is_empty() {
        return Ok(String::from(NO_DATA));
    }

    let mut lines = header(
        format!(
            "Market Pairs for {} ({}):",
            data.map(|data| text_or_na(data, &["name"]))
                .unwrap_or_else(|| String::from("N/A")),
            input.symbol
        ),
        '-',
        RULE,
    );
    for pair in pairs.iter().take(input.limit as usize) {
        let exchange = read_field(pair, &["exchange"])
            .and_then(|exchange| read_str(exchange, &["name"]))
            .unwrap_or("N/A");
        lines.push(format!(
            "{exchange} - {}/{}: {} (Vol: {})",
            text_or_na(pair, &["base_symbol"]),
            text_or_na(pair, &["quote_symbol"]),
            usd(usd_number(pair, "price")),
            usd(usd_number(pair, "volume_24h"))
        ));
    }
    Ok(lines.join("\n"))
}

pub async fn latest_ohlcv(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = SymbolsInput::from_args(args)?;
    let response = ctx.crypto.ohlcv_latest(&input.joined()).await?;
    let Some(data) = payload(&response) else {
        return Ok(String::from(NO_DATA));
    };

    let mut lines = header("Latest OHLCV Data:", '-', RULE);
    for symbol in &input.symbols {
        let Some(entry) = data.get(symbol).map(first_entry) else {
            continue;
        };
        lines.push(format!("{symbol}:"));
        for (label, field) in [
            ("Open", "open"),
            ("High", "high"),
            ("Low", "low"),
            ("Close", "close"),
            ("Volume", "volume"),
        ] {
            lines.push(format!("  {label}: {}", usd(usd_number(entry, field))));
        }
        lines.push(String::new());
    }
    Ok(lines.join("\n"))
}

pub async fn top_exchanges(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = LimitInput::from_args(args, 10, 100)?;
    let response = ctx.crypto.exchange_listings(input.limit).await?;
    let Some(data) = payload(&response) else {
        return Ok(String::from(NO_DATA));
    };

    let mut lines = header(format!("Top {} Exchanges by Volume:", input.limit), '=', WIDE_RULE);
    for exchange in items(data) {
        lines.push(format!(
            "#{} {}: 24h Volume {} | Liquidity Score: {}",
            text_or_na(exchange, &["rank"]),
            text_or_na(exchange, &["name"]),
            usd(usd_number(exchange, "volume_24h")),
            read_display(exchange, &["liquidity_score"]).unwrap_or_else(|| String::from("0"))
        ));
    }
    Ok(lines.join("\n"))
}

pub async fn map(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = CryptoMapInput::from_args(args)?;
    let response = ctx.crypto.map(input.limit, &input.listing_status).await?;
    let Some(data) = payload(&response) else {
        return Ok(String::from(NO_DATA));
    };

    let mut lines = header(
        format!(
            "Cryptocurrency Map ({}, top {}):",
            input.listing_status, input.limit
        ),
        '-',
        RULE,
    );
    for coin in items(data) {
        lines.push(format!(
            "ID: {} | {} ({}) | Rank: {} | First Historical Data: {}",
            text_or_na(coin, &["id"]),
            text_or_na(coin, &["name"]),
            text_or_na(coin, &["symbol"]),
            text_or_na(coin, &["rank"]),
            text_or_na(coin, &["first_historical_data"])
        ));
    }
    Ok(lines.join("\n"))
}

pub async fn categories(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = LimitInput::from_args(args, 100, 500)?;
    let response = ctx.crypto.categories(input.limit).await?;
    let Some(data) = payload(&response) else {
        return Ok(String::from(NO_DATA));
    };

    let mut lines = header("Cryptocurrency Categories:", '-', RULE);
    for category in items(data) {
        lines.push(format!(
            "{} (ID: {}) | Num Coins: {} | Avg Price Change 24h: {:.2}%",
            text_or_na(category, &["name"]),
            text_or_na(category, &["id"]),
            read_display(category, &["num_tokens"]).unwrap_or_else(|| String::from("0")),
            number_or_zero(category, &["avg_price_change"])
        ));
    }
    Ok(lines.join("\n"))
}

pub async fn fear_and_greed(ctx: &ToolContext, _args: &ToolArgs) -> ToolResult {
    let response = ctx.crypto.fear_and_greed().await?;
    let Some(data) = payload(&response) else {
        return Ok(String::from(NO_DATA));
    };

    let mut lines = header("Crypto Fear & Greed Index:", '-', RULE);
    lines.push(format!(
        "Value: {} ({})",
        read_display(data, &["value"]).unwrap_or_else(|| String::from("0")),
        text_or_na(data, &["value_classification"])
    ));
    lines.push(format!("Timestamp: {}", text_or_na(data, &["timestamp"])));
    Ok(lines.join("\n"))
}

pub async fn historical_top(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = HistoricalListingsInput::from_args(args)?;
    let response = ctx.crypto.historical_listings(&input.date, input.limit).await?;
    let Some(data) = payload(&response) else {
        return Ok(String::from(NO_DATA));
    };

    let mut lines = header(
        format!(
            "Top {} Cryptocurrencies by Market Cap on {}:",
            input.limit, input.date
        ),
        '=',
        WIDE_RULE,
    );
    for coin in items(data) {
        lines.push(ranked_price(coin, "cmc_rank"));
    }
    Ok(lines.join("\n"))
}

pub async fn latest_news(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = LatestContentInput::from_args(args)?;
    let symbols = input.symbols.as_ref().map(|symbols| symbols.join(","));
    let response = ctx
        .crypto
        .latest_content(symbols.as_deref(), input.limit)
        .await?;
    let Some(data) = payload(&response) else {
        return Ok(String::from(NO_DATA));
    };

    let mut lines = header("Latest Crypto News:", '-', RULE);
    for article in items(data) {
        let summary = read_display(article, &["description"]).unwrap_or_default();
        lines.push(format!(
            "{} ({})",
            text_or_na(article, &["title"]),
            text_or_na(article, &["published_at"])
        ));
        lines.push(format!(
            "  Source: {}",
            read_path(article, &["source", "name"])
                .and_then(Value::as_str)
                .unwrap_or("N/A")
        ));
        lines.push(format!(
            "  Summary: {}",
            if summary.is_empty() {
                String::from("N/A")
            } else {
                truncate(&summary, SUMMARY_CHARS)
            }
        ));
        lines.push(format!("  URL: {}", text_or_na(article, &["url"])));
        lines.push(String::new());
    }
    Ok(lines.join("\n"))
}

pub async fn blockchain_statistics(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = BlockchainStatsInput::from_args(args)?;
    let response = ctx.crypto.blockchain_statistics(&input.slug).await?;
    let Some(data) = payload(&response) else {
        return Ok(String::from(NO_DATA));
    };

    // Keyed by blockchain id; a single slug yields a single entry.
    let stats = match data {
        Value::Object(map) => map.values().next().unwrap_or(&Value::Null),
        other => other,
    };

    let mut lines = header(
        format!("Blockchain Stats for {}:", capitalize(&input.slug)),
        '-',
        RULE,
    );
    lines.push(format!("Hashrate: {}", text_or_na(stats, &["hashrate"])));
    lines.push(format!(
        "Transaction Count 24h: {}",
        text_or_na(stats, &["transaction_count_24h"])
    ));
    lines.push(format!(
        "Average Transaction Fee USD: {}",
        usd(number_or_zero(stats, &["average_transaction_fee_usd"]))
    ));
    lines.push(format!("Difficulty: {}", text_or_na(stats, &["difficulty"])));
    Ok(lines.join("\n"))
}

pub async fn cmc20_index(ctx: &ToolContext, _args: &ToolArgs) -> ToolResult {
    let response = ctx.crypto.cmc20_index().await?;
    let Some(data) = payload(&response) else {
        return Ok(String::from(NO_DATA));
    };

    let mut lines = header("CMC 20 Index:", '-', RULE);
    lines.push(format!("Value: {}", grouped(number_or_zero(data, &["value"]), 2)));
    lines.push(format!("Timestamp: {}", text_or_na(data, &["timestamp"])));
    lines.push(String::from("Constituents:"));
    let constituents = read_field(data, &["constituents"]).map(items).unwrap_or_default();
    for coin in constituents.iter().take(MAX_CONSTITUENTS) {
        lines.push(format!(
            "  {} ({}): Weight {:.2}%",
            text_or_na(coin, &["name"]),
            text_or_na(coin, &["symbol"]),
            number_or_zero(coin, &["weight"])
        ));
    }
    Ok(lines.join("\n"))
}

pub async fn price_performance(ctx: &ToolContext, args: &ToolArgs) -> ToolResult {
    let input = SymbolsInput::from_args(args)?;
    let response = ctx.crypto.price_performance(&input.joined()).await?;
    let Some(data) = payload(&response) else {
        return Ok(String::from(NO_DATA));
    };

    let mut lines = header("Price Performance Stats:", '-', RULE);
    for symbol in &input.symbols {
        let Some(stats) = data.get(symbol).map(first_entry) else {
            continue;
        };
        let quote = read_path(stats, &["quote", "USD"]);
        let number = |path: &[&str]| {
            quote
                .and_then(|quote| read_path(quote, path))
                .and_then(Value::as_f64)
                .unwrap_or_default()
        };
        lines.push(format!("{} ({symbol}):", text_or_na(stats, &["name"])));
        lines.push(format!(
            "  All-Time High: {} ({:.2}% down)",
            usd(number(&["all_time_high", "price"])),
            number(&["all_time_high", "percent_down"])
        ));
        lines.push(format!(
            "  All-Time Low: {}",
            usd(number(&["all_time_low", "price"]))
        ));
        lines.push(format!("  24h Change: {:.2}%", number(&["percent_change_24h"])));
        lines.push(format!("  7d Change: {:.2}%", number(&["percent_change_7d"])));
        lines.push(format!("  30d Change: {:.2}%", number(&["percent_change_30d"])));
        lines.push(String::new());
    }
    Ok(lines.join("\n"))
}

/// Non-empty `data` member of a response.
fn payload(response: &Value) -> Option<&Value> {
    read_field(response, &["data"]).filter(|data| match data {
        Value::Object(map) => !map.is_empty(),
        Value::Array(list) => !list.is_empty(),
        _ => true,
    })
}

/// Symbol-keyed endpoints return either an object or a list of matches.
fn first_entry(entry: &Value) -> &Value {
    match entry {
        Value::Array(list) => list.first().unwrap_or(&Value::Null),
        other => other,
    }
}

fn usd_number(item: &Value, field: &str) -> f64 {
    read_path(item, &["quote", "USD", field])
        .and_then(Value::as_f64)
        .unwrap_or_default()
}

fn ranked_price(coin: &Value, rank_field: &str) -> String {
    let rank = read_i64(coin, &[rank_field])
        .map_or_else(|| String::from("N/A"), |rank| rank.to_string());
    format!(
        "#{rank} {} ({}): {}",
        text_or_na(coin, &["name"]),
        text_or_na(coin, &["symbol"]),
        usd(usd_number(coin, "price"))
    )
}

fn first_url(info: &Value, kind: &str) -> String {
    read_path(info, &["urls", kind])
        .map(items)
        .and_then(|urls| urls.first())
        .and_then(Value::as_str)
        .unwrap_or("N/A")
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_data_is_no_payload() {
        assert!(payload(&json!({ "data": {} })).is_none());
        assert!(payload(&json!({ "data": [] })).is_none());
        assert!(payload(&json!({ "status": {} })).is_none());
        assert!(payload(&json!({ "data": [1] })).is_some());
    }

    #[test]
    fn ranked_price_uses_usd_quote() {
        let coin = json!({
            "cmc_rank": 1,
            "name": "Bitcoin",
            "symbol": "BTC",
            "quote": { "USD": { "price": 64000.5 } }
        });
        assert_eq!(ranked_price(&coin, "cmc_rank"), "#1 Bitcoin (BTC): $64,000.50");
    }

    #[test]
    fn first_url_handles_missing_lists() {
        let info = json!({ "urls": { "website": ["https://bitcoin.org/"], "technical_doc": [] } });
        assert_eq!(first_url(&info, "website"), "https://bitcoin.org/");
        assert_eq!(first_url(&info, "technical_doc"), "N/A");
    }

    #[test]
    fn first_entry_unwraps_lists() {
        assert_eq!(first_entry(&json!([{ "id": 1 }, { "id": 2 }])), &json!({ "id": 1 }));
        assert_eq!(first_entry(&json!([])), &Value::Null);
    }
}
