//! CoinMarketCap Pro API client.
//!
//! Calls are plain async requests without the bounded executor; failures are
//! returned as raw [`UpstreamError`] for the translator's legacy branch.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::UpstreamError;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};
use crate::redact::sanitize_message;

pub const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Optional filters of the historical quotes endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoricalQuotesParams {
    pub time_start: Option<String>,
    pub time_end: Option<String>,
    pub interval: String,
}

#[derive(Clone)]
pub struct CoinMarketCapClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    api_key: String,
    auth: HttpAuth,
}

impl CoinMarketCapClient {
    pub fn new(http: Arc<dyn HttpClient>, config: &ProviderConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            auth: HttpAuth::Header {
                name: String::from(API_KEY_HEADER),
                value: config.api_key.clone(),
            },
        }
    }

    async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value, UpstreamError> {
        let safe_params = params
            .iter()
            .map(|(key, value)| format!("{key}={}", sanitize_message(value, Some(&self.api_key))))
            .collect::<Vec<_>>()
            .join(", ");
        tracing::info!(endpoint, params = %safe_params, "coinmarketcap request");

        let request = params.iter().fold(
            HttpRequest::get(format!("{}{endpoint}", self.base_url))
                .with_header("accept", "application/json")
                .with_auth(&self.auth)
                .with_timeout(REQUEST_TIMEOUT),
            |request, (key, value)| request.with_query(*key, value),
        );
        self.http.execute(request).await?.into_json()
    }

    /// Latest quotes; `symbols` are joined with commas.
    pub async fn quotes(&self, symbols: &[String]) -> Result<Value, UpstreamError> {
        self.get(
            "/v1/cryptocurrency/quotes/latest",
            &[("symbol", symbols.join(","))],
        )
        .await
    }

    /// Top listings by market cap.
    pub async fn listings(&self, limit: u32) -> Result<Value, UpstreamError> {
        self.get(
            "/v1/cryptocurrency/listings/latest",
            &[("limit", limit.to_string()), ("sort", String::from("market_cap"))],
        )
        .await
    }

    pub async fn info(&self, symbols: &str) -> Result<Value, UpstreamError> {
        self.get("/v2/cryptocurrency/info", &[("symbol", symbols.to_owned())])
            .await
    }

    pub async fn historical_quotes(
        &self,
        symbols: &str,
        params: &HistoricalQuotesParams,
    ) -> Result<Value, UpstreamError> {
        let mut query = vec![
            ("symbol", symbols.to_owned()),
            ("interval", params.interval.clone()),
        ];
        if let Some(start) = &params.time_start {
            query.push(("time_start", start.clone()));
        }
        if let Some(end) = &params.time_end {
            query.push(("time_end", end.clone()));
        }
        self.get("/v2/cryptocurrency/quotes/historical", &query).await
    }

    pub async fn trending(&self, limit: u32, time_period: &str) -> Result<Value, UpstreamError> {
        self.get(
            "/v1/cryptocurrency/trending/latest",
            &[("limit", limit.to_string()), ("time_period", time_period.to_owned())],
        )
        .await
    }

    pub async fn global_metrics(&self) -> Result<Value, UpstreamError> {
        self.get("/v1/global-metrics/quotes/latest", &[]).await
    }

    pub async fn market_pairs(&self, symbol: &str, limit: u32) -> Result<Value, UpstreamError> {
        self.get(
            "/v2/cryptocurrency/market-pairs/latest",
            &[("symbol", symbol.to_owned()), ("limit", limit.to_string())],
        )
        .await
    }

    pub async fn ohlcv_latest(&self, symbols: &str) -> Result<Value, UpstreamError> {
        self.get("/v2/cryptocurrency/ohlcv/latest", &[("symbol", symbols.to_owned())])
            .await
    }

    pub async fn exchange_listings(&self, limit: u32) -> Result<Value, UpstreamError> {
        self.get("/v1/exchange/listings/latest", &[("limit", limit.to_string())])
            .await
    }

    pub async fn map(&self, limit: u32, listing_status: &str) -> Result<Value, UpstreamError> {
        self.get(
            "/v1/cryptocurrency/map",
            &[("limit", limit.to_string()), ("listing_status", listing_status.to_owned())],
        )
        .await
    }

    pub async fn categories(&self, limit: u32) -> Result<Value, UpstreamError> {
        self.get("/v1/cryptocurrency/categories", &[("limit", limit.to_string())])
            .await
    }

    pub async fn fear_and_greed(&self) -> Result<Value, UpstreamError> {
        self.get("/v3/fear-and-greed/latest", &[]).await
    }

    pub async fn historical_listings(
        &self,
        date: &str,
        limit: u32,
    ) -> Result<Value, UpstreamError> {
        self.get(
            "/v1/cryptocurrency/listings/historical",
            &[("date", date.to_owned()), ("limit", limit.to_string())],
        )
        .await
    }

    pub async fn latest_content(
        &self,
        symbols: Option<&str>,
        limit: u32,
    ) -> Result<Value, UpstreamError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(symbols) = symbols {
            query.push(("symbol", symbols.to_owned()));
        }
        self.get("/v1/content/latest", &query).await
    }

    pub async fn blockchain_statistics(&self, slug: &str) -> Result<Value, UpstreamError> {
        self.get("/v1/blockchain/statistics/latest", &[("slug", slug.to_owned())])
            .await
    }

    pub async fn cmc20_index(&self) -> Result<Value, UpstreamError> {
        self.get("/v3/index/cmc20-latest", &[]).await
    }

    pub async fn price_performance(&self, symbols: &str) -> Result<Value, UpstreamError> {
        self.get(
            "/v2/cryptocurrency/price-performance-stats/latest",
            &[("symbol", symbols.to_owned())],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{CannedHttpClient, HttpResponse};
    use serde_json::json;

    fn config() -> ProviderConfig {
        ProviderConfig {
            api_key: String::from("cmc-test-key"),
            base_url: String::from("https://cmc.example.test"),
            max_concurrency: 1,
            timeout: REQUEST_TIMEOUT,
        }
    }

    #[tokio::test]
    async fn quotes_send_key_header_and_joined_symbols() {
        let http = Arc::new(CannedHttpClient::new().json(
            "/v1/cryptocurrency/quotes/latest",
            json!({ "data": { "BTC": { "name": "Bitcoin" } } }),
        ));
        let client = CoinMarketCapClient::new(http.clone(), &config());

        let payload = client
            .quotes(&[String::from("BTC"), String::from("ETH")])
            .await
            .expect("quotes succeed");

        assert_eq!(payload["data"]["BTC"]["name"], "Bitcoin");
        let request = http.last_request().expect("request recorded");
        assert_eq!(request.query_value("symbol"), Some("BTC,ETH"));
        assert_eq!(
            request.headers.get("x-cmc_pro_api_key").map(String::as_str),
            Some("cmc-test-key")
        );
        assert_eq!(request.timeout_ms, 30_000);
    }

    #[tokio::test]
    async fn optional_historical_bounds_are_omitted() {
        let http =
            Arc::new(CannedHttpClient::new().json("/quotes/historical", json!({ "data": {} })));
        let client = CoinMarketCapClient::new(http.clone(), &config());

        client
            .historical_quotes(
                "BTC",
                &HistoricalQuotesParams {
                    interval: String::from("daily"),
                    ..HistoricalQuotesParams::default()
                },
            )
            .await
            .expect("historical quotes succeed");

        let request = http.last_request().expect("request recorded");
        assert_eq!(request.query_value("interval"), Some("daily"));
        assert_eq!(request.query_value("time_start"), None);
    }

    #[tokio::test]
    async fn http_errors_are_returned_unclassified() {
        let http = Arc::new(CannedHttpClient::new().route(
            "/v3/fear-and-greed/latest",
            Ok(HttpResponse::with_status(429, "{\"status\":{\"error_code\":1008}}")),
        ));
        let client = CoinMarketCapClient::new(http, &config());

        let error = client.fear_and_greed().await.expect_err("429 must fail");
        assert_eq!(error.status_code(), Some(429));
    }
}
