use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::runtime::Handle;

use crate::config::ProviderConfig;
use crate::error::ConfigError;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};

use super::types::{IndicatorKind, MoverDirection};
use super::upstream::{AggregatesQuery, ForexUpstream, IndicatorQuery, QuotesQuery, UpstreamResult};

const FOREX_SNAPSHOT_PATH: &str = "/v2/snapshot/locale/global/markets/forex";

/// Massive (Polygon-compatible) REST implementation of [`ForexUpstream`].
///
/// Path segments are inserted as given; callers pass tickers and dates that
/// already passed validation.
///
/// Requests go through the shared async [`HttpClient`]; each call blocks the
/// current thread on the runtime captured at construction. Calling it from
/// an async task instead of a blocking worker panics inside tokio.
#[derive(Clone)]
pub struct MassiveRestClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    auth: HttpAuth,
    timeout: Duration,
    runtime: Handle,
}

impl MassiveRestClient {
    /// Must be called from within a tokio runtime.
    pub fn new(http: Arc<dyn HttpClient>, config: &ProviderConfig) -> Result<Self, ConfigError> {
        let runtime =
            Handle::try_current().map_err(|error| ConfigError::Runtime(error.to_string()))?;
        Ok(Self::with_runtime(http, config, runtime))
    }

    pub fn with_runtime(
        http: Arc<dyn HttpClient>,
        config: &ProviderConfig,
        runtime: Handle,
    ) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            auth: HttpAuth::BearerToken(config.api_key.clone()),
            timeout: config.timeout,
            runtime,
        }
    }

    fn request(&self, path: &str) -> HttpRequest {
        HttpRequest::get(format!("{}{path}", self.base_url))
            .with_header("accept", "application/json")
            .with_auth(&self.auth)
            .with_timeout(self.timeout)
    }

    fn fetch(&self, request: HttpRequest) -> UpstreamResult {
        tracing::debug!(url = %request.full_url(), "massive request");
        let response = self.runtime.block_on(self.http.execute(request))?;
        response.into_json()
    }

    fn fetch_field(&self, request: HttpRequest, field: &str) -> UpstreamResult {
        let mut payload = self.fetch(request)?;
        Ok(payload
            .get_mut(field)
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    fn fetch_results(&self, request: HttpRequest) -> UpstreamResult {
        self.fetch_field(request, "results")
            .map(|results| if results.is_null() { Value::Array(Vec::new()) } else { results })
    }
}

impl ForexUpstream for MassiveRestClient {
    fn list_tickers(&self, limit: u32) -> UpstreamResult {
        let request = self
            .request("/v3/reference/tickers")
            .with_query("market", "fx")
            .with_query("active", true)
            .with_query("limit", limit);
        self.fetch_results(request)
    }

    fn list_exchanges(&self, asset_class: &str, locale: &str) -> UpstreamResult {
        let request = self
            .request("/v3/reference/exchanges")
            .with_query("asset_class", asset_class)
            .with_query("locale", locale);
        self.fetch_results(request)
    }

    fn market_status(&self) -> UpstreamResult {
        self.fetch(self.request("/v1/marketstatus/now"))
    }

    fn currency_conversion(
        &self,
        from: &str,
        to: &str,
        amount: f64,
        precision: u8,
    ) -> UpstreamResult {
        let path = format!("/v1/conversion/{from}/{to}");
        let request = self
            .request(&path)
            .with_query("amount", amount)
            .with_query("precision", precision);
        self.fetch(request)
    }

    fn last_quote(&self, base: &str, quote: &str) -> UpstreamResult {
        let path = format!("/v1/last_quote/currencies/{base}/{quote}");
        self.fetch(self.request(&path))
    }

    fn list_quotes(&self, ticker: &str, query: &QuotesQuery) -> UpstreamResult {
        let path = format!("/v3/quotes/{ticker}");
        let request = self
            .request(&path)
            .with_optional_query("timestamp", query.timestamp.as_deref())
            .with_query("order", query.order.as_str())
            .with_query("sort", &query.sort)
            .with_query("limit", query.limit);
        self.fetch_results(request)
    }

    fn snapshot_ticker(&self, ticker: &str) -> UpstreamResult {
        let path = format!("{FOREX_SNAPSHOT_PATH}/tickers/{ticker}");
        self.fetch_field(self.request(&path), "ticker")
    }

    fn snapshot_all(&self, tickers: Option<&str>) -> UpstreamResult {
        let request = self
            .request(&format!("{FOREX_SNAPSHOT_PATH}/tickers"))
            .with_optional_query("tickers", tickers);
        self.fetch_field(request, "tickers")
    }

    fn snapshot_direction(&self, direction: MoverDirection) -> UpstreamResult {
        let path = format!("{FOREX_SNAPSHOT_PATH}/{}", direction.as_str());
        self.fetch_field(self.request(&path), "tickers")
    }

    fn previous_close(&self, ticker: &str) -> UpstreamResult {
        let path = format!("/v2/aggs/ticker/{ticker}/prev");
        self.fetch_results(self.request(&path).with_query("adjusted", true))
    }

    fn aggregates(&self, query: &AggregatesQuery) -> UpstreamResult {
        let path = format!(
            "/v2/aggs/ticker/{}/range/{}/{}/{}/{}",
            query.ticker,
            query.multiplier,
            query.timespan.as_str(),
            query.from,
            query.to
        );
        let request = self
            .request(&path)
            .with_query("adjusted", query.adjusted)
            .with_query("sort", query.sort.as_str())
            .with_query("limit", query.limit);
        self.fetch_results(request)
    }

    fn indicator(
        &self,
        kind: IndicatorKind,
        ticker: &str,
        query: &IndicatorQuery,
    ) -> UpstreamResult {
        let path = format!("/v1/indicators/{}/{ticker}", kind.endpoint());
        let request = self
            .request(&path)
            .with_query("timespan", query.timespan.as_str())
            .with_query("window", query.window)
            .with_query("series_type", &query.series_type)
            .with_query("adjusted", query.adjusted)
            .with_query("order", query.order.as_str())
            .with_query("limit", query.limit);
        self.fetch_field(request, "results")
    }

    fn market_holidays(&self) -> UpstreamResult {
        self.fetch(self.request("/v1/marketstatus/upcoming"))
    }
}
