use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::UpstreamError;

/// Authentication strategy applied to outgoing HTTP requests.
#[derive(Clone, PartialEq, Eq)]
pub enum HttpAuth {
    None,
    BearerToken(String),
    Header { name: String, value: String },
}

impl HttpAuth {
    pub fn apply(&self, headers: &mut BTreeMap<String, String>) {
        match self {
            Self::None => {}
            Self::BearerToken(token) => {
                headers.insert(String::from("authorization"), format!("Bearer {token}"));
            }
            Self::Header { name, value } => {
                headers.insert(name.to_ascii_lowercase(), value.clone());
            }
        }
    }
}

impl std::fmt::Debug for HttpAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::BearerToken(_) => f.write_str("BearerToken([REDACTED])"),
            Self::Header { name, .. } => write!(f, "Header({name}: [REDACTED])"),
        }
    }
}

/// GET request envelope used by the upstream clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            timeout_ms: 30_000,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Adds the parameter only when `value` is present.
    pub fn with_optional_query<V: ToString>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with_query(name, value),
            None => self,
        }
    }

    pub fn with_auth(mut self, auth: &HttpAuth) -> Self {
        auth.apply(&mut self.headers);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Query parameter value by name.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Full URL with a percent-encoded query string.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.url)
    }
}

/// HTTP response envelope returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Parses a 2xx body as JSON; any other status becomes
    /// [`UpstreamError::Status`].
    pub fn into_json(self) -> Result<serde_json::Value, UpstreamError> {
        if !self.is_success() {
            return Err(UpstreamError::status(self.status, self.body));
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

pub type HttpFuture<'a> =
    Pin<Box<dyn Future<Output = Result<HttpResponse, UpstreamError>> + Send + 'a>>;

/// Transport contract shared by every upstream client.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a>;
}

/// Production HTTP client using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent(concat!("fintools/", env!("CARGO_PKG_VERSION")))
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            let mut builder = self
                .client
                .get(&request.url)
                .query(&request.query)
                .timeout(Duration::from_millis(request.timeout_ms));

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            // reqwest error text embeds the URL; keep it out of the message.
            let response = builder.send().await.map_err(|e| {
                let e = e.without_url();
                if e.is_timeout() {
                    UpstreamError::Timeout
                } else if e.is_connect() {
                    UpstreamError::Connect(e.to_string())
                } else {
                    UpstreamError::Other(format!("request failed: {e}"))
                }
            })?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| {
                let e = e.without_url();
                if e.is_timeout() {
                    UpstreamError::Timeout
                } else {
                    UpstreamError::Other(format!("failed to read response body: {e}"))
                }
            })?;

            Ok(HttpResponse { status, body })
        })
    }
}

/// Offline transport answering from canned responses, keyed by a URL path
/// fragment. Records every request it sees.
#[derive(Debug, Default)]
pub struct CannedHttpClient {
    routes: Vec<(String, Result<HttpResponse, UpstreamError>)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl CannedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers requests whose URL contains `fragment`. First match wins.
    pub fn route(
        mut self,
        fragment: impl Into<String>,
        response: Result<HttpResponse, UpstreamError>,
    ) -> Self {
        self.routes.push((fragment.into(), response));
        self
    }

    pub fn json(self, fragment: impl Into<String>, body: serde_json::Value) -> Self {
        self.route(fragment, Ok(HttpResponse::ok_json(body.to_string())))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests().pop()
    }
}

impl HttpClient for CannedHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        let answer = self
            .routes
            .iter()
            .find(|(fragment, _)| request.url.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Ok(HttpResponse::with_status(404, "no canned route")));
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        Box::pin(async move { answer })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_auth_populates_authorization_header() {
        let request = HttpRequest::get("https://example.test/v3/reference/tickers")
            .with_auth(&HttpAuth::BearerToken(String::from("token-123")));

        assert_eq!(
            request.headers.get("authorization").map(String::as_str),
            Some("Bearer token-123")
        );
    }

    #[test]
    fn custom_header_auth_is_lowercased_and_hidden_from_debug() {
        let auth = HttpAuth::Header {
            name: String::from("X-CMC_PRO_API_KEY"),
            value: String::from("demo-key"),
        };
        let request = HttpRequest::get("https://example.test/v1/key/info").with_auth(&auth);

        assert_eq!(
            request.headers.get("x-cmc_pro_api_key").map(String::as_str),
            Some("demo-key")
        );
        assert!(!format!("{auth:?}").contains("demo-key"));
    }

    #[test]
    fn full_url_encodes_query_values() {
        let request = HttpRequest::get("https://example.test/quotes")
            .with_query("symbol", "BTC,ETH")
            .with_optional_query::<u32>("limit", None)
            .with_optional_query("convert", Some("USD"));

        assert_eq!(
            request.full_url(),
            "https://example.test/quotes?symbol=BTC%2CETH&convert=USD"
        );
        assert_eq!(request.query_value("convert"), Some("USD"));
    }

    #[test]
    fn non_success_status_becomes_status_error() {
        let error = HttpResponse::with_status(429, "slow down")
            .into_json()
            .expect_err("429 must fail");
        assert_eq!(error.status_code(), Some(429));
    }

    #[tokio::test]
    async fn canned_client_records_requests_and_falls_back_to_404() {
        let client = CannedHttpClient::new().json("/known", serde_json::json!({"ok": true}));

        let known = client
            .execute(HttpRequest::get("https://example.test/known"))
            .await
            .expect("canned route answers");
        let unknown = client
            .execute(HttpRequest::get("https://example.test/other"))
            .await
            .expect("fallback answers");

        assert!(known.is_success());
        assert_eq!(unknown.status, 404);
        assert_eq!(client.requests().len(), 2);
    }
}
