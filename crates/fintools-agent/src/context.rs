use std::sync::Arc;

use fintools_core::{
    BoundedExecutor, CoinMarketCapClient, ConfigError, ErrorTranslator, ForexProvider,
    ForexUpstream, HttpClient, MassiveRestClient, Settings, ToolFailure,
};

use crate::registry::Domain;

pub const FOREX_PROVIDER_NAME: &str = "Massive";
pub const FOREX_KEY_VAR: &str = "MASSIVE_API_KEY";
pub const CRYPTO_PROVIDER_NAME: &str = "CoinMarketCap";
pub const CRYPTO_KEY_VAR: &str = "COINMARKETCAP_API_KEY";

/// Everything a tool handler needs, built once at start-up.
pub struct ToolContext {
    pub app_name: String,
    pub forex: ForexProvider,
    pub crypto: CoinMarketCapClient,
    pub forex_errors: ErrorTranslator,
    pub crypto_errors: ErrorTranslator,
}

impl ToolContext {
    /// Wires the production clients. Must run inside a tokio runtime.
    pub fn from_settings(
        settings: &Settings,
        http: Arc<dyn HttpClient>,
    ) -> Result<Self, ConfigError> {
        let forex_config = settings.forex_provider();
        let crypto_config = settings.crypto_provider();

        let upstream: Arc<dyn ForexUpstream> =
            Arc::new(MassiveRestClient::new(Arc::clone(&http), &forex_config)?);
        let executor = BoundedExecutor::new(forex_config.executor_config())
            .with_provider(FOREX_PROVIDER_NAME)
            .with_secret(forex_config.api_key.clone());

        tracing::info!(
            app = %settings.app_name,
            forex_max_concurrency = executor.capacity(),
            forex_timeout_secs = executor.timeout().as_secs(),
            "tool context ready"
        );

        Ok(Self {
            app_name: settings.app_name.clone(),
            forex: ForexProvider::new(upstream, executor),
            crypto: CoinMarketCapClient::new(http, &crypto_config),
            forex_errors: ErrorTranslator::new(FOREX_PROVIDER_NAME, FOREX_KEY_VAR)
                .with_secret(forex_config.api_key),
            crypto_errors: ErrorTranslator::new(CRYPTO_PROVIDER_NAME, CRYPTO_KEY_VAR)
                .with_secret(crypto_config.api_key),
        })
    }

    pub fn translator(&self, domain: Domain) -> &ErrorTranslator {
        match domain {
            Domain::Crypto => &self.crypto_errors,
            Domain::Forex => &self.forex_errors,
        }
    }

    /// Handler output as the agent sees it.
    pub fn render(&self, domain: Domain, result: Result<String, ToolFailure>) -> String {
        result.unwrap_or_else(|failure| self.translator(domain).translate(&failure))
    }
}
