//! # Fintools Core
//!
//! Provider plumbing for the fintools market-data tools.
//!
//! ## Overview
//!
//! - **Error taxonomy** shared by every tool ([`DomainError`])
//! - **Bounded executor** for blocking upstream calls (concurrency cap, hard timeout)
//! - **Forex adapter** over the Massive REST API
//! - **CoinMarketCap client** for crypto endpoints
//! - **Translator** turning failures into `Error: ...` strings without secrets
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Settings from environment and `.env` |
//! | [`crypto`] | CoinMarketCap client |
//! | [`error`] | Domain, upstream, validation and config errors |
//! | [`executor`] | Bounded executor and failure classification |
//! | [`fields`] | Alias-tolerant reads over JSON payloads |
//! | [`forex`] | Forex provider adapter and upstream |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`logging`] | `tracing` subscriber set-up |
//! | [`redact`] | Secret redaction |
//! | [`ticker`] | Currency pair parsing |
//! | [`translate`] | Failure to message rendering |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Tool handler   │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ ForexProvider   │────▶│ BoundedExecutor  │
//! └─────────────────┘     └────────┬─────────┘
//!                                  │ spawn_blocking + timeout
//!                                  ▼
//!                         ┌──────────────────┐     ┌──────────────┐
//!                         │ ForexUpstream    │────▶│ HttpClient   │
//!                         └──────────────────┘     └──────────────┘
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use fintools_core::{DomainError, ErrorTranslator};
//!
//! let translator = ErrorTranslator::new("Massive", "MASSIVE_API_KEY");
//! let message = translator.translate(&DomainError::timeout().into());
//! assert!(message.starts_with("Error:"));
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod executor;
pub mod fields;
pub mod forex;
pub mod http_client;
pub mod logging;
pub mod redact;
pub mod ticker;
pub mod translate;

pub use config::{LogFormat, ProviderConfig, Settings};
pub use crypto::{CoinMarketCapClient, HistoricalQuotesParams};
pub use error::{ConfigError, DomainError, DomainErrorKind, UpstreamError, ValidationError};
pub use executor::{classify, BoundedExecutor, ExecutorConfig};
pub use forex::{
    Bar, BarsRequest, ForexProvider, ForexUpstream, IndicatorKind, IndicatorParams,
    IndicatorSeries, MassiveRestClient, MoverDirection, QuotesParams, SortOrder, Timespan,
};
pub use http_client::{
    CannedHttpClient, HttpAuth, HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use logging::init_logging;
pub use redact::sanitize_message;
pub use ticker::{forex_symbol, TickerPair};
pub use translate::{is_error_result, ErrorTranslator, ToolFailure, ERROR_PREFIX};
