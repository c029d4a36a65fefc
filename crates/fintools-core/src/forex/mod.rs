//! Foreign-exchange market data.
//!
//! [`ForexProvider`] is the adapter tools call; [`ForexUpstream`] is the
//! blocking surface it drives through the bounded executor, with
//! [`MassiveRestClient`] as the production implementation.

mod provider;
mod rest;
mod types;
mod upstream;

pub use provider::{
    BarsRequest, ForexProvider, IndicatorParams, QuotesParams, BARS_LIMIT, CONVERSION_PRECISION,
    DEFAULT_INDICATOR_LIMIT, MAX_QUOTES_LIMIT,
};
pub use rest::MassiveRestClient;
pub use types::{
    Bar, IndicatorKind, IndicatorSeries, IndicatorValue, MoverDirection, SortOrder, Timespan,
};
pub use upstream::{AggregatesQuery, ForexUpstream, IndicatorQuery, QuotesQuery, UpstreamResult};
