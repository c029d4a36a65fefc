use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::error::{DomainError, UpstreamError, ValidationError};
use crate::fields::{items, read_field, read_path, FieldSource};

/// Aggregate bar width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Timespan {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Timespan {
    pub const ALL: [Self; 7] = [
        Self::Minute,
        Self::Hour,
        Self::Day,
        Self::Week,
        Self::Month,
        Self::Quarter,
        Self::Year,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }
}

impl Display for Timespan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timespan {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|timespan| timespan.as_str() == lowered)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "timespan",
                value: value.to_owned(),
                allowed: joined(Self::ALL.iter().map(|t| t.as_str())),
            })
    }
}

/// Technical indicator supported by the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Macd,
    Rsi,
    Bollinger,
}

impl IndicatorKind {
    pub const ALL: [Self; 5] = [Self::Sma, Self::Ema, Self::Macd, Self::Rsi, Self::Bollinger];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sma => "sma",
            Self::Ema => "ema",
            Self::Macd => "macd",
            Self::Rsi => "rsi",
            Self::Bollinger => "bollinger",
        }
    }

    /// Path segment of the upstream indicator endpoint.
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Bollinger => "bbands",
            other => other.as_str(),
        }
    }
}

impl Display for IndicatorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| {
                DomainError::from(ValidationError::NotAllowed {
                    field: "indicator",
                    value: value.to_owned(),
                    allowed: joined(Self::ALL.iter().map(|k| k.as_str())),
                })
            })
    }
}

/// Market movers direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoverDirection {
    Gainers,
    Losers,
}

impl MoverDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gainers => "gainers",
            Self::Losers => "losers",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Gainers => "Gainers",
            Self::Losers => "Losers",
        }
    }
}

impl FromStr for MoverDirection {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gainers" => Ok(Self::Gainers),
            "losers" => Ok(Self::Losers),
            _ => Err(ValidationError::NotAllowed {
                field: "direction",
                value: value.to_owned(),
                allowed: String::from("gainers, losers"),
            }),
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ValidationError::NotAllowed {
                field: "sort",
                value: value.to_owned(),
                allowed: String::from("asc, desc"),
            }),
        }
    }
}

/// One OHLC aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    /// Bar start, Unix milliseconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
    pub vwap: Option<f64>,
    pub transactions: Option<u64>,
}

impl Bar {
    /// Reads a bar from either the short wire keys (`o`, `c`, `t`) or the
    /// long names.
    pub fn from_value(value: &Value) -> Result<Self, UpstreamError> {
        let timestamp = read_field(value, &["timestamp", "t"])
            .and_then(Value::as_i64)
            .ok_or_else(|| UpstreamError::Decode(String::from("aggregate bar without timestamp")))?;
        Ok(Self {
            timestamp,
            open: number(value, &["open", "o"]).unwrap_or_default(),
            high: number(value, &["high", "h"]).unwrap_or_default(),
            low: number(value, &["low", "l"]).unwrap_or_default(),
            close: number(value, &["close", "c"]).unwrap_or_default(),
            volume: number(value, &["volume", "v"]),
            vwap: number(value, &["vwap", "vw"]),
            transactions: read_field(value, &["transactions", "n"]).and_then(Value::as_u64),
        })
    }

    /// Parses every item of an aggregates payload.
    pub fn list_from(payload: &Value) -> Result<Vec<Self>, UpstreamError> {
        items(payload).iter().map(Self::from_value).collect()
    }
}

/// One point of an indicator series. MACD fills `signal`/`histogram`,
/// Bollinger bands fill `upper`/`lower` and use `value` for the middle band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorValue {
    pub timestamp: i64,
    pub value: f64,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
    pub upper: Option<f64>,
    pub lower: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub kind: IndicatorKind,
    pub ticker: String,
    pub values: Vec<IndicatorValue>,
}

impl IndicatorSeries {
    /// Accepts `{results: {values: [...]}}`, `{values: [...]}` or a bare array.
    pub fn from_value(
        kind: IndicatorKind,
        ticker: &str,
        payload: &Value,
    ) -> Result<Self, UpstreamError> {
        let values = read_path(payload, &["results", "values"])
            .or_else(|| read_field(payload, &["values"]))
            .unwrap_or(payload);
        let values: &[Value] = match values {
            Value::Array(list) => list,
            Value::Null => &[],
            _ => {
                return Err(UpstreamError::Decode(String::from(
                    "indicator payload without a values list",
                )))
            }
        };

        let values = values
            .iter()
            .map(|point| {
                let timestamp = read_field(point, &["timestamp", "t"])
                    .and_then(Value::as_i64)
                    .unwrap_or_default();
                let value = number(point, &["value", "middle_band", "middle"]).unwrap_or_default();
                IndicatorValue {
                    timestamp,
                    value,
                    signal: number(point, &["signal"]),
                    histogram: number(point, &["histogram"]),
                    upper: number(point, &["upper_band", "upper"]),
                    lower: number(point, &["lower_band", "lower"]),
                }
            })
            .collect();

        Ok(Self {
            kind,
            ticker: ticker.to_owned(),
            values,
        })
    }
}

fn number<S: FieldSource + ?Sized>(source: &S, names: &[&str]) -> Option<f64> {
    read_field(source, names).and_then(Value::as_f64)
}

fn joined<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.collect::<Vec<_>>().join(", ")
}
