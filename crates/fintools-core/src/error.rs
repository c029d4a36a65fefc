use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::redact::sanitize_message;

/// Validation errors raised while normalizing raw tool arguments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("field '{field}' cannot be empty")]
    Empty { field: &'static str },
    #[error("invalid forex ticker format: '{value}'; try the 'C:' prefix (e.g. C:EURUSD)")]
    InvalidForexTicker { value: String },
    #[error("invalid ticker format: '{value}'; expected 6 chars (EURUSD) or hyphenated (EUR-USD)")]
    InvalidTickerPair { value: String },
    #[error("currency code must be 3 letters (e.g. USD): '{value}'")]
    InvalidCurrency { value: String },
    #[error("invalid cryptocurrency symbol format: '{value}'")]
    InvalidCryptoSymbol { value: String },
    #[error("invalid blockchain slug format: '{value}'")]
    InvalidSlug { value: String },
    #[error("field '{field}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("field '{field}' must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("field '{field}' must be one of [{allowed}], got '{value}'")]
    NotAllowed {
        field: &'static str,
        value: String,
        allowed: String,
    },
    #[error("field '{field}' must be a YYYY-MM-DD date: '{value}'")]
    InvalidDate { field: &'static str, value: String },
    #[error("field '{field}' has the wrong type; expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("missing required field '{field}'")]
    Missing { field: &'static str },
}

/// Raw failure surface of an upstream call, before classification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode upstream response: {0}")]
    Decode(String),
    #[error("{0}")]
    Other(String),
}

impl UpstreamError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// HTTP status carried by this error, if any.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for UpstreamError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

/// Discriminant of [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainErrorKind {
    ConnectionFailure,
    Timeout,
    NotFound,
    RateLimited,
    InvalidInput,
    Generic,
}

impl DomainErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConnectionFailure => "connection_failure",
            Self::Timeout => "timeout",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::InvalidInput => "invalid_input",
            Self::Generic => "generic",
        }
    }
}

impl Display for DomainErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of provider failures that callers may render to end users.
///
/// Messages are authored by this crate or sanitized on construction, so
/// they never carry credentials.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{message}")]
    ConnectionFailure { message: String },
    #[error("{message}")]
    Timeout { message: String },
    #[error("{resource} not found")]
    NotFound { resource: String },
    #[error("{message}")]
    RateLimited { message: String },
    #[error("invalid input: {detail}")]
    InvalidInput { detail: String },
    #[error("provider error: {detail}")]
    Generic { detail: String },
}

impl DomainError {
    pub fn connection_failure(message: impl Into<String>) -> Self {
        Self::ConnectionFailure {
            message: message.into(),
        }
    }

    /// Connection failure caused by rejected credentials. The key itself is
    /// never part of the message.
    pub fn configuration() -> Self {
        Self::connection_failure("Internal configuration error (API key).")
    }

    pub fn timeout() -> Self {
        Self::Timeout {
            message: String::from("External data provider timed out."),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    pub fn invalid_input(detail: impl Into<String>) -> Self {
        Self::InvalidInput {
            detail: detail.into(),
        }
    }

    /// Generic provider error; hex-looking secrets are stripped from `detail`.
    pub fn generic(detail: impl AsRef<str>) -> Self {
        Self::Generic {
            detail: sanitize_message(detail.as_ref(), None),
        }
    }

    pub const fn kind(&self) -> DomainErrorKind {
        match self {
            Self::ConnectionFailure { .. } => DomainErrorKind::ConnectionFailure,
            Self::Timeout { .. } => DomainErrorKind::Timeout,
            Self::NotFound { .. } => DomainErrorKind::NotFound,
            Self::RateLimited { .. } => DomainErrorKind::RateLimited,
            Self::InvalidInput { .. } => DomainErrorKind::InvalidInput,
            Self::Generic { .. } => DomainErrorKind::Generic,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self.kind() {
            DomainErrorKind::ConnectionFailure => "provider.connection_failure",
            DomainErrorKind::Timeout => "provider.timeout",
            DomainErrorKind::NotFound => "provider.not_found",
            DomainErrorKind::RateLimited => "provider.rate_limited",
            DomainErrorKind::InvalidInput => "provider.invalid_input",
            DomainErrorKind::Generic => "provider.generic",
        }
    }
}

impl From<ValidationError> for DomainError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_input(error.to_string())
    }
}

/// Settings resolution failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required setting '{0}' is not set")]
    Missing(&'static str),
    #[error("setting '{var}' has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
    #[error("failed to load env file '{path}': {message}")]
    EnvFile { path: String, message: String },
    #[error("no async runtime available: {0}")]
    Runtime(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_detail_drops_hex_tokens() {
        let error = DomainError::generic("boom 0123456789abcdef0123456789ABCDEF failed");
        assert_eq!(error.kind(), DomainErrorKind::Generic);
        assert!(!error.to_string().contains("0123456789abcdef"));
        assert!(error.to_string().contains("[REDACTED]"));
    }

    #[test]
    fn validation_errors_become_invalid_input() {
        let error: DomainError = ValidationError::InvalidCurrency {
            value: String::from("EURO"),
        }
        .into();
        assert_eq!(error.kind(), DomainErrorKind::InvalidInput);
        assert_eq!(error.code(), "provider.invalid_input");
        assert!(error.to_string().contains("EURO"));
    }

    #[test]
    fn configuration_error_is_a_connection_failure_without_key() {
        let error = DomainError::configuration();
        assert_eq!(error.kind(), DomainErrorKind::ConnectionFailure);
        assert!(error.to_string().contains("API key"));
    }

    #[test]
    fn status_code_is_exposed_only_for_http_statuses() {
        assert_eq!(UpstreamError::status(429, "").status_code(), Some(429));
        assert_eq!(UpstreamError::Timeout.status_code(), None);
    }
}
