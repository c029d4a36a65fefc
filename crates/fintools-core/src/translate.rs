//! Rendering of failures into user-facing tool output.
//!
//! Every rendered message starts with [`ERROR_PREFIX`]. Templates never
//! embed raw upstream text; the only dynamic parts are crate-authored
//! messages and sanitized validation details.

use crate::error::{DomainError, UpstreamError};
use crate::redact::sanitize_message;

/// Literal every failed tool result starts with.
pub const ERROR_PREFIX: &str = "Error:";

/// Anything a tool handler can fail with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolFailure {
    /// Already classified by the bounded executor or input validation.
    Domain(DomainError),
    /// Raw transport error from a client that does not classify.
    Legacy(UpstreamError),
    /// Programming error inside a handler (panic, broken invariant).
    Internal(String),
}

impl From<DomainError> for ToolFailure {
    fn from(error: DomainError) -> Self {
        Self::Domain(error)
    }
}

impl From<UpstreamError> for ToolFailure {
    fn from(error: UpstreamError) -> Self {
        Self::Legacy(error)
    }
}

impl From<crate::error::ValidationError> for ToolFailure {
    fn from(error: crate::error::ValidationError) -> Self {
        Self::Domain(error.into())
    }
}

/// Converts failures into `Error: ...` strings for one provider.
#[derive(Debug, Clone)]
pub struct ErrorTranslator {
    provider: &'static str,
    key_var: &'static str,
    secret: Option<String>,
}

impl ErrorTranslator {
    pub fn new(provider: &'static str, key_var: &'static str) -> Self {
        Self {
            provider,
            key_var,
            secret: None,
        }
    }

    /// Secret redacted from anything this translator logs or renders.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        self.secret = (!secret.is_empty()).then_some(secret);
        self
    }

    /// Redacts this provider's secret (and key-shaped tokens) from `text`.
    pub fn sanitize(&self, text: &str) -> String {
        sanitize_message(text, self.secret.as_deref())
    }

    /// Renders `failure`. Emits exactly one log event.
    pub fn translate(&self, failure: &ToolFailure) -> String {
        let secret = self.secret.as_deref();
        let (kind, detail) = match failure {
            ToolFailure::Domain(error) => (error.code(), error.to_string()),
            ToolFailure::Legacy(error) => ("upstream", error.to_string()),
            ToolFailure::Internal(message) => ("internal", message.clone()),
        };
        tracing::error!(
            provider = self.provider,
            kind,
            error = %sanitize_message(&detail, secret),
            "tool call failed"
        );

        let rendered = match failure {
            ToolFailure::Domain(error) => self.domain_message(error),
            ToolFailure::Legacy(error) => self.legacy_message(error),
            ToolFailure::Internal(_) => unexpected(),
        };
        sanitize_message(&rendered, secret)
    }

    fn domain_message(&self, error: &DomainError) -> String {
        match error {
            DomainError::ConnectionFailure { message } => format!(
                "{ERROR_PREFIX} Connection failure while contacting {}. {message}",
                self.provider
            ),
            DomainError::Timeout { .. } => {
                format!("{ERROR_PREFIX} Request to {} timed out. Please try again.", self.provider)
            }
            DomainError::NotFound { resource } => {
                format!("{ERROR_PREFIX} The requested {resource} was not found.")
            }
            DomainError::RateLimited { .. } => format!(
                "{ERROR_PREFIX} Rate limit exceeded. Please wait before making more requests."
            ),
            DomainError::InvalidInput { detail } => {
                format!("{ERROR_PREFIX} Invalid input: {detail}")
            }
            DomainError::Generic { .. } => format!(
                "{ERROR_PREFIX} {} returned an unexpected error. Please try again later.",
                self.provider
            ),
        }
    }

    fn legacy_message(&self, error: &UpstreamError) -> String {
        let provider = self.provider;
        match error {
            UpstreamError::Status { status, .. } => match *status {
                401 => format!(
                    "{ERROR_PREFIX} Invalid API credentials. Please check your {}.",
                    self.key_var
                ),
                429 => format!(
                    "{ERROR_PREFIX} Rate limit exceeded. \
                     Please wait before making more requests or upgrade your API plan."
                ),
                400 => format!(
                    "{ERROR_PREFIX} Invalid request. Please check your input parameters."
                ),
                404 => format!("{ERROR_PREFIX} Requested symbol or resource not found."),
                500..=599 => format!(
                    "{ERROR_PREFIX} {provider} API is experiencing issues. Please try again later."
                ),
                other => format!("{ERROR_PREFIX} API request failed with status code {other}."),
            },
            UpstreamError::Connect(_) => format!(
                "{ERROR_PREFIX} Unable to connect to {provider} API. \
                 Please check your internet connection."
            ),
            UpstreamError::Timeout => {
                format!("{ERROR_PREFIX} Request to {provider} API timed out. Please try again.")
            }
            UpstreamError::Decode(_) | UpstreamError::Other(_) => {
                format!("{ERROR_PREFIX} Failed to communicate with {provider} API.")
            }
        }
    }
}

fn unexpected() -> String {
    format!("{ERROR_PREFIX} An unexpected error occurred. Please try again.")
}

/// Whether a tool result string reports a failure.
pub fn is_error_result(result: &str) -> bool {
    result.trim_start().starts_with(ERROR_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator() -> ErrorTranslator {
        ErrorTranslator::new("CoinMarketCap", "COINMARKETCAP_API_KEY").with_secret("cmc-secret-1")
    }

    #[test]
    fn every_domain_kind_renders_with_prefix() {
        let errors = [
            DomainError::connection_failure("Failed to connect to the data provider."),
            DomainError::timeout(),
            DomainError::not_found("ticker"),
            DomainError::rate_limited("slow down"),
            DomainError::invalid_input("bad ticker"),
            DomainError::generic("kaboom"),
        ];
        for error in errors {
            let out = translator().translate(&ToolFailure::Domain(error));
            assert!(is_error_result(&out), "{out}");
        }
    }

    #[test]
    fn generic_detail_is_not_rendered() {
        let out = translator().translate(&DomainError::generic("traceback line 42").into());
        assert!(!out.contains("traceback"));
    }

    #[test]
    fn legacy_statuses_follow_fixed_templates() {
        let t = translator();
        let render = |status| t.translate(&UpstreamError::status(status, "body").into());

        assert!(render(401).contains("COINMARKETCAP_API_KEY"));
        assert!(render(429).to_lowercase().contains("rate limit"));
        assert!(render(400).contains("Invalid request"));
        assert!(render(404).contains("not found"));
        assert!(render(503).contains("experiencing issues"));
        assert!(render(418).contains("status code 418"));
    }

    #[test]
    fn invalid_input_detail_is_redacted() {
        let failure = DomainError::invalid_input("key cmc-secret-1 rejected").into();
        let out = translator().translate(&failure);
        assert!(!out.contains("cmc-secret-1"));
        assert!(out.contains("[REDACTED]"));
    }

    #[test]
    fn internal_failures_fall_back_to_unexpected_error() {
        let failure = ToolFailure::Internal(String::from("index out of bounds"));
        let out = translator().translate(&failure);
        assert_eq!(out, "Error: An unexpected error occurred. Please try again.");
    }
}
