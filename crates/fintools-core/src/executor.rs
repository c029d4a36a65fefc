//! Bounded execution of blocking upstream calls.
//!
//! Every call submitted to a [`BoundedExecutor`] goes through three gates:
//!
//! 1. a shared concurrency budget (one semaphore permit per in-flight call),
//! 2. the blocking worker pool, raced against a hard timeout,
//! 3. failure classification into [`DomainError`].
//!
//! A timed-out call is abandoned, not cancelled: its worker keeps running until
//! the blocking function returns on its own, but the caller gets
//! [`DomainError::Timeout`] and the permit is released immediately.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinError;

use crate::error::{DomainError, UpstreamError};
use crate::redact::sanitize_message;

/// Default number of simultaneous upstream calls.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;
/// Default hard timeout per upstream call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Capacity and timeout of a [`BoundedExecutor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub max_concurrency: usize,
    pub timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Runs blocking upstream calls under a concurrency cap and a timeout.
///
/// Cloning is cheap and clones share the same budget.
#[derive(Clone)]
pub struct BoundedExecutor {
    permits: Arc<Semaphore>,
    capacity: usize,
    timeout: Duration,
    provider: &'static str,
    secret: Option<Arc<str>>,
}

impl Default for BoundedExecutor {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

impl BoundedExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        let capacity = config.max_concurrency.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            timeout: config.timeout,
            provider: "upstream",
            secret: None,
        }
    }

    /// Label used in log events.
    pub fn with_provider(mut self, provider: &'static str) -> Self {
        self.provider = provider;
        self
    }

    /// Secret to strip from any upstream error text before it is logged or
    /// wrapped into a [`DomainError`].
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        let secret: String = secret.into();
        self.secret = (!secret.is_empty()).then(|| Arc::from(secret));
        self
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Executes `call` on the blocking pool.
    ///
    /// Suspends while the budget is exhausted. Returns the call's value
    /// unchanged, or one of the [`DomainError`] kinds.
    pub async fn run<T, F>(&self, call: F) -> Result<T, DomainError>
    where
        F: FnOnce() -> Result<T, UpstreamError> + Send + 'static,
        T: Send + 'static,
    {
        // Released on drop, on every path below.
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| DomainError::generic("execution budget is closed"))?;

        let started = Instant::now();
        let worker = tokio::task::spawn_blocking(call);

        match tokio::time::timeout(self.timeout, worker).await {
            Err(_) => {
                tracing::error!(
                    provider = self.provider,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "upstream request timed out"
                );
                Err(DomainError::timeout())
            }
            Ok(Err(join_error)) => Err(self.worker_failure(join_error)),
            Ok(Ok(Err(upstream))) => {
                Err(classify_with_logging(self.provider, &upstream, self.secret()))
            }
            Ok(Ok(Ok(value))) => {
                tracing::debug!(
                    provider = self.provider,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "upstream call completed"
                );
                Ok(value)
            }
        }
    }

    fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    fn worker_failure(&self, error: JoinError) -> DomainError {
        if error.is_panic() {
            tracing::error!(
                provider = self.provider,
                error = %sanitize_message(&error.to_string(), self.secret()),
                "upstream worker panicked"
            );
            DomainError::generic("upstream call failed unexpectedly")
        } else {
            tracing::warn!(provider = self.provider, "upstream worker was cancelled");
            DomainError::generic("upstream call was cancelled")
        }
    }
}

/// Maps a raw upstream failure onto the domain taxonomy.
///
/// HTTP statuses are taken from [`UpstreamError::Status`]; other failures
/// are classified by the status code mentioned in their message, if any.
pub fn classify(error: &UpstreamError, secret: Option<&str>) -> DomainError {
    match error {
        UpstreamError::Timeout => DomainError::timeout(),
        UpstreamError::Connect(_) => {
            DomainError::connection_failure("Failed to connect to the data provider.")
        }
        other => {
            let text = other.to_string();
            match other.status_code().or_else(|| mentioned_status(&text)) {
                Some(401) => DomainError::configuration(),
                Some(429) => DomainError::rate_limited("Data provider rate limit reached."),
                Some(404) => DomainError::not_found("resource"),
                _ => DomainError::generic(sanitize_message(&text, secret)),
            }
        }
    }
}

fn classify_with_logging(
    provider: &'static str,
    error: &UpstreamError,
    secret: Option<&str>,
) -> DomainError {
    let classified = classify(error, secret);
    let detail = sanitize_message(&error.to_string(), secret);
    match &classified {
        DomainError::ConnectionFailure { .. } if error.status_code() == Some(401) => {
            tracing::error!(provider, "upstream rejected the configured API key");
        }
        DomainError::ConnectionFailure { .. } => {
            tracing::error!(provider, error = %detail, "upstream network error");
        }
        DomainError::Generic { .. } => {
            tracing::error!(provider, error = %detail, "unexpected upstream error");
        }
        other => {
            tracing::warn!(provider, code = other.code(), error = %detail, "upstream call failed");
        }
    }
    classified
}

fn mentioned_status(text: &str) -> Option<u16> {
    [401, 429, 404]
        .into_iter()
        .find(|code| text.contains(&code.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainErrorKind;

    fn executor(timeout: Duration) -> BoundedExecutor {
        BoundedExecutor::new(ExecutorConfig {
            max_concurrency: 2,
            timeout,
        })
    }

    #[test]
    fn statuses_map_onto_domain_kinds() {
        let cases = [
            (UpstreamError::status(401, "unauthorized"), DomainErrorKind::ConnectionFailure),
            (UpstreamError::status(429, "slow down"), DomainErrorKind::RateLimited),
            (UpstreamError::status(404, "missing"), DomainErrorKind::NotFound),
            (UpstreamError::status(500, "oops"), DomainErrorKind::Generic),
            (UpstreamError::Timeout, DomainErrorKind::Timeout),
            (UpstreamError::Connect(String::from("refused")), DomainErrorKind::ConnectionFailure),
            (UpstreamError::Decode(String::from("eof")), DomainErrorKind::Generic),
        ];

        for (error, expected) in cases {
            assert_eq!(classify(&error, None).kind(), expected, "{error}");
        }
    }

    #[test]
    fn status_mentioned_in_message_is_honoured() {
        let error = UpstreamError::Other(String::from("HTTP 429 Too Many Requests"));
        assert_eq!(classify(&error, None).kind(), DomainErrorKind::RateLimited);
    }

    #[test]
    fn explicit_status_wins_over_message_text() {
        let error = UpstreamError::status(500, "see ticket 404");
        assert_eq!(classify(&error, None).kind(), DomainErrorKind::Generic);
    }

    #[test]
    fn generic_errors_never_carry_the_secret() {
        let error = UpstreamError::Other(String::from("bad request for key s3cr3t-key"));
        let classified = classify(&error, Some("s3cr3t-key"));
        assert!(!classified.to_string().contains("s3cr3t-key"));
    }

    #[test]
    fn capacity_is_at_least_one() {
        let executor = BoundedExecutor::new(ExecutorConfig {
            max_concurrency: 0,
            timeout: DEFAULT_TIMEOUT,
        });
        assert_eq!(executor.capacity(), 1);
        assert_eq!(executor.available_permits(), 1);
    }

    #[tokio::test]
    async fn returns_value_unchanged() {
        let value = executor(Duration::from_secs(1))
            .run(|| Ok::<_, UpstreamError>(vec![1, 2, 3]))
            .await
            .expect("call should succeed");
        assert_eq!(value, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn panicking_worker_becomes_generic_error() {
        let executor = executor(Duration::from_secs(1));
        let error = executor
            .run(|| -> Result<(), UpstreamError> { panic!("bug in upstream adapter") })
            .await
            .expect_err("panic must be classified");
        assert_eq!(error.kind(), DomainErrorKind::Generic);
        assert_eq!(executor.available_permits(), 2);
    }

    #[tokio::test]
    async fn timeout_releases_the_permit() {
        let executor = executor(Duration::from_millis(20));
        let error = executor
            .run(|| {
                std::thread::sleep(Duration::from_millis(200));
                Ok::<_, UpstreamError>(())
            })
            .await
            .expect_err("call must time out");
        assert_eq!(error.kind(), DomainErrorKind::Timeout);
        assert_eq!(executor.available_permits(), 2);
    }
}
