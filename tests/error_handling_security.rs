//! Behavior-driven tests for Error Handling and Security behavior
//!
//! These tests verify HOW failures reach the user: always as an `Error: ...`
//! string, never with credentials or internal stack traces.

use std::time::Duration;

use fintools_core::{
    classify, is_error_result, BoundedExecutor, DomainError, ErrorTranslator, ExecutorConfig,
    Settings, ToolFailure, UpstreamError, ValidationError,
};

const SECRET: &str = "mk_live_Zq81xPp0secret";

fn forex_translator() -> ErrorTranslator {
    ErrorTranslator::new("Massive", "MASSIVE_API_KEY").with_secret(SECRET)
}

fn crypto_translator() -> ErrorTranslator {
    ErrorTranslator::new("CoinMarketCap", "COINMARKETCAP_API_KEY").with_secret(SECRET)
}

// =============================================================================
// Security: credentials never leak
// =============================================================================

#[tokio::test]
async fn when_upstream_error_echoes_the_key_user_never_sees_it() {
    // Given: An upstream that echoes the request URL, key included
    let executor = BoundedExecutor::new(ExecutorConfig {
        max_concurrency: 1,
        timeout: Duration::from_secs(1),
    })
    .with_secret(SECRET);
    let echoed = format!("bad gateway for https://api.massive.com/v3?apiKey={SECRET}");

    // When: The failure is classified and rendered
    let error = executor
        .run(move || Err::<(), _>(UpstreamError::Other(echoed)))
        .await
        .expect_err("upstream failed");
    let message = forex_translator().translate(&error.clone().into());

    // Then: Neither the domain error nor the message carries the key
    assert!(!error.to_string().contains(SECRET));
    assert!(!message.contains(SECRET));
    assert!(is_error_result(&message));
}

#[test]
fn when_every_failure_kind_is_rendered_no_output_contains_the_key() {
    // Given: One failure of every shape, each mentioning the key
    let failures = vec![
        ToolFailure::Domain(DomainError::connection_failure(format!("refused {SECRET}"))),
        ToolFailure::Domain(DomainError::timeout()),
        ToolFailure::Domain(DomainError::not_found("ticker")),
        ToolFailure::Domain(DomainError::rate_limited(SECRET)),
        ToolFailure::Domain(DomainError::invalid_input(format!("ticker {SECRET}"))),
        ToolFailure::Domain(DomainError::generic(SECRET)),
        ToolFailure::Legacy(UpstreamError::status(401, SECRET)),
        ToolFailure::Legacy(UpstreamError::status(503, SECRET)),
        ToolFailure::Legacy(UpstreamError::Connect(SECRET.to_owned())),
        ToolFailure::Legacy(UpstreamError::Other(SECRET.to_owned())),
        ToolFailure::Internal(format!("panicked at src/forex.rs:42: {SECRET}")),
    ];

    // When / Then: Every rendering starts with Error: and hides the key
    for failure in &failures {
        for translator in [forex_translator(), crypto_translator()] {
            let message = translator.translate(failure);
            assert!(message.starts_with("Error:"), "{message}");
            assert!(!message.contains(SECRET), "leaked in {message}");
        }
    }
}

#[test]
fn when_settings_are_debug_printed_keys_are_redacted() {
    // Given: Settings holding both keys
    let settings = Settings::from_lookup(|key| match key {
        "COINMARKETCAP_API_KEY" | "MASSIVE_API_KEY" => Some(SECRET.to_owned()),
        _ => None,
    })
    .expect("valid settings");

    // When: They end up in a log line
    let printed = format!("{settings:?} {:?}", settings.forex_provider());

    // Then: The key is not there
    assert!(!printed.contains(SECRET));
    assert!(printed.contains("[REDACTED]"));
}

// =============================================================================
// Error Handling: user-facing classification
// =============================================================================

#[test]
fn when_upstream_says_429_user_is_told_about_the_rate_limit() {
    // Given: A failure whose message mentions 429
    let upstream = UpstreamError::Other(String::from("429 Client Error: Too Many Requests"));

    // When: It is classified and rendered
    let message = forex_translator().translate(&classify(&upstream, None).into());

    // Then: The user reads about the rate limit
    assert!(message.to_lowercase().contains("rate limit"), "{message}");
}

#[test]
fn when_connection_is_refused_user_sees_connection_failure_without_trace() {
    // Given: A refused TCP connection with OS detail
    let upstream = UpstreamError::Connect(String::from(
        "error trying to connect: tcp connect error: Connection refused (os error 111)",
    ));

    // When: It is classified and rendered
    let message = forex_translator().translate(&classify(&upstream, None).into());

    // Then: The message names a connection failure and carries no internals
    assert!(message.to_lowercase().contains("connection failure"), "{message}");
    assert!(!message.contains("os error"));
    assert!(!message.contains("Traceback"));
    assert!(!message.contains("stack backtrace"));
}

#[test]
fn when_api_key_is_rejected_user_is_pointed_at_configuration() {
    // Given: A 401 from either client
    let rejected = UpstreamError::status(401, "Unauthorized");

    // When: Rendered through both paths
    let forex = forex_translator().translate(&classify(&rejected, None).into());
    let crypto = crypto_translator().translate(&rejected.into());

    // Then: Forex says configuration, crypto names the variable
    assert!(forex.contains("configuration"), "{forex}");
    assert!(crypto.contains("COINMARKETCAP_API_KEY"), "{crypto}");
}

#[test]
fn when_handler_crashes_user_sees_only_the_generic_message() {
    // Given: A panic message with source locations
    let failure = ToolFailure::Internal(String::from(
        "thread 'tokio-runtime-worker' panicked at crates/fintools-agent/src/forex_tools.rs:88:5",
    ));

    // When: It is rendered
    let message = forex_translator().translate(&failure);

    // Then: Only the generic safe text is shown
    assert_eq!(message, "Error: An unexpected error occurred. Please try again.");
}

#[test]
fn when_input_is_invalid_user_sees_the_reason() {
    // Given: A validation failure
    let failure: ToolFailure = ValidationError::InvalidCurrency {
        value: String::from("EURO"),
    }
    .into();

    // When: It is rendered
    let message = forex_translator().translate(&failure);

    // Then: It is an input error naming the offending value
    assert!(message.starts_with("Error: Invalid input:"), "{message}");
    assert!(message.contains("EURO"));
}
