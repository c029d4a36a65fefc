//! Credential redaction for any text that may reach a log line or a user.

use std::sync::LazyLock;

use regex::Regex;

/// Replacement marker for redacted secrets.
pub const REDACTED: &str = "[REDACTED]";

static HEX_SECRET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-f0-9]{32,}\b").expect("hex secret pattern is valid")
});

/// Removes `secret` (verbatim) and any bare hex token of 32+ characters.
pub fn sanitize_message(message: &str, secret: Option<&str>) -> String {
    let mut sanitized = match secret {
        Some(secret) if !secret.is_empty() && message.contains(secret) => {
            message.replace(secret, REDACTED)
        }
        _ => message.to_owned(),
    };

    if HEX_SECRET.is_match(&sanitized) {
        sanitized = HEX_SECRET.replace_all(&sanitized, REDACTED).into_owned();
    }
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_every_occurrence_of_the_secret() {
        let out = sanitize_message("key=sk-live-1 and again sk-live-1", Some("sk-live-1"));
        assert_eq!(out, "key=[REDACTED] and again [REDACTED]");
    }

    #[test]
    fn redacts_uppercase_hex_tokens_without_explicit_secret() {
        let token = "ABCDEF0123456789ABCDEF0123456789";
        let out = sanitize_message(&format!("url?apiKey={token}"), None);
        assert!(!out.contains(token));
        assert!(out.ends_with(REDACTED));
    }

    #[test]
    fn keeps_short_hex_and_plain_text() {
        let out = sanitize_message("order deadbeef failed with 404", None);
        assert_eq!(out, "order deadbeef failed with 404");
    }

    #[test]
    fn empty_secret_is_ignored() {
        assert_eq!(sanitize_message("nothing here", Some("")), "nothing here");
    }
}
